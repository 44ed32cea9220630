use crate::auth::{TOKEN_TTL_SECS, TokenCodec};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::collections::HashMap;
use vantage_common::models::auth::Identity;

/// Name of the session cookie
pub const AUTH_COOKIE_NAME: &str = "auth-token";

/// Cookie read/write capability.
///
/// The HTTP layer uses the framework's [`CookieJar`]; tests substitute
/// [`MemoryCookies`].
pub trait CookieStore {
    /// Current value of the named cookie, if any
    fn get(&self, name: &str) -> Option<String>;

    fn set(&mut self, cookie: Cookie<'static>);

    /// Remove a cookie. `cookie` must already be a removal cookie carrying
    /// the same attributes the cookie was set with.
    fn clear(&mut self, cookie: Cookie<'static>);
}

impl CookieStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        CookieJar::get(self, name).map(|c| c.value().to_string())
    }

    fn set(&mut self, cookie: Cookie<'static>) {
        *self = self.clone().add(cookie);
    }

    fn clear(&mut self, cookie: Cookie<'static>) {
        // Emitted as a Set-Cookie even when the request carried no cookie.
        *self = self.clone().add(cookie);
    }
}

/// In-memory cookie jar that also records every write in order.
#[derive(Debug, Default, Clone)]
pub struct MemoryCookies {
    cookies: HashMap<String, Cookie<'static>>,
    writes: Vec<Cookie<'static>>,
}

impl MemoryCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// A jar as it would arrive on a request already carrying `name=value`
    pub fn with(name: &str, value: &str) -> Self {
        let mut jar = Self::new();
        jar.cookies.insert(
            name.to_string(),
            Cookie::new(name.to_string(), value.to_string()),
        );
        jar
    }

    /// Every cookie written through `set`/`clear`, oldest first
    pub fn writes(&self) -> &[Cookie<'static>] {
        &self.writes
    }
}

impl CookieStore for MemoryCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|c| c.value().to_string())
    }

    fn set(&mut self, cookie: Cookie<'static>) {
        self.writes.push(cookie.clone());
        self.cookies.insert(cookie.name().to_string(), cookie);
    }

    fn clear(&mut self, cookie: Cookie<'static>) {
        self.cookies.remove(cookie.name());
        self.writes.push(cookie);
    }
}

/// Build the session cookie. Every attribute except the value and max-age
/// is shared between setting and clearing.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .http_only(true)
        .path("/")
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(TOKEN_TTL_SECS))
        .build()
}

/// Reads and writes the session token through a [`CookieStore`].
pub struct SessionStore<C> {
    cookies: C,
    secure: bool,
}

impl<C: CookieStore> SessionStore<C> {
    /// `secure` should be on whenever running under the production profile.
    pub fn new(cookies: C, secure: bool) -> Self {
        Self { cookies, secure }
    }

    pub fn store(&mut self, token: &str) {
        self.cookies
            .set(session_cookie(token.to_string(), self.secure));
    }

    /// The stored token; an empty value counts as absent.
    pub fn read(&self) -> Option<String> {
        self.cookies
            .get(AUTH_COOKIE_NAME)
            .filter(|value| !value.is_empty())
    }

    pub fn clear(&mut self) {
        let mut removal = session_cookie(String::new(), self.secure);
        removal.make_removal();
        self.cookies.clear(removal);
    }

    /// Hand the cookie store back, e.g. to attach it to a response
    pub fn into_inner(self) -> C {
        self.cookies
    }
}

/// Identity of the caller behind `session`, or `None` when there is no
/// session cookie or it doesn't decode.
pub fn current_identity<C: CookieStore>(
    session: &SessionStore<C>,
    codec: &TokenCodec,
) -> Option<Identity> {
    let token = session.read()?;
    codec.decode(&token).ok()
}
