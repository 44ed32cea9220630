pub mod pool;
pub mod repos;
pub mod store;

// Re-export commonly used items
pub use pool::{create_pool, run_migrations};
pub use repos::user::{CreateUserError, NewUser, UserRepo, UserRow};
pub use store::{MemoryUserStore, PgUserStore, UserStore};
