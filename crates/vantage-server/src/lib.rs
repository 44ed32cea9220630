pub mod auth;
pub mod config;
pub mod session;
pub mod state;
pub mod web;
