pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod growth;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod store;

pub use app::app;
