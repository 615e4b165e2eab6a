pub mod client;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod session;
pub mod state;
pub mod toast;

pub use client::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use error::ClientError;
pub use routes::Route;
pub use session::Session;
pub use state::AppContext;
