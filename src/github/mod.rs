pub mod auth;
pub mod client;
pub mod error;
pub mod graphql;
pub mod pagination;
pub mod responses;

pub use auth::{Authentication, Credential};
pub use client::GhClient;
pub use error::Error;
pub use graphql::GhCli;
