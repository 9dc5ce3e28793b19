mod repository_id;
mod types;

pub mod app;
pub mod app_env;
pub mod display;
pub mod github;
pub mod workspace;

pub use crate::{
    app_env::{AppEnv, Strategy},
    repository_id::RepositoryId,
    types::{RemoteStatus, StatusRecord},
};
