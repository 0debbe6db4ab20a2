pub mod cli;
pub mod config;
pub mod fetch;
pub mod git;
pub mod model;
pub mod resolver;

mod api;
mod flock;
mod repo_path;

pub use api::{Gofetch, GofetchBuilder, LockMode};
