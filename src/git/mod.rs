mod cache;
mod repository;

pub use cache::{CacheError, GitCache};
pub use repository::{GitRepository, RepositoryError};
