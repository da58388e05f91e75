use async_trait::async_trait;

use super::error::FetchError;
use super::post::{Post, Source};

/// A platform that can be asked for its most recent posts under a tag.
#[async_trait]
pub trait SourceClient: Send + Sync {
    fn source(&self) -> Source;

    /// Returns at most `limit` posts for `tag`, in the order the platform
    /// lists them.
    async fn fetch(&self, tag: &str, limit: usize) -> Result<Vec<Post>, FetchError>;
}
