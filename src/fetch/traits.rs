use crate::model::{FetchOutcome, Source};

/// One paginated query against one feed. Implementations never fail outright:
/// a broken fetch returns what it accumulated with `partial` set.
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch_all(&self, source: Source, params: &[(String, String)]) -> FetchOutcome;
}
