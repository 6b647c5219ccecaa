use crate::domain::model::ProbeOutcome;
use async_trait::async_trait;

/// A single reachability attempt against a URL.
///
/// Implementations must absorb every transport fault into the returned
/// [`ProbeOutcome`]; callers never see an error.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}
