use crate::core::registry::ServiceRegistry;
use crate::domain::model::{ProbeOutcome, StatusResult};
use crate::domain::ports::Prober;
use std::sync::Arc;

/// Maps one probe to one [`StatusResult`]. Holds no per-call state.
#[derive(Clone)]
pub struct StatusChecker {
    prober: Arc<dyn Prober>,
}

impl StatusChecker {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    pub async fn check_status(&self, url: &str) -> StatusResult {
        classify(self.prober.probe(url).await)
    }

    /// `None` when the name is unknown or the service is disabled.
    pub async fn check_service(
        &self,
        registry: &ServiceRegistry,
        name: &str,
    ) -> Option<StatusResult> {
        let url = registry.lookup(name)?;
        tracing::debug!("Checking {} at {}", name, url);

        let result = self.check_status(url).await;
        tracing::info!(
            service = name,
            status = ?result.status,
            response_time_ms = ?result.response_time,
            "status check finished"
        );
        Some(result)
    }
}

pub fn classify(outcome: ProbeOutcome) -> StatusResult {
    match outcome {
        ProbeOutcome::Success { code: 200, elapsed } => StatusResult::healthy(elapsed),
        ProbeOutcome::Success { code, elapsed } => StatusResult::unexpected_status(code, elapsed),
        ProbeOutcome::Timeout => StatusResult::timed_out(),
        ProbeOutcome::TransportFailure { detail, elapsed } => {
            StatusResult::connection_failed(detail, elapsed)
        }
    }
}
