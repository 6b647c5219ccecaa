use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

pub(crate) fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ErrorBody {
            message: msg.to_string(),
        }),
    )
}

/// GET /status/{service}
///
/// Always 200 for a known service; upstream health travels in the body.
pub async fn service_status(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> Response {
    match state.checker.check_service(&state.registry, &service).await {
        Some(result) => Json(result).into_response(),
        None => error_response(&format!("Unknown service: {}", service), StatusCode::NOT_FOUND)
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checker::StatusChecker;
    use crate::core::registry::ServiceRegistry;
    use crate::domain::model::ProbeOutcome;
    use crate::domain::ports::Prober;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl Prober for Unreachable {
        async fn probe(&self, _url: &str) -> ProbeOutcome {
            ProbeOutcome::Timeout
        }
    }

    fn test_state() -> AppState {
        AppState {
            checker: StatusChecker::new(Arc::new(Unreachable)),
            registry: Arc::new(ServiceRegistry::default()),
        }
    }

    #[tokio::test]
    async fn timeout_is_still_http_200() {
        let resp = service_status(State(test_state()), Path("home".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_service_is_404() {
        let resp = service_status(State(test_state()), Path("library".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn disabled_service_is_404() {
        let resp = service_status(State(test_state()), Path("sammul".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
