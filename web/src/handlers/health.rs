//! Liveness and readiness endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by [`ReadinessProbe::check`].
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// A dependency that must answer before the service takes traffic.
pub trait ReadinessProbe: Send + Sync {
    /// Name reported in the response (`database`).
    fn component(&self) -> &'static str;

    /// Check the dependency.
    ///
    /// # Errors
    ///
    /// A short description of the failure.
    fn check(&self) -> ProbeFuture<'_>;
}

/// Body of `GET /ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// Checked component
    pub component: &'static str,
    /// `ready` or `unavailable`
    pub status: &'static str,
    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /health`: the process is up. Dependencies are not checked.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// `GET /ready`: 200 when the probe passes, 503 otherwise.
pub async fn readiness(
    State(probe): State<Arc<dyn ReadinessProbe>>,
) -> (StatusCode, Json<Readiness>) {
    let component = probe.component();
    match probe.check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                component,
                status: "ready",
                error: None,
            }),
        ),
        Err(error) => {
            tracing::warn!(component, %error, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    component,
                    status: "unavailable",
                    error: Some(error),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(Result<(), String>);

    impl ReadinessProbe for Probe {
        fn component(&self) -> &'static str {
            "database"
        }

        fn check(&self) -> ProbeFuture<'_> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(health_check().await, (StatusCode::OK, "ok"));
    }

    #[tokio::test]
    async fn readiness_follows_probe() {
        let up: Arc<dyn ReadinessProbe> = Arc::new(Probe(Ok(())));
        let (status, Json(body)) = readiness(State(up)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ready");

        let down: Arc<dyn ReadinessProbe> = Arc::new(Probe(Err("pool timed out".to_string())));
        let (status, Json(body)) = readiness(State(down)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.as_deref(), Some("pool timed out"));
    }
}
