//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation id
//! - [`RequireAdmin`]: rejects the request with 401 unless it carries a valid
//!   admin token
//!
//! ```ignore
//! async fn handler(
//!     RequireAdmin(session): RequireAdmin,
//!     correlation_id: CorrelationId,
//! ) -> Result<Json<Response>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, user = %session.username, "admin request");
//!     Ok(Json(response))
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use booking_auth::{ADMIN_COOKIE, AdminSession, TokenRegistry};
use std::sync::Arc;
use uuid::Uuid;

/// Correlation id for request tracing.
///
/// Taken from the id stored by the correlation middleware, then from the
/// `X-Correlation-ID` header, else freshly generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        let id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        Ok(Self(id))
    }
}

/// Token presented by the client, if any.
///
/// An `Authorization: Bearer` header wins over the [`ADMIN_COOKIE`] cookie.
#[must_use]
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ADMIN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Admin gate.
///
/// Works with any state that can hand out the token registry through
/// [`FromRef`].
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminSession);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    Arc<dyn TokenRegistry>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = presented_token(&parts.headers).ok_or_else(|| {
            tracing::debug!(uri = %parts.uri, "admin request without token");
            AppError::unauthorized("Unauthorized")
        })?;

        let registry = Arc::<dyn TokenRegistry>::from_ref(state);
        let session = registry.validate(&token).await.map_err(|e| {
            tracing::debug!(uri = %parts.uri, error = %e, "admin token rejected");
            AppError::from(e)
        })?;
        Ok(Self(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use booking_auth::InMemoryTokenRegistry;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut builder = Request::builder();
        for (name, value) in pairs {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0.headers
    }

    #[tokio::test]
    async fn correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let req = Request::builder()
            .header(CORRELATION_ID_HEADER, uuid.to_string())
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();
        let id = CorrelationId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.0, uuid);
    }

    #[tokio::test]
    async fn correlation_id_generated_when_absent() {
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
        let id = CorrelationId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_ne!(id.0, Uuid::nil());
    }

    #[test]
    fn token_from_bearer_header() {
        let h = headers(&[("authorization", "Bearer abc.def")]);
        assert_eq!(presented_token(&h).as_deref(), Some("abc.def"));
    }

    #[test]
    fn token_from_cookie() {
        let h = headers(&[("cookie", "theme=dark; tb_admin=abc.def; other=1")]);
        assert_eq!(presented_token(&h).as_deref(), Some("abc.def"));
    }

    #[test]
    fn no_token_when_cookie_empty_or_missing() {
        assert_eq!(presented_token(&headers(&[("cookie", "tb_admin=")])), None);
        assert_eq!(presented_token(&headers(&[])), None);
        assert_eq!(presented_token(&headers(&[("authorization", "Basic xyz")])), None);
    }

    #[derive(Clone)]
    struct TestState(Arc<dyn TokenRegistry>);

    impl FromRef<TestState> for Arc<dyn TokenRegistry> {
        fn from_ref(state: &TestState) -> Self {
            Arc::clone(&state.0)
        }
    }

    #[tokio::test]
    async fn require_admin_accepts_issued_token_and_rejects_others() {
        let registry: Arc<dyn TokenRegistry> = Arc::new(InMemoryTokenRegistry::default());
        let session = registry.issue("admin").await.unwrap();
        let state = TestState(Arc::clone(&registry));

        let req = Request::builder()
            .header("authorization", format!("Bearer {}", session.token))
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();
        let RequireAdmin(found) = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .expect("valid token");
        assert_eq!(found.username, "admin");

        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();
        let err = RequireAdmin::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .header("cookie", "tb_admin=forged.token")
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();
        let err = RequireAdmin::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
