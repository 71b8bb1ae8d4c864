//! Request handlers mapping admission decisions onto HTTP responses.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::admission::{AdmissionService, Decision, RejectReason};

/// Request header carrying the client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Build the router for the admission endpoints.
///
/// `GET /limit` applies the fixed-window policy only; `GET /custom`
/// applies the token bucket and then the shared fixed window.
pub fn router(service: Arc<AdmissionService>) -> Router {
    Router::new()
        .route("/limit", get(limit))
        .route("/custom", get(custom))
        .with_state(service)
}

/// Handler for the fixed-window endpoint.
async fn limit(State(service): State<Arc<AdmissionService>>, headers: HeaderMap) -> Response {
    match service.admit_fixed_window(client_id(&headers)) {
        Decision::Admitted => StatusCode::NO_CONTENT.into_response(),
        Decision::Rejected(reason) => reject(reason),
    }
}

/// Handler for the token-bucket endpoint.
async fn custom(State(service): State<Arc<AdmissionService>>, headers: HeaderMap) -> Response {
    match service.admit_token_bucket(client_id(&headers)) {
        Decision::Admitted => (StatusCode::OK, "OK").into_response(),
        Decision::Rejected(reason) => reject(reason),
    }
}

/// Extract the client identifier from the request headers.
///
/// A missing header and a non-UTF-8 value both collapse to the empty
/// string, which the core rejects as a precondition failure without
/// creating any state.
fn client_id(headers: &HeaderMap) -> &str {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// Map a rejection to a response.
///
/// A precondition failure (missing identifier) maps to 400 and a
/// rate-limit rejection to 429, so clients can tell a malformed request
/// from an over-limit one.
fn reject(reason: RejectReason) -> Response {
    debug!(reason = %reason, "Request rejected");
    let status = match reason {
        RejectReason::MissingClientId => StatusCode::BAD_REQUEST,
        RejectReason::WindowLimitExceeded | RejectReason::NoTokensAvailable => {
            StatusCode::TOO_MANY_REQUESTS
        }
    };
    (status, reason.message()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientLimitsEntry, LimitsConfig};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router(request_max: u32, tokens_per_sec: u32) -> Router {
        let limits = LimitsConfig {
            clients: vec![ClientLimitsEntry {
                id: "client1".to_string(),
                request_max,
                tokens_per_sec,
            }],
        };
        router(Arc::new(AdmissionService::new(limits)))
    }

    fn request(path: &str, client_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(id) = client_id {
            builder = builder.header(CLIENT_ID_HEADER, id);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_limit_admitted_is_no_content() {
        let app = test_router(5, 5);

        let response = app.oneshot(request("/limit", Some("client1"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_limit_over_cap_is_too_many_requests() {
        let app = test_router(2, 5);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request("/limit", Some("client1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = app.oneshot(request("/limit", Some("client1"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_custom_admitted_is_ok() {
        let app = test_router(5, 5);

        let response = app
            .oneshot(request("/custom", Some("client1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_exhausted_bucket_is_too_many_requests() {
        let app = test_router(10, 2);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request("/custom", Some("client1")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(request("/custom", Some("client1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_missing_header_is_bad_request() {
        let app = test_router(5, 5);

        let response = app.clone().oneshot(request("/limit", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(request("/custom", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_header_is_bad_request() {
        let app = test_router(5, 5);

        let response = app.oneshot(request("/limit", Some(""))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
