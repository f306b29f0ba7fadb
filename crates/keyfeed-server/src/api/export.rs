use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use keyfeed_feed::{generate_feed, FeedError};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Set to `true` when the feed was built from an incomplete catalog.
const PARTIAL_HEADER: &str = "x-feed-partial";

/// Generates a fresh feed for every request. Nothing is cached between
/// requests.
pub(super) async fn export_feed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    match generate_feed(&state.config).await {
        Ok(output) => {
            let mut response = (StatusCode::OK, output.xml).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(XML_CONTENT_TYPE),
            );
            if output.partial {
                headers.insert(PARTIAL_HEADER, HeaderValue::from_static("true"));
            }
            response
        }
        Err(err) => map_feed_error(req_id.0, &err).into_response(),
    }
}

fn map_feed_error(request_id: String, error: &FeedError) -> ApiError {
    if error.is_upstream_auth() {
        tracing::error!(error = %error, "upstream rejected catalog credentials");
        return ApiError::new(
            request_id,
            "upstream_unauthorized",
            "catalog API rejected the configured credentials",
        );
    }

    tracing::error!(error = %error, "feed generation failed");
    let (code, message) = match error {
        FeedError::EmptyCatalog => ("empty_catalog", "catalog API returned no products"),
        FeedError::Timeout { .. } => ("timeout", "feed generation timed out"),
        _ => ("internal_error", "feed generation failed"),
    };
    ApiError::new(request_id, code, message)
}
