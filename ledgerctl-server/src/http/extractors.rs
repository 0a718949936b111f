//! Custom Axum extractors
//!
//! Wrap the stock extractors so their rejections come back as `ApiError`
//! JSON instead of plain text.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::Json;
use uuid::Uuid;

use super::error::ApiError;

/// JSON body whose parse failures become 400 `ApiError`s
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose parse failures become 400 `ApiError`s
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Extract a UUID from a single-segment path.
///
/// An id that does not parse cannot name any row, so it is answered like
/// an unknown id: 404.
pub struct PathId(pub Uuid);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request("Invalid path", Some(e.body_text())))?;

        let uuid = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound {
            resource: "record",
            id,
        })?;

        Ok(Self(uuid))
    }
}
