use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

pub type BlogResult<T> = Result<T, BlogError>;

/// Error taxonomy for blog operations. Store-level failures are mapped
/// into these variants at the repository boundary so the service layer
/// never sees driver types.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Blog not found with id: {0}")]
    BlogNotFound(Uuid),

    #[error("Blog {0} has no comments")]
    NoComments(Uuid),

    #[error("Comment {comment_id} not found in blog {blog_id}")]
    CommentNotFound { blog_id: Uuid, comment_id: Uuid },

    #[error("Blog already exists with id: {0}")]
    DuplicateId(Uuid),

    /// Conditional replace lost the race: the stored version no longer
    /// matches the one the caller read.
    #[error("Blog {0} was modified concurrently")]
    WriteConflict(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),

    #[error("Store throttled the request: {0}")]
    RateLimited(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<BlogError> for AppError {
    fn from(err: BlogError) -> Self {
        match err {
            BlogError::BlogNotFound(_)
            | BlogError::NoComments(_)
            | BlogError::CommentNotFound { .. } => AppError::NotFound(err.to_string()),
            BlogError::DuplicateId(_) | BlogError::WriteConflict(_) => {
                AppError::Conflict(err.to_string())
            }
            BlogError::Validation(msg) => AppError::BadRequest(msg),
            BlogError::Timeout(msg) => AppError::RequestTimeout(msg),
            BlogError::RateLimited(msg) => AppError::TooManyRequests(msg),
            BlogError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            BlogError::Store(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<validator::ValidationErrors> for BlogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BlogError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn not_found_variants_map_to_404() {
        let id = Uuid::now_v7();
        for err in [
            BlogError::BlogNotFound(id),
            BlogError::NoComments(id),
            BlogError::CommentNotFound { blog_id: id, comment_id: id },
        ] {
            let app: AppError = err.into();
            assert_eq!(app.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn conflict_variants_map_to_409() {
        let id = Uuid::now_v7();
        for err in [BlogError::DuplicateId(id), BlogError::WriteConflict(id)] {
            let app: AppError = err.into();
            assert_eq!(app.status_code(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn store_pressure_variants_keep_their_status() {
        let cases = [
            (BlogError::Timeout("t".into()), StatusCode::REQUEST_TIMEOUT),
            (BlogError::RateLimited("r".into()), StatusCode::TOO_MANY_REQUESTS),
            (BlogError::Unavailable("u".into()), StatusCode::SERVICE_UNAVAILABLE),
            (BlogError::Store("s".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let app: AppError = err.into();
            assert_eq!(app.status_code(), status);
        }
    }
}
