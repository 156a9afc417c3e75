//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "status": 500,
        "error": "INTERNAL_ERROR",
        "message": "An internal server error occurred",
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/blogs"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "status": 400,
        "error": "VALIDATION_ERROR",
        "message": "Request validation failed",
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/blogs",
        "details": {
            "title": [{"code": "length", "message": null}]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid UUID",
    content_type = "application/json",
    example = json!({
        "status": 400,
        "error": "BAD_REQUEST",
        "message": "Invalid UUID: not-a-uuid",
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/blogs/not-a-uuid"
    })
)]
pub struct BadRequestUuidResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "status": 404,
        "error": "NOT_FOUND",
        "message": "Blog not found",
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/blogs/0195f7a8-1111-7000-8000-000000000000"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - id collision or concurrent modification",
    content_type = "application/json",
    example = json!({
        "status": 409,
        "error": "CONFLICT",
        "message": "Resource already exists",
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/blogs"
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable - document store unreachable",
    content_type = "application/json",
    example = json!({
        "status": 503,
        "error": "SERVICE_UNAVAILABLE",
        "message": "Database service is unavailable",
        "timestamp": "2025-01-01T00:00:00Z",
        "path": "/api/blogs"
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
