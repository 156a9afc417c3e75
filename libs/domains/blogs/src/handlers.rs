use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    },
    extract_ip_from_headers,
};
use serde_json::json;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::BlogResult;
use crate::models::{
    AuthorActivity, Blog, BlogActivity, BlogRecentComments, BlogWithComments, BulkDeleteReport,
    Comment, CreateBlog, CreateComment, DeleteOutcome, RecentCommentsQuery, TopQuery, UpdateBlog,
    UpdateComment,
};
use crate::repository::BlogRepository;
use crate::service::BlogService;

const TAG: &str = "blogs";

/// OpenAPI documentation for the Blogs API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_blogs,
        create_blog,
        create_many_blogs,
        seed_blogs,
        delete_all_blogs,
        blogs_with_comments,
        blogs_with_recent_comments,
        most_active_blogs,
        most_active_authors,
        get_blog,
        update_blog,
        delete_blog,
        add_comment,
        get_comment,
        update_comment,
        remove_comment,
    ),
    components(
        schemas(
            Blog, Comment, CreateBlog, UpdateBlog, CreateComment, UpdateComment,
            BlogWithComments, BlogRecentComments, BlogActivity, AuthorActivity,
            DeleteOutcome, BulkDeleteReport,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = TAG, description = "Blog and comment management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the blog router with all HTTP endpoints.
///
/// Static segments are registered before `/{id}` so `many`, `mock` and
/// the analytics paths never parse as blog ids.
pub fn router<R: BlogRepository + 'static>(service: BlogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/many", post(create_many_blogs))
        .route("/mock", post(seed_blogs))
        .route("/all", delete(delete_all_blogs))
        .route("/with-comments", get(blogs_with_comments))
        .route("/recent-comments", get(blogs_with_recent_comments))
        .route("/most-active", get(most_active_blogs))
        .route("/most-active-authors", get(most_active_authors))
        .route(
            "/{id}",
            get(get_blog).patch(update_blog).delete(delete_blog),
        )
        .route("/{id}/comments", post(add_comment))
        .route(
            "/{blog_id}/comments/{comment_id}",
            get(get_comment).patch(update_comment).delete(remove_comment),
        )
        .with_state(shared_service)
}

/// List all blogs
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All blogs in the collection", body = Vec<Blog>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_blogs<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
) -> BlogResult<Json<Vec<Blog>>> {
    Ok(Json(service.list_blogs().await?))
}

/// Create a new blog
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateBlog,
    responses(
        (status = 201, description = "Blog created", body = Blog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateBlog>,
) -> BlogResult<impl IntoResponse> {
    let blog = service.create_blog(input).await?;

    AuditEvent::new("blog.create", Some(format!("blog:{}", blog.id)), AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .with_details(json!({ "title": blog.title }))
        .log();

    Ok((StatusCode::CREATED, Json(blog)))
}

/// Create many blogs in one call
#[utoipa::path(
    post,
    path = "/many",
    tag = TAG,
    request_body = Vec<CreateBlog>,
    responses(
        (status = 201, description = "All blogs created, in input order", body = Vec<Blog>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_many_blogs<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    // Per-item validation happens in the service; a bad item fails the
    // whole batch before anything else is written.
    Json(inputs): Json<Vec<CreateBlog>>,
) -> BlogResult<impl IntoResponse> {
    let blogs = service.create_many_blogs(inputs).await?;
    Ok((StatusCode::CREATED, Json(blogs)))
}

/// Seed the collection with sample blogs
#[utoipa::path(
    post,
    path = "/mock",
    tag = TAG,
    responses(
        (status = 201, description = "Sample blogs created", body = Vec<Blog>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn seed_blogs<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
) -> BlogResult<impl IntoResponse> {
    let blogs = service.seed_sample_blogs().await?;
    Ok((StatusCode::CREATED, Json(blogs)))
}

/// Delete every blog, reporting per-blog outcomes
#[utoipa::path(
    delete,
    path = "/all",
    tag = TAG,
    responses(
        (status = 200, description = "Bulk delete report", body = BulkDeleteReport),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_all_blogs<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    headers: HeaderMap,
) -> BlogResult<Json<BulkDeleteReport>> {
    let report = service.remove_all_blogs().await?;

    let outcome = if report.deleted == report.attempted {
        AuditOutcome::Success
    } else {
        AuditOutcome::Failure
    };
    AuditEvent::new("blog.delete_all", None, outcome)
        .with_ip(extract_ip_from_headers(&headers))
        .with_details(json!({ "attempted": report.attempted, "deleted": report.deleted }))
        .log();

    Ok(Json(report))
}

/// Blogs that have at least one comment
#[utoipa::path(
    get,
    path = "/with-comments",
    tag = TAG,
    responses(
        (status = 200, description = "Blogs with their comments", body = Vec<BlogWithComments>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn blogs_with_comments<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
) -> BlogResult<Json<Vec<BlogWithComments>>> {
    Ok(Json(service.blogs_with_comments().await?))
}

/// Blogs with comments inside the recent window
#[utoipa::path(
    get,
    path = "/recent-comments",
    tag = TAG,
    params(RecentCommentsQuery),
    responses(
        (status = 200, description = "Blogs with their recent comments", body = Vec<BlogRecentComments>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn blogs_with_recent_comments<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    Query(query): Query<RecentCommentsQuery>,
) -> BlogResult<Json<Vec<BlogRecentComments>>> {
    Ok(Json(service.blogs_with_recent_comments(query.days_ago).await?))
}

/// Most commented blogs, busiest first
#[utoipa::path(
    get,
    path = "/most-active",
    tag = TAG,
    params(TopQuery),
    responses(
        (status = 200, description = "Comment counts per blog", body = Vec<BlogActivity>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn most_active_blogs<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    Query(query): Query<TopQuery>,
) -> BlogResult<Json<Vec<BlogActivity>>> {
    Ok(Json(service.most_active_blogs(query.top).await?))
}

/// Most prolific comment authors across all blogs
#[utoipa::path(
    get,
    path = "/most-active-authors",
    tag = TAG,
    params(TopQuery),
    responses(
        (status = 200, description = "Comment counts per author", body = Vec<AuthorActivity>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn most_active_authors<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    Query(query): Query<TopQuery>,
) -> BlogResult<Json<Vec<AuthorActivity>>> {
    Ok(Json(service.most_active_authors(query.top).await?))
}

/// Get a blog by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, description = "The blog", body = Blog),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    UuidPath(id): UuidPath,
) -> BlogResult<Json<Blog>> {
    Ok(Json(service.get_blog(id).await?))
}

/// Update a blog, overlaying only the supplied fields
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = UpdateBlog,
    responses(
        (status = 200, description = "The updated blog", body = Blog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(update): ValidatedJson<UpdateBlog>,
) -> BlogResult<Json<Blog>> {
    Ok(Json(service.update_blog(id, update).await?))
}

/// Delete a blog
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_blog<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> BlogResult<StatusCode> {
    service.delete_blog(id).await?;

    AuditEvent::new("blog.delete", Some(format!("blog:{id}")), AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Add a comment to a blog
#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = CreateComment,
    responses(
        (status = 201, description = "The blog with the new comment", body = Blog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_comment<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> BlogResult<impl IntoResponse> {
    let blog = service.add_comment(id, input).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// Get a single comment from a blog
#[utoipa::path(
    get,
    path = "/{blog_id}/comments/{comment_id}",
    tag = TAG,
    params(
        ("blog_id" = Uuid, Path, description = "Blog id"),
        ("comment_id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "The comment", body = Comment),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_comment<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    axum::extract::Path((blog_id, comment_id)): axum::extract::Path<(Uuid, Uuid)>,
) -> BlogResult<Json<Comment>> {
    Ok(Json(service.get_comment(blog_id, comment_id).await?))
}

/// Edit a comment's content
#[utoipa::path(
    patch,
    path = "/{blog_id}/comments/{comment_id}",
    tag = TAG,
    params(
        ("blog_id" = Uuid, Path, description = "Blog id"),
        ("comment_id" = Uuid, Path, description = "Comment id")
    ),
    request_body = UpdateComment,
    responses(
        (status = 200, description = "The blog with the edited comment", body = Blog),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_comment<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    axum::extract::Path((blog_id, comment_id)): axum::extract::Path<(Uuid, Uuid)>,
    ValidatedJson(input): ValidatedJson<UpdateComment>,
) -> BlogResult<Json<Blog>> {
    Ok(Json(service.update_comment(blog_id, comment_id, input).await?))
}

/// Remove a comment from a blog
#[utoipa::path(
    delete,
    path = "/{blog_id}/comments/{comment_id}",
    tag = TAG,
    params(
        ("blog_id" = Uuid, Path, description = "Blog id"),
        ("comment_id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "The blog without the comment", body = Blog),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_comment<R: BlogRepository>(
    State(service): State<Arc<BlogService<R>>>,
    axum::extract::Path((blog_id, comment_id)): axum::extract::Path<(Uuid, Uuid)>,
) -> BlogResult<Json<Blog>> {
    Ok(Json(service.remove_comment(blog_id, comment_id).await?))
}
