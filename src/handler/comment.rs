use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post, put};
use axum::{Extension, Router, middleware};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::dtos::{
    CommentInputDto, CommentListResponseDto, CommentResponseDto, CommentsQueryDto, PaginationDto,
    ReactionInputDto, ReactionsResponseDto, RequestQueryDto, Response,
};
use crate::error::HttpError;
use crate::middleware::{JWTAuthMiddleware, auth};
use crate::service::{comment as comment_service, reaction as reaction_service};

/// Router for `/api/comentarios`, including the reaction endpoints.
///
/// Only the per-post comment listing is public.
pub fn comment_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(get_comments)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route("/publicacion/{post_id}", get(get_post_comments))
        .route(
            "/publicacion/{post_id}",
            post(create_comment)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/publicacion/{post_id}/reaccion",
            post(upsert_reaction)
                .delete(delete_reaction)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/{comment_id}",
            put(edit_comment)
                .delete(delete_comment)
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// All comments, newest first, paginated
#[instrument(skip(app_state))]
pub async fn get_comments(
    Query(params): Query<RequestQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| {
        tracing::error!("Invalid get_comments input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let (page, limit) = (params.page(), params.limit());
    let (comments, total) = comment_service::list_comments(&app_state.db_client, page, limit).await?;

    tracing::info!(page, results = comments.len(), "get_comments successful");
    Ok(Json(CommentListResponseDto {
        status: "success".to_string(),
        results: comments.len(),
        data: comments,
        pagination: Some(PaginationDto::new(page, limit, total)),
    }))
}

/// Comments of one post; 200 with `results: 0` when it has none, 404 when
/// the post does not exist
#[instrument(skip(app_state))]
pub async fn get_post_comments(
    Path(post_id): Path<Uuid>,
    Query(params): Query<CommentsQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| {
        tracing::error!("Invalid get_post_comments input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let comments =
        comment_service::list_post_comments(&app_state.db_client, post_id, params.ascending())
            .await?;

    Ok(Json(CommentListResponseDto {
        status: "success".to_string(),
        results: comments.len(),
        data: comments,
        pagination: None,
    }))
}

#[instrument(skip(app_state, jwt, body), fields(user_id = %jwt.user.id))]
pub async fn create_comment(
    Path(post_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<CommentInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_comment input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let comment =
        comment_service::create_comment(&app_state.db_client, post_id, jwt.user.id, &body.content)
            .await?;

    tracing::info!(comment_id = %comment.id, "create_comment successful");
    Ok((
        StatusCode::CREATED,
        Json(CommentResponseDto {
            status: "success".to_string(),
            data: comment,
        }),
    ))
}

#[instrument(skip(app_state, jwt, body), fields(user_id = %jwt.user.id))]
pub async fn edit_comment(
    Path(comment_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<CommentInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid edit_comment input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let comment = comment_service::edit_comment(
        &app_state.db_client,
        comment_id,
        &jwt.actor(),
        &body.content,
    )
    .await?;

    tracing::info!("edit_comment successful");
    Ok(Json(CommentResponseDto {
        status: "success".to_string(),
        data: comment,
    }))
}

/// Author or admin only
#[instrument(skip(app_state, jwt), fields(user_id = %jwt.user.id))]
pub async fn delete_comment(
    Path(comment_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    comment_service::delete_comment(&app_state.db_client, comment_id, &jwt.actor()).await?;

    tracing::info!("delete_comment successful");
    Ok(Json(Response {
        status: "success",
        message: "Comment deleted".to_string(),
    }))
}

/// Add or replace the caller's reaction on a post
#[instrument(skip(app_state, jwt), fields(user_id = %jwt.user.id))]
pub async fn upsert_reaction(
    Path(post_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<ReactionInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid upsert_reaction input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let reactions =
        reaction_service::upsert_reaction(&app_state.db_client, post_id, jwt.user.id, &body.kind)
            .await?;

    tracing::info!(kind = %body.kind, "upsert_reaction successful");
    Ok(Json(ReactionsResponseDto {
        status: "success".to_string(),
        message: "Reaction saved".to_string(),
        reacciones: reactions,
    }))
}

#[instrument(skip(app_state, jwt), fields(user_id = %jwt.user.id))]
pub async fn delete_reaction(
    Path(post_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let reactions =
        reaction_service::delete_reaction(&app_state.db_client, post_id, jwt.user.id).await?;

    tracing::info!("delete_reaction successful");
    Ok(Json(ReactionsResponseDto {
        status: "success".to_string(),
        message: "Reaction removed".to_string(),
        reacciones: reactions,
    }))
}
