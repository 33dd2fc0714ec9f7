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
    PaginationDto, PostInputDto, PostListResponseDto, PostResponseDto, RequestQueryDto, Response,
};
use crate::error::HttpError;
use crate::middleware::{JWTAuthMiddleware, auth};
use crate::models::PostContent;
use crate::service::post as post_service;

/// Router for `/api/publicaciones`; reads are public, writes need a token
pub fn post_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_posts))
        .route(
            "/",
            post(create_post)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route("/{post_id}", get(get_post))
        .route(
            "/{post_id}",
            put(edit_post)
                .delete(delete_post)
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

#[instrument(skip(app_state))]
pub async fn get_posts(
    Query(params): Query<RequestQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    params.validate().map_err(|e| {
        tracing::error!("Invalid get_posts input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let (page, limit) = (params.page(), params.limit());
    let (posts, total) = post_service::list_posts(&app_state.db_client, page, limit).await?;

    tracing::info!(page, results = posts.len(), "get_posts successful");
    Ok(Json(PostListResponseDto {
        status: "success".to_string(),
        results: posts.len(),
        data: posts,
        pagination: PaginationDto::new(page, limit, total),
    }))
}

#[instrument(skip(app_state))]
pub async fn get_post(
    Path(post_id): Path<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let post = post_service::get_post(&app_state.db_client, post_id).await?;

    Ok(Json(PostResponseDto {
        status: "success".to_string(),
        data: post,
    }))
}

/// Publish an achievement post owned by the caller
#[instrument(skip(app_state, jwt, body), fields(user_id = %jwt.user.id))]
pub async fn create_post(
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<PostInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_post input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let post = post_service::create_post(&app_state.db_client, jwt.user.id, &PostContent::from(body))
        .await
        .map_err(|e| {
            tracing::error!("create_post failed: {}", e);
            HttpError::from(e)
        })?;

    tracing::info!(post_id = %post.id, "create_post successful");
    Ok((
        StatusCode::CREATED,
        Json(PostResponseDto {
            status: "success".to_string(),
            data: post,
        }),
    ))
}

#[instrument(skip(app_state, jwt, body), fields(user_id = %jwt.user.id))]
pub async fn edit_post(
    Path(post_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
    Json(body): Json<PostInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid edit_post input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let post = post_service::update_post(
        &app_state.db_client,
        post_id,
        &jwt.actor(),
        &PostContent::from(body),
    )
    .await?;

    tracing::info!("edit_post successful");
    Ok(Json(PostResponseDto {
        status: "success".to_string(),
        data: post,
    }))
}

#[instrument(skip(app_state, jwt), fields(user_id = %jwt.user.id))]
pub async fn delete_post(
    Path(post_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Extension(jwt): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    post_service::delete_post(&app_state.db_client, post_id, &jwt.actor()).await?;

    tracing::info!("delete_post successful");
    Ok(Json(Response {
        status: "success",
        message: "Post deleted".to_string(),
    }))
}
