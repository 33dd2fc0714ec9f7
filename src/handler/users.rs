use crate::{
    AppState,
    db::UserExt,
    dtos::{
        FilterUserDto, RequestQueryDto, Response, UpdateUserDto, UserData, UserListResponseDto,
        UserMeData, UserMeResponseDto, UserResponseDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::{JWTAuthMiddleware, role_check},
    models::UserRole,
    service::user as user_service,
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

/// Router for user endpoints
///
/// All routes are behind the auth middleware (applied in routes.rs); updates
/// and deletes are admin only.
pub fn users_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/me", get(get_me))
        .route(
            "/{user_id}",
            put(update_user)
                .delete(delete_user)
                .route_layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Admin])
                })),
        )
}

/// Current user's profile with the ids of their posts and a comment count
#[instrument(skip(user, app_state), fields(user_id = %user.user.id))]
pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddleware>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = user_service::profile(&app_state.db_client, user.user.id).await?;

    let response_data = UserMeResponseDto {
        status: "success".to_string(),
        data: UserMeData {
            user: FilterUserDto::filter_user(&profile.user),
            post_count: profile.post_ids.len() as i64,
            publicaciones: profile.post_ids,
            comment_count: profile.comment_count,
        },
    };
    tracing::info!("get_me successful");
    Ok(Json(response_data))
}

/// Paginated user list, `?page=1&limit=20`
#[instrument(skip(app_state))]
pub async fn get_users(
    Query(query_params): Query<RequestQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate().map_err(|e| {
        tracing::error!("Invalid get_users input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let users = app_state
        .db_client
        .get_users(query_params.page(), query_params.limit())
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting users: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let user_count = app_state.db_client.get_user_count().await.map_err(|e| {
        tracing::error!("DB error, getting user count: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let response = UserListResponseDto {
        status: "success".to_string(),
        users: FilterUserDto::filter_users(&users),
        results: user_count,
    };
    tracing::info!("get_users successful");
    Ok(Json(response))
}

/// Admin update of another user's name, email or role
#[instrument(skip(app_state, body))]
pub async fn update_user(
    Path(user_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Json(body): Json<UpdateUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid update_user input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let user = user_service::update_user(
        &app_state.db_client,
        user_id,
        body.name.as_deref(),
        body.email.as_deref(),
        body.role,
    )
    .await?;

    tracing::info!(%user_id, "update_user successful");
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

/// Admin delete; 409 while the user still owns posts or comments
#[instrument(skip(app_state))]
pub async fn delete_user(
    Path(user_id): Path<Uuid>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    user_service::delete_user(&app_state.db_client, user_id)
        .await
        .map_err(|e| {
            tracing::error!(%user_id, "delete_user failed: {}", e);
            HttpError::from(e)
        })?;

    tracing::info!(%user_id, "delete_user successful");
    Ok(Json(Response {
        status: "success",
        message: "User deleted".to_string(),
    }))
}
