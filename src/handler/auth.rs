use crate::{
    AppState,
    db::UserExt,
    dtos::{FilterUserDto, LoginUserDto, SignupUserDto, UserData, UserLoginResponseDto, UserResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::{JWTAuthMiddleware, auth},
    service::user::{self as user_service, normalize_email},
    utils::{password, token},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;
use validator::Validate;

/// Router for authentication endpoints
pub fn auth_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route(
            "/verify",
            get(verify).route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

/// Create an account with the default `user` role
#[instrument(skip(app_state, body), fields(name = %body.name, email = %body.email))]
pub async fn signup(
    State(app_state): State<AppState>,
    Json(body): Json<SignupUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid signup input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let hash_password = password::hash(&body.password).map_err(|e| {
        tracing::error!("Password hashing error: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let user = user_service::register(&app_state.db_client, &body.name, &body.email, &hash_password)
        .await
        .map_err(|e| {
            tracing::error!("Signup failed: {}", e);
            HttpError::from(e)
        })?;

    tracing::info!(user_id = %user.id, "Signup successful");
    Ok((
        StatusCode::CREATED,
        Json(UserResponseDto {
            status: "success".to_string(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    ))
}

/// Check credentials and issue a JWT in the body and the `access_token` cookie
///
/// Unknown email and wrong password give the same 401.
#[instrument(skip(app_state, cookie_jar, body), fields(email = %body.email))]
pub async fn login(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid login input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let wrong_credentials = || HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string());

    let user = app_state
        .db_client
        .get_user(None, Some(&normalize_email(&body.email)))
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| {
            tracing::error!("User not found");
            wrong_credentials()
        })?;

    let password_matched = password::compare(&body.password, &user.password).map_err(|e| {
        tracing::error!("Password error: {}", e);
        wrong_credentials()
    })?;

    if !password_matched {
        tracing::error!("password mismatch");
        return Err(wrong_credentials());
    }

    let access_token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| {
        tracing::error!("Access token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let access_cookie = Cookie::build(("access_token", access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!(user_id = %user.id, "Login successful");
    Ok((
        cookie_jar.add(access_cookie),
        Json(UserLoginResponseDto {
            status: "success".to_string(),
            token: access_token,
        }),
    ))
}

/// Return the user the presented token belongs to
#[instrument(skip(user), fields(user_id = %user.user.id))]
pub async fn verify(
    Extension(user): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user.user),
        },
    }))
}
