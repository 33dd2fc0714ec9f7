use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    db::UserExt,
    error::{ErrorMessage, HttpError},
    models::{User, UserRole},
    service::Actor,
    utils::token,
};

/// Authenticated caller, inserted into request extensions by `auth`
///
/// ```ignore
/// async fn my_handler(Extension(auth): Extension<JWTAuthMiddleware>) {
///     // auth.user is the caller
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub user: User,
}

impl JWTAuthMiddleware {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.user)
    }
}

/// Token from the `access_token` cookie, else from `Authorization: Bearer`
fn extract_token(cookie_jar: &CookieJar, req: &Request) -> Option<String> {
    cookie_jar
        .get("access_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_owned())
        })
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
///
/// Validates the JWT, loads the user it names, and attaches it as
/// `JWTAuthMiddleware`. 401 when the token is missing or invalid, or the user
/// no longer exists.
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, &req)
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let user_id = token::decode_token(token, app_state.env.jwt_secret.as_bytes())?;

    let user = app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, loading token user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    req.extensions_mut().insert(JWTAuthMiddleware { user });

    Ok(next.run(req).await)
}

/// Role-based access control; must run after `auth`.
///
/// 401 when no user is attached, 403 when their role is not in `required_roles`.
pub async fn role_check(
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<JWTAuthMiddleware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&user.user.role) {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    fn request_with(auth: Option<&str>) -> Request {
        let mut req = Request::new(Body::empty());
        if let Some(value) = auth {
            req.headers_mut()
                .insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        req
    }

    #[test]
    fn bearer_header_is_used_without_cookie() {
        let jar = CookieJar::new();

        assert_eq!(
            extract_token(&jar, &request_with(Some("Bearer abc.def"))),
            Some("abc.def".to_string())
        );
        assert_eq!(extract_token(&jar, &request_with(Some("Basic abc"))), None);
        assert_eq!(extract_token(&jar, &request_with(Some("Bearer "))), None);
        assert_eq!(extract_token(&jar, &request_with(None)), None);
    }

    #[test]
    fn cookie_wins_over_header() {
        let jar = CookieJar::new().add(("access_token", "from-cookie"));

        assert_eq!(
            extract_token(&jar, &request_with(Some("Bearer from-header"))),
            Some("from-cookie".to_string())
        );
    }
}
