use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handler::{
        auth::auth_handler, chat::chat_handler, comment::comment_handler, post::post_handler,
        users::users_handler,
    },
    middleware::auth,
};

pub fn create_router(app_state: AppState) -> Router {
    let api_route = Router::new()
        .nest(
            "/users",
            users_handler().layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .nest("/publicaciones", post_handler(app_state.clone()))
        .nest("/comentarios", comment_handler(app_state.clone()))
        .nest("/chat", chat_handler());

    Router::new()
        .nest("/auth", auth_handler(app_state.clone()))
        .nest("/api", api_route)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
