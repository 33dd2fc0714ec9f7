pub mod auth;
pub mod chat;
pub mod comment;
pub mod post;
pub mod users;
