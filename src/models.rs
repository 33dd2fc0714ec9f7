use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User role enumeration for role-based access control
///
/// Stored in PostgreSQL as the `user_role` ENUM type, lowercased.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// Row of the `users` table
///
/// `password` holds the argon2 PHC string, never plain text.
/// Owned posts are not stored here; they are looked up by `posts.user_id`.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Platform the achievement was earned on (`platform` ENUM in PostgreSQL)
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "platform")]
pub enum Platform {
    PlayStation,
    Xbox,
    Steam,
}

/// Kind of reaction a user can leave on a post
///
/// The wire/storage names are the Spanish labels the clients display.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    #[serde(rename = "Me gusta")]
    MeGusta,
    #[serde(rename = "Asombroso")]
    Asombroso,
    #[serde(rename = "Epic")]
    Epic,
    #[serde(rename = "Increíble")]
    Increible,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 4] = [
        ReactionKind::MeGusta,
        ReactionKind::Asombroso,
        ReactionKind::Epic,
        ReactionKind::Increible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::MeGusta => "Me gusta",
            ReactionKind::Asombroso => "Asombroso",
            ReactionKind::Epic => "Epic",
            ReactionKind::Increible => "Increíble",
        }
    }

    /// Exact, case-sensitive match against the four labels
    pub fn parse(value: &str) -> Option<ReactionKind> {
        ReactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
    }

    /// Labels joined for error messages: "Me gusta, Asombroso, Epic, Increíble"
    pub fn valid_kinds() -> String {
        ReactionKind::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reaction embedded in a post's `reactions` JSONB array
///
/// Has no identity of its own; a post holds at most one per user.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Reaction {
    #[serde(rename = "tipoReaccion")]
    pub kind: ReactionKind,
    #[serde(rename = "usuario")]
    pub user_id: Uuid,
    #[serde(rename = "fechaReaccion")]
    pub reacted_at: DateTime<Utc>,
}

/// Achievement write-up ("publicación"), row of the `posts` table
///
/// `comment_ids` is a secondary index over `comments.post_id`: maintained on
/// comment create/delete and rebuilt by the reconciliation job.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "usuario")]
    pub user_id: Uuid,
    #[serde(rename = "nombreJuego")]
    pub game_name: String,
    #[serde(rename = "trofeosLogros")]
    pub trophies: Vec<String>,
    #[serde(rename = "duracion")]
    pub duration: String,
    #[serde(rename = "dificultad")]
    pub difficulty: String,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "plataforma")]
    pub platform: Platform,
    #[serde(rename = "comentarios")]
    pub comment_ids: Vec<Uuid>,
    #[sqlx(json)]
    #[serde(rename = "reacciones")]
    pub reactions: Vec<Reaction>,
    #[serde(rename = "fechaPublicacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Post fields supplied by the author on create and update
#[derive(Debug, Clone)]
pub struct PostContent {
    pub game_name: String,
    pub trophies: Vec<String>,
    pub duration: String,
    pub difficulty: String,
    pub content: String,
    pub platform: Platform,
}

/// Comment ("comentario") on a post, row of the `comments` table
///
/// `post_id` is the authoritative parent reference.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "publicacion")]
    pub post_id: Uuid,
    #[serde(rename = "comentario")]
    pub content: String,
    #[serde(rename = "usuario")]
    pub user_id: Uuid,
    #[serde(rename = "fechaComentario")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, user_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Comment {
            id: Uuid::new_v4(),
            post_id,
            content,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_kind_parse_is_exact() {
        assert_eq!(ReactionKind::parse("Me gusta"), Some(ReactionKind::MeGusta));
        assert_eq!(ReactionKind::parse("Increíble"), Some(ReactionKind::Increible));
        assert_eq!(ReactionKind::parse("me gusta"), None);
        assert_eq!(ReactionKind::parse("Increible"), None);
        assert_eq!(ReactionKind::parse("Genial"), None);
    }

    #[test]
    fn reaction_serializes_with_spanish_field_names() {
        let reaction = Reaction {
            kind: ReactionKind::Increible,
            user_id: Uuid::nil(),
            reacted_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(&reaction).unwrap();

        assert_eq!(value["tipoReaccion"], "Increíble");
        assert_eq!(value["usuario"], Uuid::nil().to_string());
        assert!(value.get("fechaReaccion").is_some());

        let back: Reaction = serde_json::from_value(value).unwrap();
        assert_eq!(back, reaction);
    }

    #[test]
    fn valid_kinds_lists_all_four_labels() {
        assert_eq!(
            ReactionKind::valid_kinds(),
            "Me gusta, Asombroso, Epic, Increíble"
        );
    }
}
