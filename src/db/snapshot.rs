use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::DBClient;
use crate::models::{Comment, Post, UserRole};

/// User row as exposed to the chatbot; the password column is never selected
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Whole-database read used as chatbot context
#[derive(Debug, Default)]
pub struct Snapshot {
    pub users: Vec<PublicUser>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

impl DBClient {
    pub async fn snapshot(&self) -> Result<Snapshot, sqlx::Error> {
        let users = sqlx::query_as::<_, PublicUser>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, game_name, trophies, duration, difficulty, content,
                   platform, comment_ids, reactions, created_at, updated_at
            FROM posts
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, content, user_id, created_at, updated_at FROM comments ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            users = users.len(),
            posts = posts.len(),
            comments = comments.len(),
            "database snapshot taken"
        );

        Ok(Snapshot {
            users,
            posts,
            comments,
        })
    }
}
