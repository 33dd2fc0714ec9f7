use super::{DBClient, page_offset};
use crate::error::{ErrorMessage, ServiceError};
use crate::models::{Post, PostContent, Reaction};
use sqlx::types::Json;
use uuid::Uuid;

const POST_COLUMNS: &str = "id, user_id, game_name, trophies, duration, difficulty, content, \
     platform, comment_ids, reactions, created_at, updated_at";

/// Post database operations trait
pub trait PostExt {
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, sqlx::Error>;

    /// Newest posts first
    async fn get_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, sqlx::Error>;

    async fn get_post_count(&self) -> Result<i64, sqlx::Error>;

    /// Ids of the posts owned by a user, oldest first
    async fn get_user_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>;

    async fn create_post(&self, user_id: Uuid, post: &PostContent) -> Result<Post, sqlx::Error>;

    /// Replace the author-editable fields; `Ok(None)` when the post is gone
    async fn update_post(
        &self,
        post_id: Uuid,
        post: &PostContent,
    ) -> Result<Option<Post>, sqlx::Error>;

    /// Delete the post and, through the foreign key, its comments
    async fn delete_post(&self, post_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Atomic read-modify-write of one post's reaction list.
    ///
    /// The row stays locked between read and write, so two users reacting at
    /// the same time both keep their reaction. If `apply` fails nothing is
    /// written and its error is returned.
    async fn modify_reactions<F>(
        &self,
        post_id: Uuid,
        apply: F,
    ) -> Result<Vec<Reaction>, ServiceError>
    where
        F: FnOnce(&mut Vec<Reaction>) -> Result<(), ServiceError> + Send;

    /// Append `comment_id` to the post's comment list unless already present.
    /// Returns true when the list changed.
    async fn push_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Remove `comment_id` from every post listing it, returning those posts
    async fn pull_comment_ref(&self, comment_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>;

    /// Rebuild drifted comment lists from `comments.post_id`.
    /// Returns the number of posts rewritten.
    async fn reconcile_comment_refs(&self) -> Result<u64, sqlx::Error>;
}

impl PostExt for DBClient {
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);

        let post = sqlx::query_as::<_, Post>(&query)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn get_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM posts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            POST_COLUMNS
        );

        let posts = sqlx::query_as::<_, Post>(&query)
            .bind(limit as i64)
            .bind(page_offset(page, limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    async fn get_post_count(&self) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn get_user_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM posts WHERE user_id = $1 ORDER BY created_at ASC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    async fn create_post(&self, user_id: Uuid, post: &PostContent) -> Result<Post, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO posts (id, user_id, game_name, trophies, duration, difficulty, content, platform)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            POST_COLUMNS
        );

        let post = sqlx::query_as::<_, Post>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&post.game_name)
            .bind(&post.trophies)
            .bind(&post.duration)
            .bind(&post.difficulty)
            .bind(&post.content)
            .bind(post.platform)
            .fetch_one(&self.pool)
            .await?;

        Ok(post)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        post: &PostContent,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE posts
            SET game_name = $2, trophies = $3, duration = $4, difficulty = $5,
                content = $6, platform = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        );

        let post = sqlx::query_as::<_, Post>(&query)
            .bind(post_id)
            .bind(&post.game_name)
            .bind(&post.trophies)
            .bind(&post.duration)
            .bind(&post.difficulty)
            .bind(&post.content)
            .bind(post.platform)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn modify_reactions<F>(
        &self,
        post_id: Uuid,
        apply: F,
    ) -> Result<Vec<Reaction>, ServiceError>
    where
        F: FnOnce(&mut Vec<Reaction>) -> Result<(), ServiceError> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let current: Option<Json<Vec<Reaction>>> =
            sqlx::query_scalar("SELECT reactions FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(Json(mut reactions)) = current else {
            return Err(ServiceError::NotFound(ErrorMessage::PostNotFound));
        };

        // An early return drops `tx`, which rolls back and releases the lock.
        apply(&mut reactions)?;

        sqlx::query("UPDATE posts SET reactions = $2, updated_at = NOW() WHERE id = $1")
            .bind(post_id)
            .bind(Json(&reactions))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(reactions)
    }

    async fn push_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET comment_ids = array_append(comment_ids, $2)
            WHERE id = $1 AND NOT ($2 = ANY(comment_ids))
            "#,
        )
        .bind(post_id)
        .bind(comment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_comment_ref(&self, comment_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let post_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET comment_ids = array_remove(comment_ids, $1)
            WHERE $1 = ANY(comment_ids)
            RETURNING id
            "#,
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(post_ids)
    }

    async fn reconcile_comment_refs(&self) -> Result<u64, sqlx::Error> {
        // Set comparison plus cardinality: order differences alone are not
        // drift, duplicates and missing/stale ids are.
        let result = sqlx::query(
            r#"
            WITH actual AS (
                SELECT p.id,
                       COALESCE(
                           array_agg(c.id ORDER BY c.created_at, c.id) FILTER (WHERE c.id IS NOT NULL),
                           '{}'
                       ) AS ids
                FROM posts p
                LEFT JOIN comments c ON c.post_id = p.id
                GROUP BY p.id
            )
            UPDATE posts p
            SET comment_ids = actual.ids
            FROM actual
            WHERE p.id = actual.id
              AND NOT (
                  p.comment_ids @> actual.ids
                  AND actual.ids @> p.comment_ids
                  AND cardinality(p.comment_ids) = cardinality(actual.ids)
              )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
