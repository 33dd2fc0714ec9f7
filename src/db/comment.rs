use super::{DBClient, page_offset};
use crate::models::Comment;
use uuid::Uuid;

/// Comment database operations trait
pub trait CommentExt {
    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, sqlx::Error>;

    /// Comments whose parent is `post_id`, newest first unless `ascending`
    async fn get_post_comments(
        &self,
        post_id: Uuid,
        ascending: bool,
    ) -> Result<Vec<Comment>, sqlx::Error>;

    /// All comments, newest first
    async fn get_comments(&self, page: u32, limit: u32) -> Result<Vec<Comment>, sqlx::Error>;

    async fn get_comment_count(&self) -> Result<i64, sqlx::Error>;

    /// Count total comments by user
    async fn get_user_comment_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error>;

    /// Insert a fully built comment (id and timestamps chosen by the caller)
    async fn save_comment(&self, comment: &Comment) -> Result<Comment, sqlx::Error>;

    /// Replace the content; `Ok(None)` when the comment is gone
    async fn update_comment(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, sqlx::Error>;
}

impl CommentExt for DBClient {
    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, content, user_id, created_at, updated_at FROM comments WHERE id = $1",
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn get_post_comments(
        &self,
        post_id: Uuid,
        ascending: bool,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        // ORDER BY direction can't be a bind parameter
        let order_by = if ascending {
            "created_at ASC, id ASC"
        } else {
            "created_at DESC, id DESC"
        };

        let query = format!(
            r#"
            SELECT id, post_id, content, user_id, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY {}
            "#,
            order_by
        );

        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn get_comments(&self, page: u32, limit: u32) -> Result<Vec<Comment>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, content, user_id, created_at, updated_at
            FROM comments
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn get_comment_count(&self) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn get_user_comment_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn save_comment(&self, comment: &Comment) -> Result<Comment, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, content, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, post_id, content, user_id, created_at, updated_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(&comment.content)
        .bind(comment.user_id)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, content, user_id, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
