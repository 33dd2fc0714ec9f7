use super::{DBClient, page_offset};
use crate::models::{User, UserRole};
use uuid::Uuid;

/// User database operations trait
pub trait UserExt {
    /// Get a single user by ID or by email (ID wins when both are given)
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Newest users first
    async fn get_users(&self, page: u32, limit: u32) -> Result<Vec<User>, sqlx::Error>;

    async fn get_user_count(&self) -> Result<i64, sqlx::Error>;

    /// Insert a user with the default `user` role
    async fn save_user(&self, name: &str, email: &str, password: &str)
    -> Result<User, sqlx::Error>;

    /// Update whichever fields are `Some`; `Ok(None)` when the user is gone
    async fn update_user(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Remove the user's reactions from every post, then the user row.
    /// Returns false when no such user existed.
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error>;
}

impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(
                "SELECT id, name, email, password, role, created_at, updated_at FROM users WHERE id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(
                "SELECT id, name, email, password, role, created_at, updated_at FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn get_users(&self, page: u32, limit: u32) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password, role, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password, role, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Reactions are embedded without a foreign key, so strip them by hand,
        // keeping the order of the remaining entries.
        sqlx::query(
            r#"
            UPDATE posts
            SET reactions = COALESCE(
                (
                    SELECT jsonb_agg(r.elem ORDER BY r.ord)
                    FROM jsonb_array_elements(reactions) WITH ORDINALITY AS r(elem, ord)
                    WHERE r.elem->>'usuario' <> $1
                ),
                '[]'::jsonb
            )
            WHERE reactions @> jsonb_build_array(jsonb_build_object('usuario', $1::text))
            "#,
        )
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
