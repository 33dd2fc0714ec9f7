use uuid::Uuid;

use crate::db::{CommentExt, PostExt, UserExt};
use crate::error::{ErrorMessage, ServiceError};
use crate::models::{User, UserRole};

/// Owned posts and comment count shown on the caller's own profile
#[derive(Debug)]
pub struct Profile {
    pub user: User,
    pub post_ids: Vec<Uuid>,
    pub comment_count: i64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn unique_email(e: sqlx::Error) -> ServiceError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::Conflict(ErrorMessage::EmailExist)
        }
        _ => ServiceError::Persistence(e),
    }
}

/// Store a new user; `password_hash` is already hashed
pub async fn register<S: UserExt>(
    store: &S,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, ServiceError> {
    let email = normalize_email(email);

    if store.get_user(None, Some(&email)).await?.is_some() {
        return Err(ServiceError::Conflict(ErrorMessage::EmailExist));
    }

    // A concurrent signup can still win the race; the unique index catches it.
    store
        .save_user(name.trim(), &email, password_hash)
        .await
        .map_err(unique_email)
}

pub async fn profile<S>(store: &S, user_id: Uuid) -> Result<Profile, ServiceError>
where
    S: UserExt + PostExt + CommentExt,
{
    let user = store
        .get_user(Some(user_id), None)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::UserNotFound))?;

    let post_ids = store.get_user_post_ids(user_id).await?;
    let comment_count = store.get_user_comment_count(user_id).await?;

    Ok(Profile {
        user,
        post_ids,
        comment_count,
    })
}

/// Admin update of name, email or role
pub async fn update_user<S: UserExt>(
    store: &S,
    user_id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    role: Option<UserRole>,
) -> Result<User, ServiceError> {
    let email = email.map(normalize_email);

    if let Some(email) = email.as_deref() {
        if let Some(existing) = store.get_user(None, Some(email)).await? {
            if existing.id != user_id {
                return Err(ServiceError::Conflict(ErrorMessage::EmailExist));
            }
        }
    }

    store
        .update_user(user_id, name.map(str::trim), email.as_deref(), role)
        .await
        .map_err(unique_email)?
        .ok_or(ServiceError::NotFound(ErrorMessage::UserNotFound))
}

/// Delete a user who no longer owns posts or comments.
///
/// Their reactions on other posts are removed with them.
pub async fn delete_user<S>(store: &S, user_id: Uuid) -> Result<(), ServiceError>
where
    S: UserExt + PostExt + CommentExt,
{
    store
        .get_user(Some(user_id), None)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::UserNotFound))?;

    let posts = store.get_user_post_ids(user_id).await?.len() as i64;
    let comments = store.get_user_comment_count(user_id).await?;
    if posts > 0 || comments > 0 {
        return Err(ServiceError::Conflict(ErrorMessage::UserHasDependents {
            posts,
            comments,
        }));
    }

    match store.delete_user(user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ServiceError::NotFound(ErrorMessage::UserNotFound)),
        // Something was created for the user between the check and the delete
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            let posts = store.get_user_post_ids(user_id).await?.len() as i64;
            let comments = store.get_user_comment_count(user_id).await?;
            Err(ServiceError::Conflict(ErrorMessage::UserHasDependents {
                posts,
                comments,
            }))
        }
        Err(e) => Err(ServiceError::Persistence(e)),
    }
}
