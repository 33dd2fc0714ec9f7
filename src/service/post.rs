use uuid::Uuid;

use super::{Actor, missing_parent};
use crate::db::PostExt;
use crate::error::{ErrorMessage, ServiceError};
use crate::models::{Post, PostContent};

/// Text fields must be non-blank; at least one trophy, none of them blank
fn check_content(content: &PostContent) -> Result<(), ServiceError> {
    if content.trophies.is_empty() || content.trophies.iter().any(|t| t.trim().is_empty()) {
        return Err(ServiceError::InvalidInput(ErrorMessage::InvalidTrophies));
    }
    let required = [
        &content.game_name,
        &content.duration,
        &content.difficulty,
        &content.content,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ServiceError::InvalidInput(ErrorMessage::EmptyContent));
    }
    Ok(())
}

pub async fn get_post<S: PostExt>(store: &S, post_id: Uuid) -> Result<Post, ServiceError> {
    store
        .get_post(post_id)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::PostNotFound))
}

/// One page of posts, newest first, plus the total count
pub async fn list_posts<S: PostExt>(
    store: &S,
    page: u32,
    limit: u32,
) -> Result<(Vec<Post>, i64), ServiceError> {
    let posts = store.get_posts(page, limit).await?;
    let total = store.get_post_count().await?;
    Ok((posts, total))
}

pub async fn create_post<S: PostExt>(
    store: &S,
    user_id: Uuid,
    content: &PostContent,
) -> Result<Post, ServiceError> {
    check_content(content)?;

    store
        .create_post(user_id, content)
        .await
        .map_err(|e| missing_parent(e, ErrorMessage::UserNoLongerExist))
}

/// Replace the author-editable fields as owner or admin.
///
/// Comments and reactions are left untouched.
pub async fn update_post<S: PostExt>(
    store: &S,
    post_id: Uuid,
    actor: &Actor,
    content: &PostContent,
) -> Result<Post, ServiceError> {
    check_content(content)?;

    let post = get_post(store, post_id).await?;
    if !actor.can_modify(post.user_id) {
        return Err(ServiceError::Forbidden);
    }

    store
        .update_post(post_id, content)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::PostNotFound))
}

/// Delete a post as owner or admin; its comments go with it
pub async fn delete_post<S: PostExt>(
    store: &S,
    post_id: Uuid,
    actor: &Actor,
) -> Result<(), ServiceError> {
    let post = get_post(store, post_id).await?;
    if !actor.can_modify(post.user_id) {
        return Err(ServiceError::Forbidden);
    }

    if !store.delete_post(post_id).await? {
        return Err(ServiceError::NotFound(ErrorMessage::PostNotFound));
    }

    tracing::debug!(%post_id, comments = post.comment_ids.len(), "post deleted");
    Ok(())
}
