use uuid::Uuid;

use super::{Actor, missing_parent};
use crate::db::{CommentExt, PostExt};
use crate::error::{ErrorMessage, ServiceError};
use crate::models::Comment;

pub const MAX_COMMENT_LENGTH: usize = 1000;

fn check_content(content: &str) -> Result<(), ServiceError> {
    if content.trim().is_empty() {
        return Err(ServiceError::InvalidInput(ErrorMessage::EmptyContent));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ServiceError::InvalidInput(ErrorMessage::ContentTooLong(
            MAX_COMMENT_LENGTH,
        )));
    }
    Ok(())
}

/// Create a comment on an existing post and register it in the post's list.
///
/// The comment row is written first and is authoritative. If the process dies
/// before the post is updated, the reconciliation job adds the missing id.
pub async fn create_comment<S>(
    store: &S,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Comment, ServiceError>
where
    S: PostExt + CommentExt,
{
    check_content(content)?;

    store
        .get_post(post_id)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::PostNotFound))?;

    let comment = store
        .save_comment(&Comment::new(post_id, user_id, content.to_string()))
        .await
        .map_err(|e| missing_parent(e, ErrorMessage::PostNotFound))?;

    if !store.push_comment_ref(post_id, comment.id).await? {
        tracing::warn!(%post_id, comment_id = %comment.id, "post did not take the comment reference");
    }

    Ok(comment)
}

/// Delete a comment as its author or an admin.
///
/// Unlinks the id from the parent post first (a missing post is tolerated),
/// then removes the comment row.
pub async fn delete_comment<S>(
    store: &S,
    comment_id: Uuid,
    actor: &Actor,
) -> Result<(), ServiceError>
where
    S: PostExt + CommentExt,
{
    let comment = store
        .get_comment(comment_id)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::CommentNotFound))?;

    if !actor.can_modify(comment.user_id) {
        return Err(ServiceError::Forbidden);
    }

    let unlinked = store.pull_comment_ref(comment_id).await?;
    if unlinked.is_empty() {
        tracing::warn!(%comment_id, post_id = %comment.post_id, "no post listed the comment being deleted");
    }

    if !store.delete_comment(comment_id).await? {
        tracing::debug!(%comment_id, "comment already gone when deleting");
    }

    Ok(())
}

/// Replace a comment's content as its author or an admin
pub async fn edit_comment<S: CommentExt>(
    store: &S,
    comment_id: Uuid,
    actor: &Actor,
    content: &str,
) -> Result<Comment, ServiceError> {
    check_content(content)?;

    let comment = store
        .get_comment(comment_id)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::CommentNotFound))?;

    if !actor.can_modify(comment.user_id) {
        return Err(ServiceError::Forbidden);
    }

    store
        .update_comment(comment_id, content)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::CommentNotFound))
}

/// Comments of one post, newest first unless `ascending`.
///
/// A post without comments gives an empty list; a missing post is `NotFound`.
pub async fn list_post_comments<S>(
    store: &S,
    post_id: Uuid,
    ascending: bool,
) -> Result<Vec<Comment>, ServiceError>
where
    S: PostExt + CommentExt,
{
    store
        .get_post(post_id)
        .await?
        .ok_or(ServiceError::NotFound(ErrorMessage::PostNotFound))?;

    Ok(store.get_post_comments(post_id, ascending).await?)
}

/// One page of all comments plus the total count
pub async fn list_comments<S: CommentExt>(
    store: &S,
    page: u32,
    limit: u32,
) -> Result<(Vec<Comment>, i64), ServiceError> {
    let comments = store.get_comments(page, limit).await?;
    let total = store.get_comment_count().await?;
    Ok((comments, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::{Platform, PostContent, User, UserRole};
    use std::time::Duration;

    struct Fixture {
        store: MemoryStore,
        owner: User,
        author: User,
        stranger: User,
        admin: User,
        post_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = store.add_user("Owner", UserRole::User);
        let author = store.add_user("Author", UserRole::User);
        let stranger = store.add_user("Stranger", UserRole::User);
        let admin = store.add_user("Admin", UserRole::Admin);
        let post = store
            .create_post(
                owner.id,
                &PostContent {
                    game_name: "Hollow Knight".to_string(),
                    trophies: vec!["Speedrun 1".to_string(), "Steel Soul".to_string()],
                    duration: "60h".to_string(),
                    difficulty: "Muy alta".to_string(),
                    content: "Sin morir ni una vez".to_string(),
                    platform: Platform::Steam,
                },
            )
            .await
            .unwrap();
        Fixture {
            store,
            owner,
            author,
            stranger,
            admin,
            post_id: post.id,
        }
    }

    #[tokio::test]
    async fn created_comment_is_listed_exactly_once() {
        let f = fixture().await;

        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();

        assert_eq!(comment.post_id, f.post_id);
        assert_eq!(comment.user_id, f.author.id);
        let post = f.store.get_post(f.post_id).await.unwrap().unwrap();
        assert_eq!(
            post.comment_ids.iter().filter(|id| **id == comment.id).count(),
            1
        );
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let f = fixture().await;

        let result = create_comment(&f.store, Uuid::new_v4(), f.author.id, "hello").await;

        assert!(matches!(
            result,
            Err(ServiceError::NotFound(ErrorMessage::PostNotFound))
        ));
        assert_eq!(f.store.get_comment_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_comment_is_invalid() {
        let f = fixture().await;

        let result = create_comment(&f.store, f.post_id, f.author.id, "   ").await;

        assert!(matches!(
            result,
            Err(ServiceError::InvalidInput(ErrorMessage::EmptyContent))
        ));
    }

    #[tokio::test]
    async fn overlong_comment_is_invalid() {
        let f = fixture().await;
        let content = "a".repeat(MAX_COMMENT_LENGTH + 1);

        let result = create_comment(&f.store, f.post_id, f.author.id, &content).await;

        assert!(matches!(
            result,
            Err(ServiceError::InvalidInput(ErrorMessage::ContentTooLong(_)))
        ));
    }

    #[tokio::test]
    async fn stranger_cannot_delete_and_nothing_changes() {
        let f = fixture().await;
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();

        let result = delete_comment(&f.store, comment.id, &Actor::from(&f.stranger)).await;

        assert!(matches!(result, Err(ServiceError::Forbidden)));
        assert!(f.store.comment_exists(comment.id));
        let post = f.store.get_post(f.post_id).await.unwrap().unwrap();
        assert_eq!(post.comment_ids, vec![comment.id]);
    }

    #[tokio::test]
    async fn post_owner_is_not_comment_owner() {
        let f = fixture().await;
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();

        let result = delete_comment(&f.store, comment.id, &Actor::from(&f.owner)).await;

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn author_delete_unlinks_from_fresh_post() {
        let f = fixture().await;
        let keep = create_comment(&f.store, f.post_id, f.stranger.id, "first")
            .await
            .unwrap();
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();

        delete_comment(&f.store, comment.id, &Actor::from(&f.author))
            .await
            .unwrap();

        assert!(!f.store.comment_exists(comment.id));
        let post = f.store.get_post(f.post_id).await.unwrap().unwrap();
        assert_eq!(post.comment_ids, vec![keep.id]);
    }

    #[tokio::test]
    async fn admin_may_delete_any_comment() {
        let f = fixture().await;
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();

        delete_comment(&f.store, comment.id, &Actor::from(&f.admin))
            .await
            .unwrap();

        assert!(!f.store.comment_exists(comment.id));
    }

    #[tokio::test]
    async fn deleting_unlisted_comment_still_succeeds() {
        let f = fixture().await;
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();
        f.store.drop_comment_ref(f.post_id, comment.id);

        delete_comment(&f.store, comment.id, &Actor::from(&f.author))
            .await
            .unwrap();

        assert!(!f.store.comment_exists(comment.id));
    }

    #[tokio::test]
    async fn deleting_missing_comment_is_not_found() {
        let f = fixture().await;

        let result = delete_comment(&f.store, Uuid::new_v4(), &Actor::from(&f.admin)).await;

        assert!(matches!(
            result,
            Err(ServiceError::NotFound(ErrorMessage::CommentNotFound))
        ));
    }

    #[tokio::test]
    async fn edit_follows_owner_or_admin() {
        let f = fixture().await;
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();

        let denied = edit_comment(&f.store, comment.id, &Actor::from(&f.stranger), "hijacked").await;
        assert!(matches!(denied, Err(ServiceError::Forbidden)));

        let edited = edit_comment(&f.store, comment.id, &Actor::from(&f.author), "hola")
            .await
            .unwrap();
        assert_eq!(edited.content, "hola");
        assert_eq!(edited.post_id, f.post_id);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_distinguishes_missing_post() {
        let f = fixture().await;

        let empty = list_post_comments(&f.store, f.post_id, false).await.unwrap();
        assert!(empty.is_empty());

        let missing = list_post_comments(&f.store, Uuid::new_v4(), false).await;
        assert!(matches!(
            missing,
            Err(ServiceError::NotFound(ErrorMessage::PostNotFound))
        ));

        let first = create_comment(&f.store, f.post_id, f.author.id, "first")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = create_comment(&f.store, f.post_id, f.stranger.id, "second")
            .await
            .unwrap();

        let newest_first = list_post_comments(&f.store, f.post_id, false).await.unwrap();
        assert_eq!(
            newest_first.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );

        let oldest_first = list_post_comments(&f.store, f.post_id, true).await.unwrap();
        assert_eq!(
            oldest_first.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[tokio::test]
    async fn reconciliation_repairs_dropped_and_stale_references() {
        let f = fixture().await;
        let comment = create_comment(&f.store, f.post_id, f.author.id, "hello")
            .await
            .unwrap();
        let stale = Uuid::new_v4();
        f.store.drop_comment_ref(f.post_id, comment.id);
        f.store.add_stale_ref(f.post_id, stale);

        let repaired = f.store.reconcile_comment_refs().await.unwrap();

        assert_eq!(repaired, 1);
        let post = f.store.get_post(f.post_id).await.unwrap().unwrap();
        assert_eq!(post.comment_ids, vec![comment.id]);
        assert_eq!(f.store.reconcile_comment_refs().await.unwrap(), 0);
    }
}
