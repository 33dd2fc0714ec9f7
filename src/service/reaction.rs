use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::PostExt;
use crate::error::{ErrorMessage, ServiceError};
use crate::models::{Reaction, ReactionKind};

/// Set `user_id`'s reaction in place, or append one if they have none.
///
/// Replacing keeps the entry's position; the list never holds two entries for
/// the same user.
pub fn apply_reaction(
    reactions: &mut Vec<Reaction>,
    user_id: Uuid,
    kind: ReactionKind,
    now: DateTime<Utc>,
) {
    match reactions.iter_mut().find(|r| r.user_id == user_id) {
        Some(existing) => {
            existing.kind = kind;
            existing.reacted_at = now;
        }
        None => reactions.push(Reaction {
            kind,
            user_id,
            reacted_at: now,
        }),
    }
}

/// Drop `user_id`'s reaction; `NotFound` when they had none
pub fn remove_reaction(reactions: &mut Vec<Reaction>, user_id: Uuid) -> Result<(), ServiceError> {
    let before = reactions.len();
    reactions.retain(|r| r.user_id != user_id);

    if reactions.len() == before {
        return Err(ServiceError::NotFound(ErrorMessage::NoReactionByUser));
    }
    Ok(())
}

/// Validate `kind`, then upsert the caller's reaction on the post.
/// Returns the post's full reaction list after the write.
pub async fn upsert_reaction<S: PostExt>(
    store: &S,
    post_id: Uuid,
    user_id: Uuid,
    kind: &str,
) -> Result<Vec<Reaction>, ServiceError> {
    let kind = ReactionKind::parse(kind)
        .ok_or_else(|| ServiceError::InvalidInput(ErrorMessage::InvalidReactionKind(kind.to_string())))?;

    store
        .modify_reactions(post_id, move |reactions| {
            apply_reaction(reactions, user_id, kind, Utc::now());
            Ok(())
        })
        .await
}

/// Remove the caller's reaction from the post and return the remaining list
pub async fn delete_reaction<S: PostExt>(
    store: &S,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Reaction>, ServiceError> {
    store
        .modify_reactions(post_id, move |reactions| remove_reaction(reactions, user_id))
        .await
}
