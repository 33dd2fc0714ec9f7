//! In-memory store used by the service tests.
//!
//! Mirrors the Postgres semantics of `UserExt`, `PostExt` and `CommentExt`:
//! one mutex guards all tables, so every method is atomic the way a single
//! SQL statement (or the reaction transaction) is.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::{CommentExt, PostExt, UserExt};
use crate::error::{ErrorMessage, ServiceError};
use crate::models::{Comment, Post, PostContent, Reaction, User, UserRole};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Insert a user with the given role and return it
    pub fn add_user(&self, name: &str, role: UserRole) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "not-a-hash".to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.lock().users.insert(user.id, user.clone());
        user
    }

    /// Simulate a crash between the comment insert and the post update
    pub fn drop_comment_ref(&self, post_id: Uuid, comment_id: Uuid) {
        if let Some(post) = self.lock().posts.get_mut(&post_id) {
            post.comment_ids.retain(|id| *id != comment_id);
        }
    }

    /// Simulate a post listing a comment that no longer points at it
    pub fn add_stale_ref(&self, post_id: Uuid, comment_id: Uuid) {
        if let Some(post) = self.lock().posts.get_mut(&post_id) {
            post.comment_ids.push(comment_id);
        }
    }

    pub fn comment_exists(&self, comment_id: Uuid) -> bool {
        self.lock().comments.contains_key(&comment_id)
    }
}

fn page_slice<T>(mut items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let offset = super::page_offset(page, limit) as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit as usize);
    items
}

impl UserExt for MemoryStore {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let tables = self.lock();
        if let Some(user_id) = user_id {
            return Ok(tables.users.get(&user_id).cloned());
        }
        if let Some(email) = email {
            return Ok(tables.users.values().find(|u| u.email == email).cloned());
        }
        Ok(None)
    }

    async fn get_users(&self, page: u32, limit: u32) -> Result<Vec<User>, sqlx::Error> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_slice(users, page, limit))
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        Ok(self.lock().users.len() as i64)
    }

    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        self.lock().users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tables = self.lock();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }
        if let Some(role) = role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tables = self.lock();
        for post in tables.posts.values_mut() {
            post.reactions.retain(|r| r.user_id != user_id);
        }
        Ok(tables.users.remove(&user_id).is_some())
    }
}

impl PostExt for MemoryStore {
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        Ok(self.lock().posts.get(&post_id).cloned())
    }

    async fn get_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, sqlx::Error> {
        let mut posts: Vec<Post> = self.lock().posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_slice(posts, page, limit))
    }

    async fn get_post_count(&self) -> Result<i64, sqlx::Error> {
        Ok(self.lock().posts.len() as i64)
    }

    async fn get_user_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut posts: Vec<(chrono::DateTime<Utc>, Uuid)> = self
            .lock()
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| (p.created_at, p.id))
            .collect();
        posts.sort();
        Ok(posts.into_iter().map(|(_, id)| id).collect())
    }

    async fn create_post(&self, user_id: Uuid, post: &PostContent) -> Result<Post, sqlx::Error> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            game_name: post.game_name.clone(),
            trophies: post.trophies.clone(),
            duration: post.duration.clone(),
            difficulty: post.difficulty.clone(),
            content: post.content.clone(),
            platform: post.platform,
            comment_ids: Vec::new(),
            reactions: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.lock().posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        content: &PostContent,
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut tables = self.lock();
        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        post.game_name = content.game_name.clone();
        post.trophies = content.trophies.clone();
        post.duration = content.duration.clone();
        post.difficulty = content.difficulty.clone();
        post.content = content.content.clone();
        post.platform = content.platform;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tables = self.lock();
        let existed = tables.posts.remove(&post_id).is_some();
        if existed {
            tables.comments.retain(|_, c| c.post_id != post_id);
        }
        Ok(existed)
    }

    async fn modify_reactions<F>(
        &self,
        post_id: Uuid,
        apply: F,
    ) -> Result<Vec<Reaction>, ServiceError>
    where
        F: FnOnce(&mut Vec<Reaction>) -> Result<(), ServiceError> + Send,
    {
        let mut tables = self.lock();
        let post = tables
            .posts
            .get_mut(&post_id)
            .ok_or(ServiceError::NotFound(ErrorMessage::PostNotFound))?;

        // Work on a copy so a failed `apply` leaves the stored list untouched.
        let mut reactions = post.reactions.clone();
        apply(&mut reactions)?;
        post.reactions = reactions.clone();
        post.updated_at = Utc::now();
        Ok(reactions)
    }

    async fn push_comment_ref(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tables = self.lock();
        match tables.posts.get_mut(&post_id) {
            Some(post) if !post.comment_ids.contains(&comment_id) => {
                post.comment_ids.push(comment_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pull_comment_ref(&self, comment_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut tables = self.lock();
        let mut pulled = Vec::new();
        for post in tables.posts.values_mut() {
            if post.comment_ids.contains(&comment_id) {
                post.comment_ids.retain(|id| *id != comment_id);
                pulled.push(post.id);
            }
        }
        Ok(pulled)
    }

    async fn reconcile_comment_refs(&self) -> Result<u64, sqlx::Error> {
        let mut tables = self.lock();
        let mut actual: HashMap<Uuid, Vec<&Comment>> = HashMap::new();
        for comment in tables.comments.values() {
            actual.entry(comment.post_id).or_default().push(comment);
        }
        let actual: HashMap<Uuid, Vec<Uuid>> = actual
            .into_iter()
            .map(|(post_id, mut comments)| {
                comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
                (post_id, comments.into_iter().map(|c| c.id).collect())
            })
            .collect();

        let mut repaired = 0;
        for post in tables.posts.values_mut() {
            let expected = actual.get(&post.id).cloned().unwrap_or_default();
            let mut current_sorted = post.comment_ids.clone();
            let mut expected_sorted = expected.clone();
            current_sorted.sort();
            expected_sorted.sort();
            if current_sorted != expected_sorted {
                post.comment_ids = expected;
                repaired += 1;
            }
        }
        Ok(repaired)
    }
}

impl CommentExt for MemoryStore {
    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.lock().comments.get(&comment_id).cloned())
    }

    async fn get_post_comments(
        &self,
        post_id: Uuid,
        ascending: bool,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        if !ascending {
            comments.reverse();
        }
        Ok(comments)
    }

    async fn get_comments(&self, page: u32, limit: u32) -> Result<Vec<Comment>, sqlx::Error> {
        let mut comments: Vec<Comment> = self.lock().comments.values().cloned().collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(page_slice(comments, page, limit))
    }

    async fn get_comment_count(&self) -> Result<i64, sqlx::Error> {
        Ok(self.lock().comments.len() as i64)
    }

    async fn get_user_comment_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count = self
            .lock()
            .comments
            .values()
            .filter(|c| c.user_id == user_id)
            .count();
        Ok(count as i64)
    }

    async fn save_comment(&self, comment: &Comment) -> Result<Comment, sqlx::Error> {
        let mut tables = self.lock();
        // Same guarantee as the foreign key on comments.post_id
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment.clone())
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut tables = self.lock();
        let Some(comment) = tables.comments.get_mut(&comment_id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.lock().comments.remove(&comment_id).is_some())
    }
}
