use sqlx::{Pool, Postgres};

pub mod scheduler;
pub mod snapshot;

#[cfg(test)]
pub mod memory;

mod user;
pub use user::UserExt;

mod post;
pub use post::PostExt;

mod comment;
pub use comment::CommentExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}
impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// `(page - 1) * limit`, with page 0 treated as the first page
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    (page.max(1) as i64 - 1) * limit as i64
}
