//! Item repository
//!
//! - list: every row, ordered by id
//! - insert: plain INSERT; a duplicate name surfaces as `UniqueViolation`

use crate::db::{Database, DbError};
use crate::models::{Item, NewItem};

/// Item repository
pub struct ItemRepo<'a> {
    db: &'a Database,
}

impl<'a> ItemRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All items, ascending by id.
    pub async fn list(&self) -> Result<Vec<Item>, DbError> {
        let mut conn = self.db.acquire(self.db.acquire_timeout()).await?;
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM items
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    pub async fn insert(&self, item: &NewItem) -> Result<Item, DbError> {
        let mut conn = self.db.acquire(self.db.acquire_timeout()).await?;
        let row = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(item.name.as_str())
        .bind(item.description.as_deref())
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }
}
