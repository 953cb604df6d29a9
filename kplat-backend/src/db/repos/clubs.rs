//! Football club repository

use crate::db::{Database, DbError};
use crate::models::{FootballClub, NewClub};

/// Football club repository
pub struct ClubRepo<'a> {
    db: &'a Database,
}

impl<'a> ClubRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All clubs, ascending by id.
    pub async fn list(&self) -> Result<Vec<FootballClub>, DbError> {
        let mut conn = self.db.acquire(self.db.acquire_timeout()).await?;
        let clubs = sqlx::query_as::<_, FootballClub>(
            r#"
            SELECT id, name, country, founded_year, created_at, updated_at
            FROM football_clubs
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(clubs)
    }

    /// Insert a club. A duplicate `(name, country)` is a `UniqueViolation`.
    pub async fn insert(&self, club: &NewClub) -> Result<FootballClub, DbError> {
        let mut conn = self.db.acquire(self.db.acquire_timeout()).await?;
        let row = sqlx::query_as::<_, FootballClub>(
            r#"
            INSERT INTO football_clubs (name, country, founded_year)
            VALUES ($1, $2, $3)
            RETURNING id, name, country, founded_year, created_at, updated_at
            "#,
        )
        .bind(club.name.as_str())
        .bind(club.country.as_str())
        .bind(club.founded_year.map(|y| y.get()))
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }
}
