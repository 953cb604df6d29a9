//! Demo data
//!
//! Seeding skips rows that already exist, so it can be repeated.

use super::{Database, DbError};

const ITEMS: &[(&str, &str)] = &[
    ("alpha", "First sample item"),
    ("beta", "Second sample item"),
    ("gamma", "Third sample item"),
    ("delta", "Fourth sample item"),
    ("epsilon", "Fifth sample item"),
];

const CLUBS: &[(&str, &str, i32)] = &[
    ("Real Madrid", "Spain", 1902),
    ("Barcelona", "Spain", 1899),
    ("Manchester United", "England", 1878),
    ("Liverpool", "England", 1892),
    ("Bayern Munich", "Germany", 1900),
    ("Juventus", "Italy", 1897),
    ("AC Milan", "Italy", 1899),
    ("Paris Saint-Germain", "France", 1970),
    ("Ajax", "Netherlands", 1900),
    ("Benfica", "Portugal", 1904),
];

/// Rows actually inserted by a seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub items: u64,
    pub clubs: u64,
}

/// Insert the demo items and clubs inside one transaction.
pub async fn run(db: &Database) -> Result<SeedReport, DbError> {
    let mut tx = db.pool().begin().await?;
    let mut report = SeedReport::default();

    for (name, description) in ITEMS {
        report.items += sqlx::query(
            "INSERT INTO items (name, description) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(*name)
        .bind(*description)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for (name, country, founded_year) in CLUBS {
        report.clubs += sqlx::query(
            "INSERT INTO football_clubs (name, country, founded_year) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(*name)
        .bind(*country)
        .bind(*founded_year)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;

    tracing::info!(items = report.items, clubs = report.clubs, "Seed data inserted");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClubName, Country, FoundedYear, ItemName};

    #[test]
    fn seed_rows_pass_validation() {
        for (name, _) in ITEMS {
            assert!(ItemName::new(name).is_ok(), "{name}");
        }
        for (name, country, year) in CLUBS {
            assert!(ClubName::new(name).is_ok(), "{name}");
            assert!(Country::new(country).is_ok(), "{country}");
            assert!(FoundedYear::new(*year).is_ok(), "{year}");
        }
    }

    #[test]
    fn seed_club_keys_are_unique() {
        let mut keys: Vec<_> = CLUBS.iter().map(|(n, c, _)| (*n, *c)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), CLUBS.len());
    }
}
