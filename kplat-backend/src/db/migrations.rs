//! Schema migrations for items and football clubs
//!
//! Every statement is idempotent, so `run` is safe on every startup.

use super::{Database, DbError};

/// Run all schema migrations
pub async fn run(db: &Database) -> Result<(), DbError> {
    tracing::info!("Running schema migrations...");
    let pool = db.pool();

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL UNIQUE CHECK (length(trim(name)) > 0),
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS football_clubs (
            id SERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL CHECK (length(trim(name)) > 0),
            country VARCHAR(50) NOT NULL CHECK (length(trim(country)) > 0),
            founded_year INTEGER CHECK (
                founded_year BETWEEN 1800 AND EXTRACT(YEAR FROM CURRENT_DATE)
            ),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (name, country)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // updated_at maintenance
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION set_updated_at() RETURNS TRIGGER AS $$
        BEGIN
            NEW.updated_at = NOW();
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(pool)
    .await?;

    for table in ["items", "football_clubs"] {
        sqlx::query(&format!(
            "DROP TRIGGER IF EXISTS {table}_set_updated_at ON {table}"
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            "CREATE TRIGGER {table}_set_updated_at \
             BEFORE UPDATE ON {table} \
             FOR EACH ROW EXECUTE FUNCTION set_updated_at()"
        ))
        .execute(pool)
        .await?;
    }

    tracing::info!("Schema migrations complete");
    Ok(())
}
