use sqlx::PgPool;
use thiserror::Error;

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "_migrations" (
            "id" SERIAL PRIMARY KEY,
            "name" TEXT NOT NULL UNIQUE,
            "applied_at" TIMESTAMP NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> =
        sqlx::query_scalar(r#"SELECT "name" FROM "_migrations" ORDER BY "id""#)
            .fetch_all(pool)
            .await?;

    let migrations = [(
        "001_init_schema",
        include_str!("../../sql/001_init_schema.sql"),
    )];

    for (name, sql) in migrations {
        if applied.iter().any(|m| m == name) {
            continue;
        }

        tracing::info!(migration = name, "applying migration");
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .map_err(|source| MigrationError::Failed {
                name: name.to_string(),
                source,
            })?;

        sqlx::query(r#"INSERT INTO "_migrations" ("name") VALUES ($1)"#)
            .bind(name)
            .execute(pool)
            .await?;
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("migration {name} failed: {source}")]
    Failed {
        name: String,
        source: sqlx::Error,
    },
}
