use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS candidates (
        resume_id               UUID PRIMARY KEY,
        full_name               TEXT,
        email                   TEXT,
        phone                   TEXT,
        geo_market              TEXT,
        country                 TEXT,
        approach                TEXT,
        years_experience        DOUBLE PRECISION,
        degree_level            TEXT,
        sectors_json            TEXT NOT NULL DEFAULT '[]',
        asset_classes_json      TEXT NOT NULL DEFAULT '[]',
        roles_json              TEXT NOT NULL DEFAULT '[]',
        skills_programming_json TEXT NOT NULL DEFAULT '[]',
        skills_data_json        TEXT NOT NULL DEFAULT '[]',
        skills_ml_json          TEXT NOT NULL DEFAULT '[]',
        skills_finance_json     TEXT NOT NULL DEFAULT '[]',
        skills_tools_json       TEXT NOT NULL DEFAULT '[]',
        search_blob             TEXT NOT NULL DEFAULT '',
        parsed_json             JSONB NOT NULL,
        source_filename         TEXT NOT NULL,
        raw_document_key        TEXT,
        created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_candidates_geo_market ON candidates (geo_market)",
    "CREATE INDEX IF NOT EXISTS idx_candidates_approach ON candidates (approach)",
    "CREATE INDEX IF NOT EXISTS idx_candidates_years_experience ON candidates (years_experience)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the candidates table and its indexes if they do not exist.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
