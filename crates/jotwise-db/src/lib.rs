//! # jotwise-db
//!
//! PostgreSQL persistence for jotwise notes.
//!
//! Provides the connection pool and a [`NoteRepository`] implementation in
//! which every query is scoped to the owning user.

pub mod notes;
pub mod pool;
pub mod test_fixtures;

pub use notes::PgNoteRepository;
pub use pool::{create_pool, log_pool_metrics, PoolConfig};

pub use jotwise_core::{Error, NoteRepository, Result};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Postgres>,
    pub notes: PgNoteRepository,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn connect(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
