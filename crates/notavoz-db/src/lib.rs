//! # notavoz-db
//!
//! PostgreSQL persistence and object storage client for notavoz.
//!
//! This crate provides:
//! - Connection pool management
//! - The owner-scoped note repository
//! - The HTTP object storage client for raw audio
//!
//! ## Example
//!
//! ```rust,ignore
//! use notavoz_core::{NewNote, NoteStore, Principal};
//! use notavoz_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notavoz").await?;
//!
//!     let owner = Principal { id: uuid::Uuid::new_v4(), email: None };
//!     let record = db.notes.insert(&owner, NewNote {
//!         title: "Aula de terça".to_string(),
//!         text: "Hoje falamos sobre frações.".to_string(),
//!         note_type: "text".to_string(),
//!         audio_url: None,
//!     }).await?;
//!
//!     println!("Created note: {}", record.id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod object_store;
pub mod pool;

// Re-export core types
pub use notavoz_core::*;

pub use notes::PgNoteStore;
pub use object_store::HttpBucketStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Main database handle aggregating the repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Owner-scoped note repository.
    pub notes: PgNoteStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteStore::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the database and build a handle with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = pool::create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations against the connected database.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))
    }
}
