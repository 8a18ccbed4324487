//! Note repository implementation.
//!
//! Every statement binds the acting principal's id, so the repository handle
//! is owner-scoped by construction: a caller can only ever read or write its
//! own rows. There is no administrative bypass surface in this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use notavoz_core::{new_v7, Error, NewNote, NoteRecord, NoteStore, Principal, Result};

/// PostgreSQL implementation of [`NoteStore`].
#[derive(Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    /// Create a new PgNoteStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<NoteRecord> {
        Ok(NoteRecord {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            text: row.try_get("transcription_text")?,
            note_type: row.try_get("note_type")?,
            audio_url: row.try_get::<Option<String>, _>("audio_url")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, owner: &Principal, note: NewNote) -> Result<NoteRecord> {
        let id = new_v7();

        let row = sqlx::query(
            r#"
            INSERT INTO notes (id, owner_id, title, transcription_text, note_type, audio_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, title, transcription_text, note_type, audio_url, created_at
            "#,
        )
        .bind(id)
        .bind(owner.id)
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.note_type)
        .bind(&note.audio_url)
        .fetch_one(&self.pool)
        .await?;

        let record = Self::map_row(&row)?;
        tracing::debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = %record.id,
            owner_id = %owner.id,
            "Note inserted"
        );
        Ok(record)
    }

    async fn get(&self, owner: &Principal, id: Uuid) -> Result<NoteRecord> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, transcription_text, note_type, audio_url, created_at
            FROM notes
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::map_row(&row),
            None => Err(Error::NotFound(format!("Note {} not found", id))),
        }
    }

    async fn list(&self, owner: &Principal) -> Result<Vec<NoteRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, transcription_text, note_type, audio_url, created_at
            FROM notes
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn delete(&self, owner: &Principal, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }

        tracing::debug!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            note_id = %id,
            owner_id = %owner.id,
            "Note deleted"
        );
        Ok(())
    }
}
