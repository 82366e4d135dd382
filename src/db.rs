use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use hifz_core::{
    CoreError, EntryDraft, EntryStore, MemorizationEntry, UpsertOutcome, Validator,
};

use crate::models::Student;

/// Get current time as milliseconds since Unix epoch.
pub fn current_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Initialize database connection pool with recommended pragmas.
///
/// In-memory databases get a single connection: every connection to
/// `sqlite::memory:` would otherwise open its own empty database.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:");
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
    let options = if in_memory {
        options
    } else {
        options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
    };

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    pool_options.connect_with(options).await
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for migration in [
        include_str!("../migrations/001_create_memorization_entries.sql"),
        include_str!("../migrations/002_create_students.sql"),
    ] {
        sqlx::query(migration).execute(pool).await?;
    }
    Ok(())
}

fn storage_err(e: sqlx::Error) -> CoreError {
    CoreError::Storage(e.to_string())
}

/// A row of `memorization_entries` as SQLite returns it.
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    user_id: String,
    date: String,
    pages: f64,
    time_minutes: i64,
    attendance: String,
    notes: Option<String>,
}

impl TryFrom<EntryRow> for MemorizationEntry {
    type Error = CoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, value: &str| {
            CoreError::Storage(format!("corrupt {} in entry {}: {}", what, row.id, value))
        };

        Ok(MemorizationEntry {
            id: Uuid::parse_str(&row.id).map_err(|_| corrupt("id", &row.id))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|_| corrupt("user_id", &row.user_id))?,
            time_minutes: u32::try_from(row.time_minutes)
                .map_err(|_| corrupt("time_minutes", &row.time_minutes.to_string()))?,
            attendance: row
                .attendance
                .parse()
                .map_err(|_| corrupt("attendance", &row.attendance))?,
            date: row.date,
            pages: row.pages,
            notes: row.notes,
        })
    }
}

const ENTRY_COLUMNS: &str = "id, user_id, date, pages, time_minutes, attendance, notes";

/// SQLite implementation of EntryStore.
#[derive(Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_by_day(
        &self,
        user_id: Uuid,
        date: &str,
    ) -> Result<MemorizationEntry, CoreError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM memorization_entries WHERE user_id = ? AND date = ?",
            ENTRY_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;
        row.try_into()
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    /// Entries come back most recent first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<MemorizationEntry>, CoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM memorization_entries WHERE user_id = ? ORDER BY date DESC",
            ENTRY_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn upsert(&self, user_id: Uuid, draft: EntryDraft) -> Result<UpsertOutcome, CoreError> {
        Validator::validate_draft(&draft)?;
        let fresh = draft.into_entry(Uuid::new_v4(), user_id)?;

        // On conflict the existing row keeps its id, which is how we tell the cases apart.
        sqlx::query(
            r#"
            INSERT INTO memorization_entries
                (id, user_id, date, pages, time_minutes, attendance, notes, updated_epoch_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, date) DO UPDATE SET
                pages = excluded.pages,
                time_minutes = excluded.time_minutes,
                attendance = excluded.attendance,
                notes = excluded.notes,
                updated_epoch_ms = excluded.updated_epoch_ms
            "#,
        )
        .bind(fresh.id.to_string())
        .bind(user_id.to_string())
        .bind(&fresh.date)
        .bind(fresh.pages)
        .bind(i64::from(fresh.time_minutes))
        .bind(fresh.attendance.as_str())
        .bind(fresh.notes.as_deref())
        .bind(current_epoch_ms())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        let entry = self.fetch_by_day(user_id, &fresh.date).await?;
        let created = entry.id == fresh.id;
        Ok(UpsertOutcome { entry, created })
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemorizationEntry>, CoreError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM memorization_entries WHERE id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM memorization_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }
}

/// Add a student to the roster.
pub async fn insert_student(pool: &SqlitePool, full_name: &str) -> Result<Student, sqlx::Error> {
    let student = Student {
        id: Uuid::new_v4().to_string(),
        full_name: full_name.trim().to_string(),
    };

    sqlx::query("INSERT INTO students (id, full_name, created_epoch_ms) VALUES (?, ?, ?)")
        .bind(&student.id)
        .bind(&student.full_name)
        .bind(current_epoch_ms())
        .execute(pool)
        .await?;

    Ok(student)
}

/// All students, ordered by name.
pub async fn list_students(pool: &SqlitePool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT id, full_name FROM students ORDER BY full_name COLLATE NOCASE ASC, id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn get_student(pool: &SqlitePool, id: Uuid) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>("SELECT id, full_name FROM students WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
}
