// crates/transfer-intake-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Intake Store
// Description: Durable submission and counter stores backed by SQLite WAL.
// Purpose: Persist intake records with integrity checks and atomic counters.
// Dependencies: transfer-intake-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements the durable [`SubmissionStore`] and
//! [`RateLimitStore`] over a single `SQLite` database. Submission business
//! fields are stored as a JSON payload with a SHA-256 integrity hash; loads
//! verify the hash and fail closed on corruption. A merge-patch runs inside
//! one transaction, so concurrent patches to disjoint fields never clobber
//! each other. Counter increments use a single atomic upsert, which is the
//! cross-process guarantee the rate limiter relies on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use transfer_intake_core::FormMode;
use transfer_intake_core::ListRequest;
use transfer_intake_core::RateLimitCounter;
use transfer_intake_core::RateLimitStore;
use transfer_intake_core::StoreError;
use transfer_intake_core::Submission;
use transfer_intake_core::SubmissionFields;
use transfer_intake_core::SubmissionId;
use transfer_intake_core::SubmissionPage;
use transfer_intake_core::SubmissionPatch;
use transfer_intake_core::SubmissionStore;
use transfer_intake_core::hashing::CounterKey;
use transfer_intake_core::sha256_hex;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum serialized submission payload accepted by the store.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` intake store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed submission and counter store with WAL support.
#[derive(Clone)]
pub struct SqliteIntakeStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteIntakeStore {
    /// Opens an `SQLite`-backed intake store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

impl SubmissionStore for SqliteIntakeStore {
    fn create(&self, submission: &Submission) -> Result<(), StoreError> {
        self.create_record(submission).map_err(StoreError::from)
    }

    fn load(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError> {
        self.load_record(id).map_err(StoreError::from)
    }

    fn patch(
        &self,
        id: &SubmissionId,
        patch: &SubmissionPatch,
        now_ms: i64,
    ) -> Result<Option<Submission>, StoreError> {
        self.patch_record(id, patch, now_ms).map_err(StoreError::from)
    }

    fn delete(&self, id: &SubmissionId) -> Result<bool, StoreError> {
        self.delete_record(id).map_err(StoreError::from)
    }

    fn list(&self, request: &ListRequest) -> Result<SubmissionPage, StoreError> {
        self.list_records(request).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let guard = self.guard().map_err(StoreError::from)?;
        guard
            .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|err| StoreError::Store(err.to_string()))?;
        Ok(())
    }
}

impl SqliteIntakeStore {
    /// Inserts a new submission row.
    fn create_record(&self, submission: &Submission) -> Result<(), SqliteStoreError> {
        let record_json = encode_fields(&submission.fields)?;
        let record_hash = sha256_hex(&record_json);
        let guard = self.guard()?;
        let inserted = guard
            .execute(
                "INSERT OR IGNORE INTO submissions (id, form_mode, created_at, updated_at, \
                 ip_hash, user_agent, record_json, record_hash) VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
                 ?7, ?8)",
                params![
                    submission.id.as_str(),
                    submission.mode.as_str(),
                    submission.created_at,
                    submission.created_at,
                    submission.ip_hash,
                    submission.user_agent,
                    record_json,
                    record_hash
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if inserted == 0 {
            return Err(SqliteStoreError::Invalid(format!(
                "submission {} already exists",
                submission.id.as_str()
            )));
        }
        Ok(())
    }

    /// Loads a submission row and verifies payload integrity.
    fn load_record(&self, id: &SubmissionId) -> Result<Option<Submission>, SqliteStoreError> {
        let row = {
            let guard = self.guard()?;
            guard
                .query_row(
                    "SELECT form_mode, created_at, ip_hash, user_agent, record_json, record_hash \
                     FROM submissions WHERE id = ?1",
                    params![id.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Option<String>>(3)?,
                            row.get::<_, Vec<u8>>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    },
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        let Some((mode_label, created_at, ip_hash, user_agent, record_json, record_hash)) = row
        else {
            return Ok(None);
        };
        let fields = decode_fields(id, &record_json, &record_hash)?;
        Ok(Some(Submission {
            id: id.clone(),
            mode: parse_form_mode(&mode_label)?,
            created_at,
            ip_hash,
            user_agent,
            fields,
        }))
    }

    /// Applies a merge-patch inside one transaction and returns the merged
    /// record.
    fn patch_record(
        &self,
        id: &SubmissionId,
        patch: &SubmissionPatch,
        now_ms: i64,
    ) -> Result<Option<Submission>, SqliteStoreError> {
        let mut guard = self.guard()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let row = tx
            .query_row(
                "SELECT form_mode, created_at, ip_hash, user_agent, record_json, record_hash \
                 FROM submissions WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let Some((mode_label, created_at, ip_hash, user_agent, record_json, record_hash)) = row
        else {
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            return Ok(None);
        };
        let mut fields = decode_fields(id, &record_json, &record_hash)?;
        fields.apply(patch);
        let merged_json = encode_fields(&fields)?;
        let merged_hash = sha256_hex(&merged_json);
        tx.execute(
            "UPDATE submissions SET record_json = ?2, record_hash = ?3, updated_at = ?4 WHERE id \
             = ?1",
            params![id.as_str(), merged_json, merged_hash, now_ms],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(Some(Submission {
            id: id.clone(),
            mode: parse_form_mode(&mode_label)?,
            created_at,
            ip_hash,
            user_agent,
            fields,
        }))
    }

    /// Deletes a submission row.
    fn delete_record(&self, id: &SubmissionId) -> Result<bool, SqliteStoreError> {
        let guard = self.guard()?;
        let removed = guard
            .execute("DELETE FROM submissions WHERE id = ?1", params![id.as_str()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(removed > 0)
    }

    /// Lists submissions newest first with cursor pagination.
    fn list_records(&self, request: &ListRequest) -> Result<SubmissionPage, SqliteStoreError> {
        if request.limit == 0 {
            return Err(SqliteStoreError::Invalid(
                "list limit must be greater than zero".to_string(),
            ));
        }
        let rows = {
            let guard = self.guard()?;
            let mut statement = guard
                .prepare(
                    "SELECT id, form_mode, created_at, ip_hash, user_agent, record_json, \
                     record_hash FROM submissions ORDER BY created_at DESC, id ASC",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mapped = statement
                .query_map(params![], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut rows = Vec::new();
            for row in mapped {
                rows.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
            }
            rows
        };

        let mut records = Vec::new();
        for (id_text, mode_label, created_at, ip_hash, user_agent, record_json, record_hash) in rows
        {
            let mode = parse_form_mode(&mode_label)?;
            if let Some(filter) = request.mode
                && mode != filter
            {
                continue;
            }
            let id = SubmissionId::from(id_text);
            let fields = decode_fields(&id, &record_json, &record_hash)?;
            records.push(Submission {
                id,
                mode,
                created_at,
                ip_hash,
                user_agent,
                fields,
            });
        }
        let start_index = request.cursor.as_ref().map_or(0, |cursor| {
            records.iter().position(|record| record.id.as_str() == cursor).map_or(0, |idx| idx + 1)
        });
        let items: Vec<Submission> =
            records.into_iter().skip(start_index).take(request.limit).collect();
        let next_token = if items.len() == request.limit {
            items.last().map(|record| record.id.as_str().to_string())
        } else {
            None
        };
        Ok(SubmissionPage {
            items,
            next_token,
        })
    }
}

// ============================================================================
// SECTION: Rate Limit Store
// ============================================================================

impl RateLimitStore for SqliteIntakeStore {
    fn get(&self, key: &CounterKey) -> Result<Option<RateLimitCounter>, StoreError> {
        self.load_counter(key).map_err(StoreError::from)
    }

    fn put(&self, key: &CounterKey, counter: &RateLimitCounter) -> Result<(), StoreError> {
        self.put_counter(key, counter).map_err(StoreError::from)
    }

    fn increment(&self, key: &CounterKey, now_ms: i64) -> Result<RateLimitCounter, StoreError> {
        self.increment_counter(key, now_ms).map_err(StoreError::from)
    }

    fn sweep_expired(&self, before_ms: i64) -> Result<u64, StoreError> {
        self.sweep_counters(before_ms).map_err(StoreError::from)
    }
}

impl SqliteIntakeStore {
    /// Loads a counter row.
    fn load_counter(
        &self,
        key: &CounterKey,
    ) -> Result<Option<RateLimitCounter>, SqliteStoreError> {
        let guard = self.guard()?;
        let row = guard
            .query_row(
                "SELECT count, window_start FROM rate_limit_counters WHERE key = ?1",
                params![key.as_str()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        row.map(|(count, window_start)| {
            Ok(RateLimitCounter {
                count: parse_count(count, key)?,
                window_start,
            })
        })
        .transpose()
    }

    /// Creates or replaces a counter row.
    fn put_counter(
        &self,
        key: &CounterKey,
        counter: &RateLimitCounter,
    ) -> Result<(), SqliteStoreError> {
        let guard = self.guard()?;
        guard
            .execute(
                "INSERT INTO rate_limit_counters (key, count, window_start) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET count = excluded.count, window_start = \
                 excluded.window_start",
                params![key.as_str(), i64::from(counter.count), counter.window_start],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Atomically advances a counter and returns the stored state. The
    /// upsert creates the row at one when it is missing, so the operation is
    /// a single write either way.
    fn increment_counter(
        &self,
        key: &CounterKey,
        now_ms: i64,
    ) -> Result<RateLimitCounter, SqliteStoreError> {
        let guard = self.guard()?;
        let (count, window_start) = guard
            .query_row(
                "INSERT INTO rate_limit_counters (key, count, window_start) VALUES (?1, 1, ?2) \
                 ON CONFLICT(key) DO UPDATE SET count = count + 1 RETURNING count, window_start",
                params![key.as_str(), now_ms],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(RateLimitCounter {
            count: parse_count(count, key)?,
            window_start,
        })
    }

    /// Deletes counters whose window started before the given instant.
    fn sweep_counters(&self, before_ms: i64) -> Result<u64, SqliteStoreError> {
        let guard = self.guard()?;
        let removed = guard
            .execute("DELETE FROM rate_limit_counters WHERE window_start < ?1", params![before_ms])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

// ============================================================================
// SECTION: Payload Helpers
// ============================================================================

/// Serializes submission fields and enforces the payload size limit.
fn encode_fields(fields: &SubmissionFields) -> Result<Vec<u8>, SqliteStoreError> {
    let bytes =
        serde_json::to_vec(fields).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if bytes.len() > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Verifies payload integrity and deserializes submission fields.
fn decode_fields(
    id: &SubmissionId,
    record_json: &[u8],
    record_hash: &str,
) -> Result<SubmissionFields, SqliteStoreError> {
    if record_json.len() > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: record_json.len(),
        });
    }
    let expected = sha256_hex(record_json);
    if expected != record_hash {
        return Err(SqliteStoreError::Corrupt(format!(
            "hash mismatch for submission {}",
            id.as_str()
        )));
    }
    serde_json::from_slice(record_json).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Parses a stored form mode label.
fn parse_form_mode(label: &str) -> Result<FormMode, SqliteStoreError> {
    match label {
        "initial" => Ok(FormMode::Initial),
        "partial" => Ok(FormMode::Partial),
        "full" => Ok(FormMode::Full),
        other => Err(SqliteStoreError::Invalid(format!("unsupported form mode: {other}"))),
    }
}

/// Converts a stored counter value, failing closed on nonsense.
fn parse_count(count: i64, key: &CounterKey) -> Result<u32, SqliteStoreError> {
    u32::try_from(count).map_err(|_| {
        SqliteStoreError::Corrupt(format!("invalid counter value for key {}", key.as_str()))
    })
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS submissions (
                    id TEXT PRIMARY KEY,
                    form_mode TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    ip_hash TEXT NOT NULL,
                    user_agent TEXT,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_submissions_created_at
                    ON submissions (created_at);
                CREATE TABLE IF NOT EXISTS rate_limit_counters (
                    key TEXT PRIMARY KEY,
                    count INTEGER NOT NULL,
                    window_start INTEGER NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
