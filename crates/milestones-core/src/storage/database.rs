//! SQLite-backed record store and settings store.
//!
//! Provides persistent storage for:
//! - Milestones (newest-first listing, in-place updates)
//! - The Config singleton row, created on first launch
//! - Boolean display flags in the `settings` key-value table
//!
//! Every mutation is announced to subscribers registered with [`MilestoneDb::subscribe`].

use std::cell::Cell;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, Result};
use crate::events::{ChangeNotifier, StoreEvent, SubscriptionId};
use crate::milestone::{check_storable, Milestone};

const DB_FILE: &str = "milestones.db";

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            warn!(column = idx, value = raw, "unparseable timestamp in store");
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Refuse timestamps that would not read back from their text form.
fn check_timestamps(milestone: &Milestone) -> Result<()> {
    check_storable("created_at", &milestone.created_at)?;
    check_storable("target", &milestone.target)?;
    Ok(())
}

/// Build a Milestone from a `SELECT id, created_at, target, title, notes` row.
fn row_to_milestone(row: &rusqlite::Row) -> std::result::Result<Milestone, rusqlite::Error> {
    let created_at: String = row.get(1)?;
    let target: String = row.get(2)?;
    Ok(Milestone {
        id: row.get(0)?,
        created_at: parse_timestamp(1, &created_at)?,
        target: parse_timestamp(2, &target)?,
        title: row.get(3)?,
        notes: row.get(4)?,
    })
}

/// SQLite database holding milestones, the config row and display settings.
pub struct MilestoneDb {
    conn: Connection,
    notifier: ChangeNotifier,
    data_version: Cell<i64>,
}

impl MilestoneDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DB_FILE);
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened milestone store");
        Self::init(conn)
    }

    /// Open an in-memory database (for tests and previews).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        let db = Self {
            conn,
            notifier: ChangeNotifier::new(),
            data_version: Cell::new(0),
        };
        db.ensure_initialized()?;
        db.data_version.set(db.read_data_version()?);
        Ok(db)
    }

    fn read_data_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?)
    }

    /// Announce commits made by other connections since the last check.
    ///
    /// SQLite bumps `data_version` only for commits from other connections.
    /// Returns true if a change was seen.
    pub fn check_external_changes(&self) -> Result<bool> {
        let current = self.read_data_version()?;
        if current == self.data_version.replace(current) {
            return Ok(false);
        }
        debug!(data_version = current, "external change detected");
        self.notifier.notify(&StoreEvent::ExternalChange);
        Ok(true)
    }

    // ── Config singleton ─────────────────────────────────────────────

    /// Create the Config row if it is missing. Returns true on first launch.
    pub fn ensure_initialized(&self) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO config (id, created_at) VALUES (1, ?1)",
            params![format_timestamp(&Utc::now())],
        )?;
        if inserted > 0 {
            info!("first launch: config record created");
        }
        Ok(inserted > 0)
    }

    /// When the config row was created.
    pub fn first_launch_at(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT created_at FROM config WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(parse_timestamp(0, &raw)?)),
            None => Ok(None),
        }
    }

    pub fn config_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM config", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ── Milestones ───────────────────────────────────────────────────

    pub fn insert_milestone(&self, milestone: &Milestone) -> Result<()> {
        check_timestamps(milestone)?;
        self.conn.execute(
            "INSERT INTO milestones (id, created_at, target, title, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                milestone.id,
                format_timestamp(&milestone.created_at),
                format_timestamp(&milestone.target),
                milestone.title,
                milestone.notes,
            ],
        )?;
        debug!(id = %milestone.id, "milestone inserted");
        self.notifier.notify(&StoreEvent::MilestoneInserted {
            milestone: milestone.clone(),
        });
        Ok(())
    }

    /// Write the mutable fields back. Returns false if the record no longer exists.
    pub fn update_milestone(&self, milestone: &Milestone) -> Result<bool> {
        check_timestamps(milestone)?;
        let changed = self.conn.execute(
            "UPDATE milestones SET target = ?1, title = ?2, notes = ?3 WHERE id = ?4",
            params![
                format_timestamp(&milestone.target),
                milestone.title,
                milestone.notes,
                milestone.id,
            ],
        )?;
        if changed == 0 {
            debug!(id = %milestone.id, "update skipped: milestone is gone");
            return Ok(false);
        }
        debug!(id = %milestone.id, "milestone updated");
        self.notifier.notify(&StoreEvent::MilestoneUpdated {
            milestone: milestone.clone(),
        });
        Ok(true)
    }

    /// Returns false if nothing was deleted.
    pub fn delete_milestone(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Ok(false);
        }
        debug!(id, "milestone deleted");
        self.notifier
            .notify(&StoreEvent::MilestoneDeleted { id: id.to_string() });
        Ok(true)
    }

    pub fn get_milestone(&self, id: &str) -> Result<Option<Milestone>> {
        let milestone = self
            .conn
            .query_row(
                "SELECT id, created_at, target, title, notes FROM milestones WHERE id = ?1",
                params![id],
                row_to_milestone,
            )
            .optional()?;
        Ok(milestone)
    }

    /// All milestones, newest `created_at` first.
    pub fn list_milestones(&self) -> Result<Vec<Milestone>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, target, title, notes
             FROM milestones
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let milestones = stmt
            .query_map([], row_to_milestone)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(milestones)
    }

    /// Look up a milestone by full id or unique id prefix.
    ///
    /// # Errors
    /// `NotFound` when nothing matches, `AmbiguousId` when the prefix is shared.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<Milestone> {
        if let Some(found) = self.get_milestone(id_or_prefix)? {
            return Ok(found);
        }
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, target, title, notes FROM milestones
             WHERE substr(id, 1, length(?1)) = ?1",
        )?;
        let mut matches = stmt
            .query_map(params![id_or_prefix], row_to_milestone)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        match matches.len() {
            0 => Err(CoreError::NotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            count => Err(CoreError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                count,
            }),
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Read a boolean flag. Missing or malformed values read as `None`.
    pub fn get_flag(&self, key: &str) -> Result<Option<bool>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(raw.and_then(|v| match v.parse::<bool>() {
            Ok(b) => Some(b),
            Err(_) => {
                warn!(key, value = %v, "ignoring malformed setting");
                None
            }
        }))
    }

    pub fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value.to_string()],
        )?;
        self.notifier.notify(&StoreEvent::SettingChanged {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    // ── Change notification ──────────────────────────────────────────

    pub fn subscribe(&self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}
