use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{ClickflowError, StoreError};
use crate::time::DayWindow;
use crate::types::{PageVisit, Project, ProjectId, StoreStats, VisitFilter, VisitId};

use super::VisitStore;
use super::schema;

/// Fallback row cap for visit queries when the filter does not set one.
pub const DEFAULT_FETCH_LIMIT: u32 = 1000;

/// SQLite-backed implementation of `VisitStore`.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> crate::error::Result<Self> {
        let conn = Connection::open(path).map_err(StoreError::Sqlite)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> crate::error::Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::Sqlite)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> crate::error::Result<()> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");

        // Performance pragmas (skip WAL for in-memory — it's auto)
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(StoreError::Sqlite)?;

        // Try WAL mode — silently ignored for in-memory
        let _ = conn.execute_batch("PRAGMA journal_mode = WAL;");

        conn.execute_batch(schema::SCHEMA_SQL)
            .map_err(StoreError::Sqlite)?;

        // Set schema version if not present
        conn.execute(
            "INSERT OR IGNORE INTO clickflow_meta (key, value) VALUES ('schema_version', ?1)",
            params![schema::SCHEMA_VERSION],
        )
        .map_err(StoreError::Sqlite)?;

        let stored: String = conn
            .query_row(
                "SELECT value FROM clickflow_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .map_err(StoreError::Sqlite)?;
        if stored != schema::SCHEMA_VERSION {
            return Err(ClickflowError::Store(StoreError::Migration(format!(
                "database has schema version {stored}, expected {}",
                schema::SCHEMA_VERSION
            ))));
        }

        Ok(())
    }

    /// Fixed-width RFC 3339 with milliseconds, so stored timestamps sort
    /// lexicographically.
    fn timestamp_to_sql(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn timestamp_from_sql(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
    }

    /// Helper: read a full project from a row.
    fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
        let id_str: String = row.get("id")?;
        let created_at_str: String = row.get("created_at")?;
        Ok(Project {
            id: ProjectId::from_str(&id_str).unwrap_or_default(),
            name: row.get("name")?,
            url: row.get("url")?,
            description: row.get("description")?,
            created_at: Self::timestamp_from_sql(&created_at_str),
        })
    }

    /// Helper: read a full visit from a row.
    fn row_to_visit(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageVisit> {
        let project_id_str: String = row.get("project_id")?;
        let visited_at_str: String = row.get("visited_at")?;
        Ok(PageVisit {
            id: VisitId(row.get("id")?),
            project_id: ProjectId::from_str(&project_id_str).unwrap_or_default(),
            url: row.get("url")?,
            referrer: row.get("referrer")?,
            user_agent: row.get("user_agent")?,
            visited_at: Self::timestamp_from_sql(&visited_at_str),
        })
    }
}

#[async_trait::async_trait]
impl VisitStore for SqliteStore {
    // ── Project operations ─────────────────────────────────────────

    async fn upsert_project(&self, project: &Project) -> crate::error::Result<ProjectId> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        conn.execute(
            "INSERT INTO projects (id, name, url, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                description = excluded.description",
            params![
                project.id.to_string(),
                project.name,
                project.url,
                project.description,
                Self::timestamp_to_sql(project.created_at),
            ],
        )
        .map_err(StoreError::Sqlite)?;
        Ok(project.id)
    }

    async fn get_project(&self, id: ProjectId) -> crate::error::Result<Option<Project>> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        conn.query_row(
            "SELECT * FROM projects WHERE id = ?1",
            params![id.to_string()],
            Self::row_to_project,
        )
        .optional()
        .map_err(StoreError::Sqlite)
        .map_err(ClickflowError::Store)
    }

    async fn get_project_by_name(&self, name: &str) -> crate::error::Result<Option<Project>> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        conn.query_row(
            "SELECT * FROM projects WHERE name = ?1",
            params![name],
            Self::row_to_project,
        )
        .optional()
        .map_err(StoreError::Sqlite)
        .map_err(ClickflowError::Store)
    }

    async fn list_projects(&self) -> crate::error::Result<Vec<Project>> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        let mut stmt = conn
            .prepare_cached("SELECT * FROM projects ORDER BY created_at, id")
            .map_err(StoreError::Sqlite)?;
        let projects = stmt
            .query_map([], Self::row_to_project)
            .map_err(StoreError::Sqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sqlite)?;
        Ok(projects)
    }

    async fn delete_project(&self, id: ProjectId) -> crate::error::Result<bool> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        let count = conn
            .execute(
                "DELETE FROM projects WHERE id = ?1",
                params![id.to_string()],
            )
            .map_err(StoreError::Sqlite)?;
        Ok(count > 0)
    }

    // ── Visit operations ───────────────────────────────────────────

    async fn insert_visit(&self, visit: &PageVisit) -> crate::error::Result<VisitId> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        conn.execute(
            "INSERT INTO visits (project_id, url, referrer, user_agent, visited_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                visit.project_id.to_string(),
                visit.url,
                visit.referrer,
                visit.user_agent,
                Self::timestamp_to_sql(visit.visited_at),
            ],
        )
        .map_err(StoreError::Sqlite)?;
        Ok(VisitId(conn.last_insert_rowid()))
    }

    async fn insert_visits_batch(
        &self,
        visits: &[PageVisit],
    ) -> crate::error::Result<Vec<VisitId>> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        let tx = conn.unchecked_transaction().map_err(StoreError::Sqlite)?;

        let mut ids = Vec::with_capacity(visits.len());
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO visits (project_id, url, referrer, user_agent, visited_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(StoreError::Sqlite)?;
            for visit in visits {
                stmt.execute(params![
                    visit.project_id.to_string(),
                    visit.url,
                    visit.referrer,
                    visit.user_agent,
                    Self::timestamp_to_sql(visit.visited_at),
                ])
                .map_err(StoreError::Sqlite)?;
                ids.push(VisitId(tx.last_insert_rowid()));
            }
        }
        tx.commit().map_err(StoreError::Sqlite)?;
        Ok(ids)
    }

    async fn visits_for_project(
        &self,
        project_id: ProjectId,
        filter: &VisitFilter,
    ) -> crate::error::Result<Vec<PageVisit>> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        let limit = filter.limit.unwrap_or(DEFAULT_FETCH_LIMIT);

        let visits = if let Some(window) = filter.window {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT * FROM visits
                     WHERE project_id = ?1 AND visited_at >= ?2 AND visited_at <= ?3
                     ORDER BY visited_at DESC, id DESC
                     LIMIT ?4",
                )
                .map_err(StoreError::Sqlite)?;
            stmt.query_map(
                params![
                    project_id.to_string(),
                    Self::timestamp_to_sql(window.start),
                    Self::timestamp_to_sql(window.end),
                    limit,
                ],
                Self::row_to_visit,
            )
            .map_err(StoreError::Sqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sqlite)?
        } else {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT * FROM visits
                     WHERE project_id = ?1
                     ORDER BY visited_at DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(StoreError::Sqlite)?;
            stmt.query_map(params![project_id.to_string(), limit], Self::row_to_visit)
                .map_err(StoreError::Sqlite)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(StoreError::Sqlite)?
        };

        Ok(visits)
    }

    async fn count_visits(
        &self,
        project_id: ProjectId,
        window: Option<DayWindow>,
    ) -> crate::error::Result<u64> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");
        let count: u64 = if let Some(window) = window {
            conn.query_row(
                "SELECT COUNT(*) FROM visits
                 WHERE project_id = ?1 AND visited_at >= ?2 AND visited_at <= ?3",
                params![
                    project_id.to_string(),
                    Self::timestamp_to_sql(window.start),
                    Self::timestamp_to_sql(window.end),
                ],
                |row| row.get(0),
            )
            .map_err(StoreError::Sqlite)?
        } else {
            conn.query_row(
                "SELECT COUNT(*) FROM visits WHERE project_id = ?1",
                params![project_id.to_string()],
                |row| row.get(0),
            )
            .map_err(StoreError::Sqlite)?
        };
        Ok(count)
    }

    // ── Metrics ────────────────────────────────────────────────────

    async fn stats(&self) -> crate::error::Result<StoreStats> {
        let conn = self.conn.lock().expect("clickflow store mutex poisoned");

        let total_projects: u64 = conn
            .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
            .map_err(StoreError::Sqlite)?;
        let total_visits: u64 = conn
            .query_row("SELECT COUNT(*) FROM visits", [], |row| row.get(0))
            .map_err(StoreError::Sqlite)?;

        let mut stmt = conn
            .prepare(
                "SELECT p.name, COUNT(v.id) FROM projects p
                 LEFT JOIN visits v ON v.project_id = p.id
                 GROUP BY p.id",
            )
            .map_err(StoreError::Sqlite)?;
        let visits_by_project: HashMap<String, u64> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })
            .map_err(StoreError::Sqlite)?
            .collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(StoreError::Sqlite)?;

        let db_size_bytes = self
            .db_path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map_or(0, |m| m.len());

        Ok(StoreStats {
            total_projects,
            total_visits,
            visits_by_project,
            db_size_bytes,
        })
    }
}
