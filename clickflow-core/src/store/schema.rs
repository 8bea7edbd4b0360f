/// Current schema version.
pub const SCHEMA_VERSION: &str = "1";

/// Full SQL schema for Clickflow's `SQLite` database.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS clickflow_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Tracked projects (tenants)
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    url TEXT,
    description TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_projects_name ON projects(name);

-- Raw page visits
CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    url TEXT NOT NULL,
    referrer TEXT,
    user_agent TEXT,
    visited_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_visits_project ON visits(project_id);
CREATE INDEX IF NOT EXISTS idx_visits_project_time ON visits(project_id, visited_at);
";

/// `SQLite` PRAGMAs for performance.
pub const PRAGMAS_SQL: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA cache_size = -64000;
PRAGMA foreign_keys = ON;
";
