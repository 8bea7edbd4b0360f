pub mod graph;
pub mod ingest;
pub mod init;
pub mod insights;
pub mod project;
pub mod status;
pub mod trending;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;

use clickflow_core::config::ClickflowConfig;
use clickflow_core::store::sqlite::SqliteStore;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a Clickflow workspace (config + empty database)
    Init(init::InitArgs),
    /// Manage tracked projects
    Project(project::ProjectArgs),
    /// Bulk-load visits from a JSON or NDJSON export
    Ingest(ingest::IngestArgs),
    /// Build and print the referrer flow graph for a project
    Graph(graph::GraphArgs),
    /// Show the day-over-day growth leaderboard
    Trending(trending::TrendingArgs),
    /// Show per-project insights: top page, referrers, devices, trend
    Insights(insights::InsightsArgs),
    /// Show store statistics
    Status(status::StatusArgs),
}

pub async fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Init(args) => init::run(args).await,
        Command::Project(args) => project::run(args).await,
        Command::Ingest(args) => ingest::run(args).await,
        Command::Graph(args) => graph::run(args).await,
        Command::Trending(args) => trending::run(args).await,
        Command::Insights(args) => insights::run(args).await,
        Command::Status(args) => status::run(args).await,
    }
}

/// Location of the database inside an initialized workspace.
pub fn resolve_db_path(workspace: &Path) -> PathBuf {
    workspace.join(".clickflow").join("clickflow.db")
}

/// Location of the config file inside an initialized workspace.
pub fn resolve_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".clickflow").join("config.toml")
}

/// Canonicalize the workspace path and open its config and store,
/// failing with the standard "not initialized" message when missing.
pub fn open_workspace(path: &Path) -> anyhow::Result<(PathBuf, ClickflowConfig, SqliteStore)> {
    let workspace = std::fs::canonicalize(path)
        .with_context(|| format!("Cannot resolve path: {}", path.display()))?;

    let clickflow_dir = workspace.join(".clickflow");
    if !clickflow_dir.exists() {
        anyhow::bail!(
            "Clickflow is not initialized in {}. Run `clickflow init` first.",
            workspace.display()
        );
    }

    let config = ClickflowConfig::load(&resolve_config_path(&workspace))
        .with_context(|| "Cannot load config")?;

    let db_path = resolve_db_path(&workspace);
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Cannot open database: {}", db_path.display()))?;

    Ok((workspace, config, store))
}

/// Resolve a `--project` argument that may be a UUID or a project name.
pub async fn resolve_project(
    store: &SqliteStore,
    key: &str,
) -> anyhow::Result<clickflow_core::types::Project> {
    use clickflow_core::store::VisitStore;
    use clickflow_core::types::ProjectId;

    if let Ok(id) = key.parse::<ProjectId>() {
        if let Some(project) = store.get_project(id).await? {
            return Ok(project);
        }
    }
    store
        .get_project_by_name(key)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No such project: {key}"))
}
