use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use clickflow_core::config::ClickflowConfig;
use clickflow_core::store::sqlite::SqliteStore;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Workspace directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[allow(clippy::unused_async)]
pub async fn run(args: InitArgs) -> anyhow::Result<()> {
    let workspace = std::fs::canonicalize(&args.path)
        .with_context(|| format!("Cannot resolve path: {}", args.path.display()))?;

    let clickflow_dir = workspace.join(".clickflow");
    let config_path = super::resolve_config_path(&workspace);
    if config_path.exists() {
        anyhow::bail!("Clickflow is already initialized in {}", workspace.display());
    }

    std::fs::create_dir_all(&clickflow_dir)
        .with_context(|| format!("Cannot create {}", clickflow_dir.display()))?;

    let config = ClickflowConfig::default();
    std::fs::write(&config_path, config.to_toml()?)
        .with_context(|| format!("Cannot write {}", config_path.display()))?;

    let db_path = super::resolve_db_path(&workspace);
    SqliteStore::open(&db_path)
        .with_context(|| format!("Cannot open database: {}", db_path.display()))?;

    println!("Initialized Clickflow in {}", clickflow_dir.display());
    println!("  Config:   {}", config_path.display());
    println!("  Database: {}", db_path.display());
    Ok(())
}
