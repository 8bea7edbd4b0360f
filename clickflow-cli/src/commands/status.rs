use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use clickflow_core::store::VisitStore;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Workspace directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub async fn run(args: StatusArgs) -> anyhow::Result<()> {
    let (workspace, _, store) = super::open_workspace(&args.path)?;

    let stats = store.stats().await.context("Failed to read store stats")?;
    let db_path = super::resolve_db_path(&workspace);

    println!("Clickflow status for {}", workspace.display());
    println!();
    println!("  Database: {}", db_path.display());
    if stats.db_size_bytes > 0 {
        println!("  Size:     {}", format_bytes(stats.db_size_bytes));
    }
    println!();

    println!("  Projects: {}", stats.total_projects);
    if !stats.visits_by_project.is_empty() {
        let mut projects: Vec<_> = stats.visits_by_project.iter().collect();
        projects.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in &projects {
            println!("    {name:<20} {count:>8}");
        }
    }
    println!();
    println!("  Visits: {} total", stats.total_visits);

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    for unit in ["B", "KiB", "MiB", "GiB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TiB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_formatting() {
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
