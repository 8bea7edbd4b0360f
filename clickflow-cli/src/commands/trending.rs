use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use clickflow_core::analyze::leaderboard;
use clickflow_core::store::VisitStore;
use clickflow_core::types::ProjectId;

#[derive(Args, Debug)]
pub struct TrendingArgs {
    /// Workspace directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Output format: text, json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

pub async fn run(args: TrendingArgs) -> anyhow::Result<()> {
    let (_, _, store) = super::open_workspace(&args.path)?;

    let ranked = leaderboard(&store, Utc::now()).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No projects with day-over-day change.");
        return Ok(());
    }

    let names: HashMap<ProjectId, String> = store
        .list_projects()
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    println!(
        "{:>4}  {:<20} {:>8}  {:>7}  {:>9}  movement",
        "rank", "project", "change", "today", "yesterday"
    );
    for row in &ranked {
        let name = names
            .get(&row.project_id)
            .map_or_else(|| row.project_id.to_string(), Clone::clone);
        let movement = match row.rank_change {
            None => "new".to_string(),
            Some(0) => "=".to_string(),
            Some(n) if n > 0 => format!("↑{n}"),
            Some(n) => format!("↓{}", -n),
        };
        println!(
            "{:>4}  {:<20} {:>+7.1}%  {:>7}  {:>9}  {movement}",
            row.rank, name, row.percent, row.clicks_today, row.clicks_yesterday
        );
    }
    Ok(())
}
