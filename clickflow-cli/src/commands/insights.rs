use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use clickflow_core::analyze::growth::trending_rank;
use clickflow_core::analyze::{devices, insights, leaderboard};
use clickflow_core::store::VisitStore;
use clickflow_core::types::{DeviceClass, Trend, VisitFilter};

#[derive(Args, Debug)]
pub struct InsightsArgs {
    /// Project name or UUID
    #[arg(long)]
    pub project: String,

    /// Workspace directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

pub async fn run(args: InsightsArgs) -> anyhow::Result<()> {
    let (_, config, store) = super::open_workspace(&args.path)?;
    let project = super::resolve_project(&store, &args.project).await?;

    let filter = VisitFilter {
        window: None,
        limit: Some(config.store.fetch_limit),
    };
    let visits = store.visits_for_project(project.id, &filter).await?;
    let total = store.count_visits(project.id, None).await?;

    println!("Insights for {}", project.name);
    println!();
    println!("  Total clicks: {total}");

    // Leaderboard position as of now
    let ranked = leaderboard(&store, Utc::now()).await?;
    match trending_rank(project.id, &ranked) {
        Some(rank) => println!("  Trending:     #{rank} of {}", ranked.len()),
        None => println!("  Trending:     not ranked (no day-over-day change)"),
    }
    println!();

    match insights::top_page(&visits) {
        Some((page, count)) => println!("  Top page:     {page} ({count} visits)"),
        None => println!("  Top page:     (no visits)"),
    }
    match insights::top_referrer(&visits) {
        Some((referrer, count)) => println!("  Top referrer: {referrer} ({count} visits)"),
        None => println!("  Top referrer: (no visits)"),
    }
    println!();

    let breakdown = devices::breakdown(&visits);
    println!("  Devices:");
    for device in [
        DeviceClass::Mobile,
        DeviceClass::Tablet,
        DeviceClass::Desktop,
        DeviceClass::Other,
    ] {
        let count = breakdown.get(&device).copied().unwrap_or(0);
        println!("    {:<8} {count}", device.as_str());
    }
    println!();

    let series = insights::daily_series(&visits);
    let arrow = match insights::trend(&series) {
        Trend::Up => "↑",
        Trend::Down => "↓",
        Trend::Flat => "=",
    };
    println!(
        "  Daily trend:  {arrow} {:+.1}% over {} day(s)",
        insights::daily_change(&series),
        series.len()
    );
    for day in series.iter().rev().take(7).rev() {
        println!("    {}  {}", day.date, day.clicks);
    }

    Ok(())
}
