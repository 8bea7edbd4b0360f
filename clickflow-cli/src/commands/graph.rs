use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use clickflow_core::analyze::graph_records;
use clickflow_core::store::VisitStore;
use clickflow_core::time::DayWindow;
use clickflow_core::types::VisitFilter;
use clickflow_graphs::flow::{FlowLayout, build_flow_graph_with_layout};
use clickflow_graphs::{FlowGraph, traffic::TrafficProjection};

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Project name or UUID
    #[arg(long)]
    pub project: String,

    /// Workspace directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Visit window: today, lifetime
    #[arg(long, default_value = "lifetime", value_parser = ["today", "lifetime"])]
    pub window: String,

    /// Output format: text, json, dot
    #[arg(long, default_value = "text", value_parser = ["text", "json", "dot"])]
    pub format: String,
}

pub async fn run(args: GraphArgs) -> anyhow::Result<()> {
    let (_, config, store) = super::open_workspace(&args.path)?;
    let project = super::resolve_project(&store, &args.project).await?;

    let filter = VisitFilter {
        window: (args.window == "today").then(|| DayWindow::today(Utc::now())),
        limit: Some(config.store.fetch_limit),
    };
    let visits = store.visits_for_project(project.id, &filter).await?;

    let layout = FlowLayout {
        x_step: config.graph.x_step,
        y_step: config.graph.y_step,
    };
    let graph = build_flow_graph_with_layout(&graph_records(&project, &visits), layout);

    match args.format.as_str() {
        "json" => println!("{}", graph.to_json()?),
        "dot" => print_dot(&graph),
        _ => print_text(&project.name, &graph),
    }
    Ok(())
}

fn print_text(project_name: &str, graph: &FlowGraph) {
    println!(
        "Flow graph for {project_name}: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    if graph.nodes.is_empty() {
        return;
    }

    let max_layer = graph.nodes.iter().map(|n| n.layer).max().unwrap_or(0);
    for layer in 0..=max_layer {
        println!("  layer {layer}:");
        for node in graph.nodes.iter().filter(|n| n.layer == layer) {
            println!(
                "    {:<40} ({:.0}, {:.0})",
                node.id.as_str(),
                node.position.x,
                node.position.y
            );
        }
    }

    // Collapsed per-pair traffic, heaviest first.
    let projection = TrafficProjection::from_flow(graph);
    let mut pairs: Vec<(String, String, u64)> = graph
        .nodes
        .iter()
        .flat_map(|node| {
            projection
                .outgoing(&node.id)
                .into_iter()
                .map(|n| (node.id.to_string(), n.url.to_string(), n.visits))
        })
        .collect();
    pairs.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    if !pairs.is_empty() {
        println!("  traffic:");
        for (source, target, visits) in pairs {
            println!("    {source} -> {target}  {visits}");
        }
    }
}

fn print_dot(graph: &FlowGraph) {
    println!("digraph flow {{");
    println!("  rankdir=TB;");
    for node in &graph.nodes {
        println!(
            "  \"{}\" [color=\"{}\", label=\"{} (L{})\"];",
            node.id.as_str(),
            node.color,
            node.id.as_str(),
            node.layer
        );
    }
    for edge in &graph.edges {
        println!("  \"{}\" -> \"{}\";", edge.source.as_str(), edge.target.as_str());
    }
    println!("}}");
}
