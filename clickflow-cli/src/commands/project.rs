use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Subcommand};

use clickflow_core::store::VisitStore;
use clickflow_core::types::{Project, ProjectId};

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Workspace directory (default: current directory)
    #[arg(long, default_value = ".", global = true)]
    pub path: PathBuf,

    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// Register a new project
    Add {
        /// Unique project name
        name: String,

        /// Public URL of the tracked site
        #[arg(long)]
        url: Option<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },
    /// List registered projects
    List {
        /// Output format: text, json
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

pub async fn run(args: ProjectArgs) -> anyhow::Result<()> {
    let (_, _, store) = super::open_workspace(&args.path)?;

    match args.action {
        ProjectAction::Add {
            name,
            url,
            description,
        } => {
            if store.get_project_by_name(&name).await?.is_some() {
                anyhow::bail!("Project already exists: {name}");
            }
            let project = Project {
                id: ProjectId::new(),
                name,
                url,
                description,
                created_at: Utc::now(),
            };
            store.upsert_project(&project).await?;
            println!("Added project {} ({})", project.name, project.id);
        }
        ProjectAction::List { format } => {
            let projects = store.list_projects().await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else if projects.is_empty() {
                println!("No projects registered. Run `clickflow project add <name>`.");
            } else {
                for project in &projects {
                    let url = project.url.as_deref().unwrap_or("-");
                    println!("{}  {:<20} {}", project.id, project.name, url);
                }
            }
        }
    }
    Ok(())
}
