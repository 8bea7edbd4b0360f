use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::warn;

use clickflow_core::store::VisitStore;
use clickflow_core::types::{PageVisit, ProjectId, VisitId};

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Visit export: a JSON array or newline-delimited JSON objects
    pub file: PathBuf,

    /// Workspace directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// One row of a visit export. `project` may be a project name or UUID.
#[derive(Debug, Deserialize)]
struct ExportRecord {
    project: String,
    url: String,
    #[serde(default)]
    referrer: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    visited_at: Option<DateTime<Utc>>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let (_, _, store) = super::open_workspace(&args.path)?;

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read ingest file: {}", args.file.display()))?;
    let records = parse_export(&text)?;

    // Project lookup is by name or UUID; cache resolutions across rows.
    let mut project_ids: HashMap<String, Option<ProjectId>> = HashMap::new();

    let bar = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(records.len() as u64).with_style(
            ProgressStyle::with_template(
                "{spinner:.green} ingesting [{bar:30.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("=> "),
        )
    };

    let mut visits = Vec::new();
    let mut skipped = 0usize;
    for (index, record) in records.into_iter().enumerate() {
        bar.inc(1);

        let record = match record {
            Ok(record) => record,
            Err(message) => {
                warn!(index, %message, "Skipping malformed record");
                skipped += 1;
                continue;
            }
        };

        let project_id = match project_ids.get(&record.project) {
            Some(cached) => *cached,
            None => {
                let resolved = super::resolve_project(&store, &record.project)
                    .await
                    .ok()
                    .map(|p| p.id);
                project_ids.insert(record.project.clone(), resolved);
                resolved
            }
        };
        let Some(project_id) = project_id else {
            warn!(index, project = %record.project, "Skipping visit for unknown project");
            skipped += 1;
            continue;
        };

        visits.push(PageVisit {
            id: VisitId(0),
            project_id,
            url: record.url,
            referrer: record.referrer,
            user_agent: record.user_agent,
            visited_at: record.visited_at.unwrap_or_else(Utc::now),
        });
    }
    bar.finish_and_clear();

    let ids = store.insert_visits_batch(&visits).await?;
    println!("Ingested {} visits ({} skipped)", ids.len(), skipped);
    Ok(())
}

/// Parse a JSON array or NDJSON export into per-record results, so one
/// bad row never discards the rest.
fn parse_export(text: &str) -> anyhow::Result<Vec<Result<ExportRecord, String>>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        // A JSON array must parse as a whole; per-element salvage happens
        // on the raw values.
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)
            .map_err(|e| anyhow::anyhow!("Cannot parse ingest file: {e}"))?;
        Ok(values
            .into_iter()
            .map(|value| {
                serde_json::from_value::<ExportRecord>(value).map_err(|e| e.to_string())
            })
            .collect())
    } else {
        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<ExportRecord>(line).map_err(|e| e.to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array() {
        let text = r#"[
            {"project": "site", "url": "/a"},
            {"project": "site", "url": "/b", "referrer": "/a"}
        ]"#;
        let records = parse_export(text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(Result::is_ok));
    }

    #[test]
    fn parses_ndjson_with_bad_rows() {
        let text = "{\"project\": \"site\", \"url\": \"/a\"}\nnot json\n\n{\"project\": \"site\", \"url\": \"/b\"}\n";
        let records = parse_export(text).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[1].is_err());
        assert!(records[2].is_ok());
    }

    #[test]
    fn array_elements_salvaged_individually() {
        let text = r#"[{"project": "site", "url": "/a"}, {"url": "/missing-project"}]"#;
        let records = parse_export(text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_ok());
        assert!(records[1].is_err());
    }

    #[test]
    fn garbage_input_is_an_error() {
        assert!(parse_export("[not json").is_err());
    }
}
