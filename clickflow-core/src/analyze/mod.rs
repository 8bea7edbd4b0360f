pub mod devices;
pub mod growth;
pub mod insights;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::store::VisitStore;
use crate::time::last_two_days;
use crate::types::{GrowthSample, PageVisit, Project, ProjectId, RankedProject};

/// Gather per-project click counts for the leaderboard as of `now`.
///
/// Three consecutive UTC day windows are counted per project; the oldest
/// feeds the prior ranking used for rank movement.
pub async fn collect_growth_samples(
    store: &dyn VisitStore,
    now: DateTime<Utc>,
) -> crate::error::Result<Vec<GrowthSample>> {
    let (today, yesterday) = last_two_days(now);
    let day_before = yesterday.previous();

    let projects = store.list_projects().await?;
    let mut samples = Vec::with_capacity(projects.len());
    for project in &projects {
        samples.push(GrowthSample {
            project_id: project.id,
            clicks_today: store.count_visits(project.id, Some(today)).await?,
            clicks_yesterday: store.count_visits(project.id, Some(yesterday)).await?,
            clicks_day_before: Some(store.count_visits(project.id, Some(day_before)).await?),
        });
    }
    debug!(projects = samples.len(), "Collected growth samples");
    Ok(samples)
}

/// The growth leaderboard as of `now`.
pub async fn leaderboard(
    store: &dyn VisitStore,
    now: DateTime<Utc>,
) -> crate::error::Result<Vec<RankedProject>> {
    let samples = collect_growth_samples(store, now).await?;
    Ok(growth::rank_projects(&samples))
}

/// Total visit count across a set of projects, lifetime.
pub async fn total_clicks(
    store: &dyn VisitStore,
    projects: &[ProjectId],
) -> crate::error::Result<u64> {
    let mut total = 0;
    for &project_id in projects {
        total += store.count_visits(project_id, None).await?;
    }
    Ok(total)
}

/// Convert stored visits into the flow-graph engine's input records.
pub fn graph_records(
    project: &Project,
    visits: &[PageVisit],
) -> Vec<clickflow_graphs::VisitRecord> {
    visits
        .iter()
        .map(|visit| clickflow_graphs::VisitRecord {
            url: visit.url.clone(),
            referrer: visit.referrer.clone(),
            project: project.id.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteStore;
    use crate::types::VisitId;
    use chrono::{Duration, TimeZone};

    fn project(name: &str) -> Project {
        Project {
            id: ProjectId::new(),
            name: name.to_string(),
            url: None,
            description: None,
            created_at: Utc::now(),
        }
    }

    fn visit_at(project_id: ProjectId, at: DateTime<Utc>) -> PageVisit {
        PageVisit {
            id: VisitId(0),
            project_id,
            url: "/".to_string(),
            referrer: None,
            user_agent: None,
            visited_at: at,
        }
    }

    #[tokio::test]
    async fn samples_reflect_day_windows() {
        let store = SqliteStore::in_memory().unwrap();
        let p = project("site");
        store.upsert_project(&p).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 8, 20, 15, 0, 0).unwrap();
        for (days_ago, count) in [(0i64, 4u64), (1, 2), (2, 1)] {
            for _ in 0..count {
                store
                    .insert_visit(&visit_at(p.id, now - Duration::days(days_ago)))
                    .await
                    .unwrap();
            }
        }

        let samples = collect_growth_samples(&store, now).await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].clicks_today, 4);
        assert_eq!(samples[0].clicks_yesterday, 2);
        assert_eq!(samples[0].clicks_day_before, Some(1));
    }

    #[tokio::test]
    async fn leaderboard_ranks_growing_project_first() {
        let store = SqliteStore::in_memory().unwrap();
        let hot = project("hot");
        let flat = project("flat");
        store.upsert_project(&hot).await.unwrap();
        store.upsert_project(&flat).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 8, 20, 15, 0, 0).unwrap();
        // hot: 1 → 3 clicks; flat: 2 → 2.
        store.insert_visit(&visit_at(hot.id, now - Duration::days(1))).await.unwrap();
        for _ in 0..3 {
            store.insert_visit(&visit_at(hot.id, now)).await.unwrap();
        }
        for day in [0, 1] {
            for _ in 0..2 {
                store
                    .insert_visit(&visit_at(flat.id, now - Duration::days(day)))
                    .await
                    .unwrap();
            }
        }

        let ranked = leaderboard(&store, now).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].project_id, hot.id);
        assert_eq!(ranked[0].percent, 200.0);
    }

    #[tokio::test]
    async fn total_clicks_sums_projects() {
        let store = SqliteStore::in_memory().unwrap();
        let a = project("a");
        let b = project("b");
        store.upsert_project(&a).await.unwrap();
        store.upsert_project(&b).await.unwrap();
        for _ in 0..2 {
            store.insert_visit(&visit_at(a.id, Utc::now())).await.unwrap();
        }
        store.insert_visit(&visit_at(b.id, Utc::now())).await.unwrap();

        assert_eq!(total_clicks(&store, &[a.id, b.id]).await.unwrap(), 3);
        assert_eq!(total_clicks(&store, &[b.id]).await.unwrap(), 1);
    }

    #[test]
    fn graph_records_carry_tenant_key() {
        let p = project("site");
        let mut v = visit_at(p.id, Utc::now());
        v.url = "/docs".to_string();
        v.referrer = Some("/".to_string());

        let records = graph_records(&p, &[v]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "/docs");
        assert_eq!(records[0].project, p.id.to_string());
    }
}
