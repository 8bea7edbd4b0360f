// Integration test utilities and fixture data for Clickflow.

use chrono::{DateTime, Duration, TimeZone, Utc};
use clickflow_core::analyze::graph_records;
use clickflow_core::store::VisitStore;
use clickflow_core::store::sqlite::SqliteStore;
use clickflow_core::types::{PageVisit, Project, ProjectId, VisitFilter, VisitId};
use clickflow_graphs::FlowGraph;
use clickflow_graphs::flow::build_flow_graph;

const UA_IPHONE: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
const UA_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36";
const UA_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
const UA_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const UA_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15";

/// Fixed reference instant the fixtures seed against. Mid-afternoon UTC,
/// well clear of day boundaries.
pub fn seed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 20, 15, 0, 0).unwrap()
}

/// Build a project record with a fresh ID.
pub fn project(name: &str) -> Project {
    Project {
        id: ProjectId::new(),
        name: name.to_string(),
        url: None,
        description: None,
        created_at: seed_now() - Duration::days(30),
    }
}

/// Build a visit record. The store assigns the real ID on insert.
pub fn visit(
    project_id: ProjectId,
    url: &str,
    referrer: Option<&str>,
    user_agent: Option<&str>,
    at: DateTime<Utc>,
) -> PageVisit {
    PageVisit {
        id: VisitId(0),
        project_id,
        url: url.to_string(),
        referrer: referrer.map(str::to_string),
        user_agent: user_agent.map(str::to_string),
        visited_at: at,
    }
}

/// A seeded in-memory store with a known shape, for end-to-end tests.
#[derive(Debug)]
pub struct SeededStore {
    pub store: SqliteStore,
    pub now: DateTime<Utc>,
    pub projects: Vec<Project>,
}

impl SeededStore {
    /// Look up a seeded project by name.
    pub fn project(&self, name: &str) -> &Project {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("fixture has no project named {name}"))
    }

    /// Two projects: "launchpad" doubling its clicks day over day
    /// (1 → 2 → 4), "newsletter" flat at 3 clicks a day.
    pub async fn growth_pair() -> Self {
        let store = SqliteStore::in_memory().expect("open in-memory store");
        let now = seed_now();

        let launchpad = project("launchpad");
        let newsletter = project("newsletter");
        store.upsert_project(&launchpad).await.unwrap();
        store.upsert_project(&newsletter).await.unwrap();

        let mut visits = Vec::new();
        for (days_ago, count) in [(0i64, 4u64), (1, 2), (2, 1)] {
            for _ in 0..count {
                visits.push(visit(
                    launchpad.id,
                    "/launch",
                    None,
                    None,
                    now - Duration::days(days_ago),
                ));
            }
        }
        for days_ago in 0..3i64 {
            for _ in 0..3 {
                visits.push(visit(
                    newsletter.id,
                    "/issue",
                    None,
                    None,
                    now - Duration::days(days_ago),
                ));
            }
        }
        store.insert_visits_batch(&visits).await.unwrap();

        Self {
            store,
            now,
            projects: vec![launchpad, newsletter],
        }
    }

    /// One project ("storefront") with three days of history: external
    /// referrers, an internal chain down to checkout, mixed devices, and
    /// a couple of direct hits.
    ///
    /// Per-day click counts are 2 → 4 → 9 (oldest first).
    pub async fn storefront() -> Self {
        let store = SqliteStore::in_memory().expect("open in-memory store");
        let now = seed_now();
        let yesterday = now - Duration::days(1);
        let day_before = now - Duration::days(2);

        let shop = project("storefront");
        store.upsert_project(&shop).await.unwrap();

        let visits = vec![
            // Today: two search arrivals, the chain / → /products →
            // /checkout, one social arrival, and two direct hits.
            visit(shop.id, "/", Some("https://google.com/"), Some(UA_IPHONE), now),
            visit(shop.id, "/", Some("https://google.com"), Some(UA_WINDOWS), now),
            visit(shop.id, "/products", Some("/"), Some(UA_ANDROID), now),
            visit(shop.id, "/products", Some("/"), Some(UA_WINDOWS), now),
            visit(
                shop.id,
                "/Products/",
                Some("https://twitter.com/home"),
                Some(UA_IPAD),
                now,
            ),
            visit(shop.id, "/checkout", Some("/products"), Some(UA_IPHONE), now),
            visit(shop.id, "/", None, None, now),
            visit(shop.id, "/about", None, Some(UA_MAC), now),
            visit(shop.id, "/checkout", Some("/products"), Some(UA_ANDROID), now),
            // Yesterday.
            visit(shop.id, "/", None, None, yesterday),
            visit(shop.id, "/", None, None, yesterday),
            visit(shop.id, "/products", Some("/"), None, yesterday),
            visit(shop.id, "/products", Some("/"), None, yesterday),
            // Day before.
            visit(shop.id, "/", None, None, day_before),
            visit(shop.id, "/", None, None, day_before),
        ];
        store.insert_visits_batch(&visits).await.unwrap();

        Self {
            store,
            now,
            projects: vec![shop],
        }
    }

    /// Three tenants whose pages share the "/" path: "alpha" and "beta"
    /// each have a two-page chain, "gamma" a single direct hit.
    pub async fn multi_tenant() -> Self {
        let store = SqliteStore::in_memory().expect("open in-memory store");
        let now = seed_now();

        let alpha = project("alpha");
        let beta = project("beta");
        let gamma = project("gamma");
        for p in [&alpha, &beta, &gamma] {
            store.upsert_project(p).await.unwrap();
        }

        let visits = vec![
            visit(alpha.id, "/", None, None, now),
            visit(alpha.id, "/docs", Some("/"), None, now),
            visit(beta.id, "/", None, None, now),
            visit(beta.id, "/pricing", Some("/"), None, now),
            visit(gamma.id, "/", None, None, now),
        ];
        store.insert_visits_batch(&visits).await.unwrap();

        Self {
            store,
            now,
            projects: vec![alpha, beta, gamma],
        }
    }
}

/// Fetch a project's stored visits and build its referrer flow graph.
pub async fn flow_graph_for(
    store: &SqliteStore,
    project: &Project,
    filter: &VisitFilter,
) -> anyhow::Result<FlowGraph> {
    let visits = store.visits_for_project(project.id, filter).await?;
    Ok(build_flow_graph(&graph_records(project, &visits)))
}
