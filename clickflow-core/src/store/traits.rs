use crate::time::DayWindow;
use crate::types::{PageVisit, Project, ProjectId, StoreStats, VisitFilter, VisitId};

/// The visit store abstraction. Ingest and every analyzer read/write
/// through this trait.
#[async_trait::async_trait]
pub trait VisitStore: Send + Sync {
    // ── Project operations ─────────────────────────────────────────

    /// Insert or update a project (keyed by id; name must stay unique).
    async fn upsert_project(&self, project: &Project) -> crate::error::Result<ProjectId>;

    /// Get a project by its ID.
    async fn get_project(&self, id: ProjectId) -> crate::error::Result<Option<Project>>;

    /// Get a project by its unique name.
    async fn get_project_by_name(&self, name: &str) -> crate::error::Result<Option<Project>>;

    /// List all projects, oldest first.
    async fn list_projects(&self) -> crate::error::Result<Vec<Project>>;

    /// Delete a project and its visits. Returns whether it existed.
    async fn delete_project(&self, id: ProjectId) -> crate::error::Result<bool>;

    // ── Visit operations ───────────────────────────────────────────

    /// Record a single visit. Returns the assigned ID.
    async fn insert_visit(&self, visit: &PageVisit) -> crate::error::Result<VisitId>;

    /// Record a batch of visits in one transaction. Returns assigned IDs.
    async fn insert_visits_batch(&self, visits: &[PageVisit]) -> crate::error::Result<Vec<VisitId>>;

    /// Visits for a project, newest first, subject to the filter's window
    /// and limit.
    async fn visits_for_project(
        &self,
        project_id: ProjectId,
        filter: &VisitFilter,
    ) -> crate::error::Result<Vec<PageVisit>>;

    /// Visit count for a project, optionally restricted to a day window.
    async fn count_visits(
        &self,
        project_id: ProjectId,
        window: Option<DayWindow>,
    ) -> crate::error::Result<u64>;

    // ── Metrics ────────────────────────────────────────────────────

    /// Get summary statistics about the store.
    async fn stats(&self) -> crate::error::Result<StoreStats>;
}
