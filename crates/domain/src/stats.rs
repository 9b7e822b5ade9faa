//! Dashboard aggregates, recomputed on every call.

use crm_core::filters::start_of_month;
use crm_core::stats::{
    completion_rate, needs_follow_up, status_breakdown, ActivityEntry, ClientStats, ProjectStats,
    RECENT_ACTIVITY_LIMIT,
};
use crm_core::status::EngagementStatus;
use crm_db::repositories::{ClientRepo, ProjectRepo};

use crate::{DomainResult, DomainService};

impl DomainService {
    pub async fn project_stats(&self) -> DomainResult<ProjectStats> {
        let now = self.now();

        let rows = ProjectRepo::count_by_status(&self.pool).await?;
        let (by_status, total) = status_breakdown(&rows);
        let completed = by_status
            .get(EngagementStatus::Completed.as_str())
            .copied()
            .unwrap_or(0);

        let new_this_month = ProjectRepo::count_created_since(&self.pool, start_of_month(now)).await?;

        let active = EngagementStatus::Active.as_str();
        let pending_follow_ups = ProjectRepo::last_contacted_for_status(&self.pool, active)
            .await?
            .into_iter()
            .filter(|contacted| needs_follow_up(active, *contacted, now))
            .count() as i64;

        let recent_activity = ProjectRepo::list_recently_updated(&self.pool, RECENT_ACTIVITY_LIMIT)
            .await?
            .into_iter()
            .map(|p| ActivityEntry::project_updated(p.id, &p.name, &p.status, p.updated_at))
            .collect();

        Ok(ProjectStats {
            total,
            new_this_month,
            by_status,
            completion_rate: completion_rate(completed, total),
            pending_follow_ups,
            recent_activity,
        })
    }

    pub async fn client_stats(&self) -> DomainResult<ClientStats> {
        let total = ClientRepo::count(&self.pool).await?;
        let active = ClientRepo::count_with_status(&self.pool, EngagementStatus::Active.as_str()).await?;
        Ok(ClientStats { total, active })
    }
}
