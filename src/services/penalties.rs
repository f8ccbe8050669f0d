//! Penalty read side for reporting and billing

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{MemberPenaltySummary, Penalty},
    repository::Repository,
};

#[derive(Clone)]
pub struct PenaltiesService {
    repository: Repository,
}

/// Circulation counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CirculationSummary {
    pub active_checkouts: i64,
    pub overdue_checkouts: i64,
}

impl PenaltiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_for_return(&self, return_id: i32) -> AppResult<Option<Penalty>> {
        self.repository.penalties.get_by_return(return_id).await
    }

    pub async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<Penalty>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.penalties.list_for_member(member_id).await
    }

    pub async fn member_summary(&self, member_id: i32) -> AppResult<MemberPenaltySummary> {
        self.repository.members.get_by_id(member_id).await?;
        self.repository.penalties.summary_for_member(member_id).await
    }

    /// Active and overdue checkout counts as of `today`
    pub async fn circulation_summary(&self, today: NaiveDate) -> AppResult<CirculationSummary> {
        Ok(CirculationSummary {
            active_checkouts: self.repository.checkouts.count_active().await?,
            overdue_checkouts: self.repository.checkouts.count_overdue(today).await?,
        })
    }
}
