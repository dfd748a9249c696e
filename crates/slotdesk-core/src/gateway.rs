//! Remote data gateway contract
//!
//! The admissions service is an external collaborator. Every call is a
//! direct request/response: no retry, no backoff, no caching.

use crate::error::GatewayError;
use crate::types::{PageAccess, Program, SchoolYear, SlotLimit, SlotSummaryRow, YearId};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations against the admissions service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotGateway: Send + Sync {
    /// List all programs
    async fn list_programs(&self) -> Result<Vec<Program>, GatewayError>;

    /// List all school years
    async fn list_school_years(&self) -> Result<Vec<SchoolYear>, GatewayError>;

    /// Availability summary for one year, in service order
    async fn slot_summary(&self, year_id: YearId) -> Result<Vec<SlotSummaryRow>, GatewayError>;

    /// Create or update a slot limit
    ///
    /// On success the next `slot_summary` for the year reflects the limit.
    async fn upsert_slot_limit(&self, limit: SlotLimit) -> Result<(), GatewayError>;

    /// Page privilege of an employee
    async fn page_access(&self, employee_id: &str, page_id: u32)
        -> Result<PageAccess, GatewayError>;
}

#[async_trait]
impl<T: SlotGateway + ?Sized> SlotGateway for Arc<T> {
    async fn list_programs(&self) -> Result<Vec<Program>, GatewayError> {
        (**self).list_programs().await
    }

    async fn list_school_years(&self) -> Result<Vec<SchoolYear>, GatewayError> {
        (**self).list_school_years().await
    }

    async fn slot_summary(&self, year_id: YearId) -> Result<Vec<SlotSummaryRow>, GatewayError> {
        (**self).slot_summary(year_id).await
    }

    async fn upsert_slot_limit(&self, limit: SlotLimit) -> Result<(), GatewayError> {
        (**self).upsert_slot_limit(limit).await
    }

    async fn page_access(
        &self,
        employee_id: &str,
        page_id: u32,
    ) -> Result<PageAccess, GatewayError> {
        (**self).page_access(employee_id, page_id).await
    }
}
