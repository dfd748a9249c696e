//! Slot Desk Core - admission slot limits for registrars
//!
//! The workflow behind the registrar's slot limit page:
//! - Fetches school years and programs, auto-selects the active year
//! - Derives remaining capacity and OPEN/FULL status per program
//! - Filters the availability summary by free text
//! - Edits and upserts per-program slot limits
//! - Gates the page on an explicit session and a page-access check
//!
//! The admissions service is reached through the [`SlotGateway`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use slotdesk_core::prelude::*;
//!
//! # async fn example(gateway: impl SlotGateway) -> Result<(), SlotError> {
//! let mut controller = SlotLimitController::new(gateway);
//! controller.load().await?;
//!
//! for row in controller.view().visible() {
//!     println!("{} {} {}", row.row.label(), row.remaining, row.status);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod availability;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod presets;
pub mod sequence;
pub mod session;
pub mod types;

// Re-exports for convenience
pub use availability::{
    filter_rows, matches_filter, ApplyOutcome, Availability, AvailabilityView, SlotStatus,
    SummaryRequest,
};
pub use config::SlotDeskConfig;
pub use controller::{Notice, SlotLimitController, SlotLimitForm};
pub use error::{FormError, GatewayError, SlotError};
pub use gateway::SlotGateway;
pub use presets::SlotPresets;
pub use sequence::{RequestSequencer, RequestToken};
pub use session::{
    authorize, Authorization, DenialReason, Role, Session, REGISTRAR_ROLE, SLOT_LIMIT_PAGE_ID,
};
pub use types::{
    active_year, MaxSlots, PageAccess, Program, ProgramId, SchoolYear, SlotLimit, SlotSummaryRow,
    YearId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Slot Desk Core
    pub use crate::{
        authorize, Authorization, Availability, MaxSlots, Program, ProgramId, SchoolYear,
        Session, SlotDeskConfig, SlotError, SlotGateway, SlotLimit, SlotLimitController,
        SlotStatus, SlotSummaryRow, YearId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
