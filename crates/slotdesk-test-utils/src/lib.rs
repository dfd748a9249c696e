//! Testing utilities for Slot Desk workspace
//!
//! Shared fixtures and an in-memory admissions service.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use slotdesk_core::{
    GatewayError, MaxSlots, PageAccess, Program, ProgramId, SchoolYear, Session, SlotGateway,
    SlotLimit, SlotSummaryRow, YearId, SLOT_LIMIT_PAGE_ID,
};
use std::collections::{HashMap, HashSet};

/// Gateway operation, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListPrograms,
    ListSchoolYears,
    SlotSummary,
    Upsert,
    PageAccess,
}

/// Recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPrograms,
    ListSchoolYears,
    SlotSummary(YearId),
    Upsert(SlotLimit),
    PageAccess(String, u32),
}

#[derive(Debug, Default)]
struct State {
    programs: Vec<Program>,
    years: Vec<SchoolYear>,
    limits: Vec<SlotLimit>,
    applicants: HashMap<(YearId, ProgramId), i64>,
    privileges: HashMap<(String, u32), i64>,
    failing: HashSet<Op>,
    failing_after: HashMap<Op, usize>,
    calls: Vec<Call>,
}

/// Admissions service kept in memory
///
/// The summary for a year lists every program with a configured limit,
/// in program order, with the recorded applicant count.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_programs(self, programs: Vec<Program>) -> Self {
        self.state.lock().programs = programs;
        self
    }

    pub fn with_years(self, years: Vec<SchoolYear>) -> Self {
        self.state.lock().years = years;
        self
    }

    pub fn with_limit(self, year: u64, program: u64, max_slots: u32) -> Self {
        let max_slots = MaxSlots::new(max_slots).expect("fixture limit must be positive");
        self.store_limit(SlotLimit::new(YearId(year), ProgramId(program), max_slots));
        self
    }

    pub fn with_applicants(self, year: u64, program: u64, count: i64) -> Self {
        self.set_applicants(year, program, count);
        self
    }

    pub fn with_privilege(self, employee_id: &str, page_id: u32, privilege: i64) -> Self {
        self.state
            .lock()
            .privileges
            .insert((employee_id.to_string(), page_id), privilege);
        self
    }

    pub fn set_applicants(&self, year: u64, program: u64, count: i64) {
        self.state
            .lock()
            .applicants
            .insert((YearId(year), ProgramId(program)), count);
    }

    /// Make every following call of `op` fail with a transport error
    pub fn fail(&self, op: Op) {
        self.state.lock().failing.insert(op);
    }

    /// Let `op` succeed `successes` more times, then fail like `fail`
    pub fn fail_after(&self, op: Op, successes: usize) {
        self.state.lock().failing_after.insert(op, successes);
    }

    pub fn recover(&self, op: Op) {
        let mut state = self.state.lock();
        state.failing.remove(&op);
        state.failing_after.remove(&op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn summary_calls(&self, year: u64) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| **c == Call::SlotSummary(YearId(year)))
            .count()
    }

    pub fn limit(&self, year: u64, program: u64) -> Option<MaxSlots> {
        self.state
            .lock()
            .limits
            .iter()
            .find(|l| l.year_id == YearId(year) && l.program_id == ProgramId(program))
            .map(|l| l.max_slots)
    }

    fn store_limit(&self, limit: SlotLimit) {
        let mut state = self.state.lock();
        let existing = state
            .limits
            .iter()
            .position(|l| l.year_id == limit.year_id && l.program_id == limit.program_id);
        match existing {
            Some(idx) => state.limits[idx].max_slots = limit.max_slots,
            None => state.limits.push(limit),
        }
    }

    fn enter(&self, op: Op, call: Call) -> Result<(), GatewayError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.calls.push(call);
        if let Some(left) = state.failing_after.get_mut(&op) {
            if *left == 0 {
                state.failing.insert(op);
            } else {
                *left -= 1;
            }
        }
        if state.failing.contains(&op) {
            return Err(GatewayError::Transport(format!("{op:?} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl SlotGateway for InMemoryGateway {
    async fn list_programs(&self) -> Result<Vec<Program>, GatewayError> {
        self.enter(Op::ListPrograms, Call::ListPrograms)?;
        Ok(self.state.lock().programs.clone())
    }

    async fn list_school_years(&self) -> Result<Vec<SchoolYear>, GatewayError> {
        self.enter(Op::ListSchoolYears, Call::ListSchoolYears)?;
        Ok(self.state.lock().years.clone())
    }

    async fn slot_summary(&self, year_id: YearId) -> Result<Vec<SlotSummaryRow>, GatewayError> {
        self.enter(Op::SlotSummary, Call::SlotSummary(year_id))?;
        let state = self.state.lock();
        let rows = state
            .programs
            .iter()
            .filter_map(|p| {
                let limit = state
                    .limits
                    .iter()
                    .find(|l| l.year_id == year_id && l.program_id == p.program_id)?;
                let applicants = state
                    .applicants
                    .get(&(year_id, p.program_id))
                    .copied()
                    .unwrap_or(0);
                Some(SlotSummaryRow {
                    program_id: p.program_id,
                    program_code: p.program_code.clone(),
                    program_description: p.program_description.clone(),
                    major: p.program_major.clone(),
                    max_slots: Some(i64::from(limit.max_slots.get())),
                    total_applicants: Some(applicants),
                })
            })
            .collect();
        Ok(rows)
    }

    async fn upsert_slot_limit(&self, limit: SlotLimit) -> Result<(), GatewayError> {
        self.enter(Op::Upsert, Call::Upsert(limit))?;
        self.store_limit(limit);
        Ok(())
    }

    async fn page_access(
        &self,
        employee_id: &str,
        page_id: u32,
    ) -> Result<PageAccess, GatewayError> {
        self.enter(Op::PageAccess, Call::PageAccess(employee_id.to_string(), page_id))?;
        let page_privilege = self
            .state
            .lock()
            .privileges
            .get(&(employee_id.to_string(), page_id))
            .copied()
            .unwrap_or(0);
        Ok(PageAccess { page_privilege })
    }
}

pub fn sample_years() -> Vec<SchoolYear> {
    vec![
        SchoolYear::new(1, "2024-2025", 1),
        SchoolYear::new(2, "2025-2026", 0),
    ]
}

pub fn sample_programs() -> Vec<Program> {
    vec![
        Program::new(10, "BSIT", "Bachelor of Science in Information Technology"),
        Program::new(11, "BSED", "Bachelor of Secondary Education").with_major("Mathematics"),
        Program::new(12, "BSCS", "Bachelor of Science in Computer Science"),
    ]
}

pub const REGISTRAR_EMPLOYEE_ID: &str = "EMP-0042";

pub fn registrar_session() -> Session {
    Session::from_parts(
        Some("registrar@school.edu".to_string()),
        Some("registrar".to_string()),
        Some("42".to_string()),
        Some(REGISTRAR_EMPLOYEE_ID.to_string()),
    )
    .expect("fixture session is complete")
}

/// Service with sample years and programs, limits for the active year and
/// page access for the registrar fixture
pub fn seeded_gateway() -> InMemoryGateway {
    InMemoryGateway::new()
        .with_years(sample_years())
        .with_programs(sample_programs())
        .with_limit(1, 10, 50)
        .with_applicants(1, 10, 50)
        .with_limit(1, 11, 40)
        .with_applicants(1, 11, 12)
        .with_privilege(REGISTRAR_EMPLOYEE_ID, SLOT_LIMIT_PAGE_ID, 1)
}
