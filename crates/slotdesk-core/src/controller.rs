//! Slot limit form controller
//!
//! Drives the registrar workflow:
//! - Load programs and school years, auto-select the active year
//! - Refresh the availability summary whenever the year changes
//! - Copy a summary row into the form for editing
//! - Validate and upsert the limit, then refresh and clear the form
//!
//! There is no terminal state; the controller cycles between idle, edit and
//! save for as long as the host keeps it.

use crate::availability::{ApplyOutcome, AvailabilityView, SummaryRequest};
use crate::error::{FormError, GatewayError, SlotError};
use crate::gateway::SlotGateway;
use crate::types::{
    active_year, MaxSlots, Program, ProgramId, SchoolYear, SlotLimit, SlotSummaryRow, YearId,
};

/// Editable selection
///
/// Max slots can come from two inputs: a preset picker and a free numeric
/// entry. The numeric entry wins; the preset applies only while the numeric
/// entry is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotLimitForm {
    year_id: Option<YearId>,
    selected_program: Option<ProgramId>,
    preset: Option<MaxSlots>,
    entered: Option<MaxSlots>,
    is_editing: bool,
}

impl SlotLimitForm {
    /// Create empty form
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected school year
    #[inline]
    #[must_use]
    pub fn year_id(&self) -> Option<YearId> {
        self.year_id
    }

    /// Selected program
    #[inline]
    #[must_use]
    pub fn selected_program(&self) -> Option<ProgramId> {
        self.selected_program
    }

    /// Effective max-slots value
    #[inline]
    #[must_use]
    pub fn max_slots(&self) -> Option<MaxSlots> {
        self.entered.or(self.preset)
    }

    /// Whether a row is being edited
    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    /// Label of the save action
    #[inline]
    #[must_use]
    pub fn save_label(&self) -> &'static str {
        if self.is_editing {
            "Update"
        } else {
            "Save"
        }
    }

    /// Set the numeric entry from raw text
    ///
    /// Blank input clears the entry.
    ///
    /// # Errors
    /// - `FormError::InvalidQuantity` for anything but a positive integer;
    ///   the previous entry is kept
    pub fn enter_max_slots(&mut self, input: &str) -> Result<(), FormError> {
        if input.trim().is_empty() {
            self.entered = None;
            return Ok(());
        }
        self.entered = Some(MaxSlots::parse(input)?);
        Ok(())
    }

    /// Build the write model
    ///
    /// # Errors
    /// - `FormError::MissingYear`, `MissingProgram` or `MissingMaxSlots` for
    ///   the first absent field
    pub fn validate(&self) -> Result<SlotLimit, FormError> {
        let year_id = self.year_id.ok_or(FormError::MissingYear)?;
        let program_id = self.selected_program.ok_or(FormError::MissingProgram)?;
        let max_slots = self.max_slots().ok_or(FormError::MissingMaxSlots)?;
        Ok(SlotLimit::new(year_id, program_id, max_slots))
    }

    fn begin_edit(&mut self, row: &SlotSummaryRow) {
        self.selected_program = Some(row.program_id);
        self.entered = row.max_slots.and_then(|v| MaxSlots::try_from(v).ok());
        self.preset = None;
        self.is_editing = true;
    }

    fn clear_after_save(&mut self) {
        self.selected_program = None;
        self.preset = None;
        self.entered = None;
        self.is_editing = false;
    }
}

/// Outcome message for the registrar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Limit stored
    Saved(SlotLimit),
    /// Operation failed; form input was kept
    Error(String),
}

/// Registrar workflow over a gateway
#[derive(Debug)]
pub struct SlotLimitController<G> {
    gateway: G,
    programs: Vec<Program>,
    school_years: Vec<SchoolYear>,
    form: SlotLimitForm,
    view: AvailabilityView,
    saving: bool,
    notice: Option<Notice>,
}

impl<G: SlotGateway> SlotLimitController<G> {
    /// Create controller in the initial state
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            programs: Vec::new(),
            school_years: Vec::new(),
            form: SlotLimitForm::new(),
            view: AvailabilityView::new(),
            saving: false,
            notice: None,
        }
    }

    /// Load reference data and auto-select the active year
    ///
    /// Programs and school years are fetched concurrently. When a year is
    /// active it is selected, which refreshes the summary.
    ///
    /// The two lists are independent: a failed list stays empty while the
    /// other is stored, and the active year is still selected from the
    /// years when only the programs failed.
    ///
    /// # Errors
    /// - `SlotError::Gateway` for the first failure among programs, school
    ///   years and the first summary
    pub async fn load(&mut self) -> Result<(), SlotError> {
        tracing::info!("loading programs and school years");

        let (programs, years) = tokio::join!(
            self.gateway.list_programs(),
            self.gateway.list_school_years()
        );

        let mut first_error = None;
        match programs {
            Ok(programs) => self.programs = programs,
            Err(e) => first_error = Some(self.fail("programs", e)),
        }
        match years {
            Ok(years) => self.school_years = years,
            Err(e) => {
                let err = self.fail("school years", e);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        tracing::debug!(
            programs = self.programs.len(),
            years = self.school_years.len(),
            "reference data loaded"
        );

        let selected = match active_year(&self.school_years).map(|y| y.year_id) {
            Some(year_id) => {
                tracing::info!(%year_id, "auto-selecting active year");
                self.select_year(Some(year_id)).await
            }
            None => {
                tracing::info!("no active school year; waiting for selection");
                Ok(())
            }
        };

        match first_error {
            Some(err) => Err(err),
            None => selected,
        }
    }

    /// Select a school year and refresh its summary
    ///
    /// Clearing the selection fetches nothing.
    ///
    /// # Errors
    /// - `SlotError::Gateway` if the summary fetch fails
    pub async fn select_year(&mut self, year_id: Option<YearId>) -> Result<(), SlotError> {
        self.form.year_id = year_id;
        self.refresh_summary().await.map(|_| ())
    }

    /// Fetch the summary for the selected year
    ///
    /// Returns `None` when no year is selected.
    ///
    /// # Errors
    /// - `SlotError::Gateway` if the fetch fails and was not superseded
    pub async fn refresh_summary(&mut self) -> Result<Option<ApplyOutcome>, SlotError> {
        let Some(request) = self.begin_summary_refresh() else {
            return Ok(None);
        };
        let result = self.gateway.slot_summary(request.year_id).await;
        self.finish_summary_refresh(request, result).map(Some)
    }

    /// Issue a summary fetch for the selected year
    ///
    /// For hosts that run the gateway call themselves. Any earlier
    /// outstanding request becomes stale.
    pub fn begin_summary_refresh(&mut self) -> Option<SummaryRequest> {
        let year_id = self.form.year_id?;
        Some(self.view.begin_fetch(year_id))
    }

    /// Apply the result of a fetch issued by `begin_summary_refresh`
    ///
    /// # Errors
    /// - `SlotError::Gateway` if the result is a current failure; stale
    ///   failures are dropped silently
    pub fn finish_summary_refresh(
        &mut self,
        request: SummaryRequest,
        result: Result<Vec<SlotSummaryRow>, GatewayError>,
    ) -> Result<ApplyOutcome, SlotError> {
        let failure = result.as_ref().err().cloned();
        match (self.view.apply(request, result), failure) {
            (ApplyOutcome::Failed, Some(e)) => Err(self.fail("summary", e)),
            (outcome, _) => Ok(outcome),
        }
    }

    /// Select a program
    #[inline]
    pub fn select_program(&mut self, program_id: Option<ProgramId>) {
        self.form.selected_program = program_id;
    }

    /// Pick a preset max-slots value
    #[inline]
    pub fn choose_preset(&mut self, preset: Option<MaxSlots>) {
        self.form.preset = preset;
    }

    /// Type a max-slots value
    ///
    /// # Errors
    /// - `FormError::InvalidQuantity` unless a positive integer (or blank)
    pub fn enter_max_slots(&mut self, input: &str) -> Result<(), FormError> {
        self.form.enter_max_slots(input)
    }

    /// Copy a summary row into the form for editing
    ///
    /// The year selection is left unchanged.
    pub fn begin_edit(&mut self, row: &SlotSummaryRow) {
        tracing::debug!(program_id = %row.program_id, max_slots = ?row.max_slots, "editing row");
        self.form.begin_edit(row);
    }

    /// Edit the displayed row of `program_id`
    ///
    /// Returns `false` if the program is not in the current summary.
    pub fn begin_edit_program(&mut self, program_id: ProgramId) -> bool {
        match self.view.row(program_id).cloned() {
            Some(row) => {
                self.begin_edit(&row);
                true
            }
            None => false,
        }
    }

    /// Set the summary filter text
    #[inline]
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.view.set_filter(filter);
    }

    /// Whether the save action is enabled
    ///
    /// False while a save started with `begin_save` is outstanding.
    #[inline]
    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.saving && self.form.validate().is_ok()
    }

    /// Store the limit, refresh the summary and reset the form
    ///
    /// On success the program and max-slots selection is cleared and editing
    /// ends; the year stays selected. A failed refresh after a stored limit
    /// is reported through the notice only.
    ///
    /// Holding `&mut self` across the upsert serializes saves made through
    /// this method; it only refuses to start while a `begin_save` is
    /// outstanding.
    ///
    /// # Errors
    /// - `SlotError::Form` if the form is incomplete or a save is in flight;
    ///   the gateway is not called
    /// - `SlotError::Gateway` if the upsert fails; the form is left untouched
    pub async fn save(&mut self) -> Result<SlotLimit, SlotError> {
        let limit = self.prepare_save()?;
        let result = self.gateway.upsert_slot_limit(limit).await;
        self.record_save(limit, result)?;

        if let Err(e) = self.refresh_summary().await {
            tracing::warn!(error = %e, "limit saved but summary refresh failed");
        }
        self.form.clear_after_save();
        Ok(limit)
    }

    /// Start a save whose upsert the host runs itself
    ///
    /// Marks the save as in flight until `finish_save` is called.
    ///
    /// # Errors
    /// - `SlotError::Form` if the form is incomplete or a save is already in
    ///   flight
    pub fn begin_save(&mut self) -> Result<SlotLimit, SlotError> {
        let limit = self.prepare_save()?;
        self.saving = true;
        Ok(limit)
    }

    /// Apply the upsert result of a save started with `begin_save`
    ///
    /// On success the form is cleared and the summary request to run next is
    /// returned.
    ///
    /// # Errors
    /// - `SlotError::Gateway` if the upsert failed; the form is left untouched
    pub fn finish_save(
        &mut self,
        limit: SlotLimit,
        result: Result<(), GatewayError>,
    ) -> Result<Option<SummaryRequest>, SlotError> {
        self.saving = false;
        self.record_save(limit, result)?;
        self.form.clear_after_save();
        Ok(self.begin_summary_refresh())
    }

    fn prepare_save(&self) -> Result<SlotLimit, SlotError> {
        if self.saving {
            return Err(FormError::SaveInFlight.into());
        }
        let limit = self.form.validate()?;
        tracing::info!(
            year_id = %limit.year_id,
            program_id = %limit.program_id,
            max_slots = %limit.max_slots,
            "saving slot limit"
        );
        Ok(limit)
    }

    fn record_save(
        &mut self,
        limit: SlotLimit,
        result: Result<(), GatewayError>,
    ) -> Result<(), SlotError> {
        match result {
            Ok(()) => {
                self.notice = Some(Notice::Saved(limit));
                Ok(())
            }
            Err(e) => Err(self.fail("save", e)),
        }
    }

    fn fail(&mut self, what: &str, e: GatewayError) -> SlotError {
        tracing::error!(error = %e, "{what} request failed");
        self.notice = Some(Notice::Error(format!("{what}: {e}")));
        SlotError::Gateway(e)
    }

    /// Loaded programs
    #[inline]
    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// Loaded school years
    #[inline]
    #[must_use]
    pub fn school_years(&self) -> &[SchoolYear] {
        &self.school_years
    }

    /// Current form state
    #[inline]
    #[must_use]
    pub fn form(&self) -> &SlotLimitForm {
        &self.form
    }

    /// Availability view
    #[inline]
    #[must_use]
    pub fn view(&self) -> &AvailabilityView {
        &self.view
    }

    /// Whether a save started with `begin_save` is outstanding
    #[inline]
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Latest notice
    #[inline]
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take and clear the latest notice
    #[inline]
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Underlying gateway
    #[inline]
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}
