//! Subcommand execution
//!
//! Every workflow command passes the access gate first. A denial is an
//! outcome, not an error; the caller maps it to an exit status.

use crate::cli::{Action, Workflow};
use crate::render;
use anyhow::{bail, Context as _};
use slotdesk_core::{
    authorize, Authorization, DenialReason, MaxSlots, Notice, ProgramId, Session,
    SlotDeskConfig, SlotGateway, SlotLimitController, YearId,
};
use std::io::Write;

/// How a command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done,
    Denied(DenialReason),
}

pub(crate) async fn run_action<G, W, E>(
    action: &Action,
    gateway: G,
    session: Option<&Session>,
    config: &SlotDeskConfig,
    out: &mut W,
    errs: &mut E,
) -> anyhow::Result<Outcome>
where
    G: SlotGateway,
    W: Write,
    E: Write,
{
    match action {
        Action::Presets => {
            out.write_all(render::presets_list(&config.presets.options()).as_bytes())?;
            Ok(Outcome::Done)
        }
        Action::Workflow(workflow) => {
            match authorize(session, &gateway, config.page_id).await {
                Authorization::Authorized => {}
                Authorization::Unauthorized(reason) => return Ok(Outcome::Denied(reason)),
                Authorization::Pending => bail!("access check did not complete"),
            }
            run_workflow(workflow, gateway, config, out, errs).await?;
            Ok(Outcome::Done)
        }
    }
}

async fn run_workflow<G, W, E>(
    workflow: &Workflow,
    gateway: G,
    config: &SlotDeskConfig,
    out: &mut W,
    errs: &mut E,
) -> anyhow::Result<()>
where
    G: SlotGateway,
    W: Write,
    E: Write,
{
    let mut controller = SlotLimitController::new(gateway);
    controller
        .load()
        .await
        .context("failed to load slot data")?;

    match workflow {
        Workflow::Years => {
            out.write_all(render::years_list(controller.school_years()).as_bytes())?;
        }
        Workflow::Programs => {
            out.write_all(render::programs_list(controller.programs()).as_bytes())?;
        }
        Workflow::Summary { year, filter, json } => {
            pick_year(&mut controller, *year).await?;
            if let Some(filter) = filter {
                controller.set_filter(filter.as_str());
            }
            let rows = controller.view().visible();
            if *json {
                serde_json::to_writer_pretty(&mut *out, &rows)?;
                writeln!(out)?;
            } else {
                out.write_all(render::summary_table(&rows).as_bytes())?;
            }
        }
        Workflow::Set {
            year,
            program,
            max_slots,
            preset,
        } => {
            pick_year(&mut controller, *year).await?;

            let program_id = ProgramId(*program);
            if !controller.programs().iter().any(|p| p.program_id == program_id) {
                bail!("unknown program id {program}");
            }
            if !controller.begin_edit_program(program_id) {
                controller.select_program(Some(program_id));
            }

            if let Some(preset) = preset {
                let value = MaxSlots::new(*preset)
                    .filter(|v| config.presets.contains(*v))
                    .with_context(|| format!("{preset} is not a preset value"))?;
                controller.choose_preset(Some(value));
            }
            // an edit pre-fills the numeric entry, which would shadow the preset
            controller.enter_max_slots(max_slots.as_deref().unwrap_or(""))?;

            let verb = controller.form().save_label();
            let limit = controller.save().await?;
            writeln!(
                out,
                "{verb}d slot limit: program {} year {} max {}",
                limit.program_id, limit.year_id, limit.max_slots
            )?;

            // the limit is stored; only the refreshed table is missing
            if let Some(Notice::Error(message)) = controller.notice() {
                writeln!(errs, "warning: summary not refreshed: {message}")?;
            } else {
                out.write_all(render::summary_table(&controller.view().visible()).as_bytes())?;
            }
        }
    }

    Ok(())
}

async fn pick_year<G: SlotGateway>(
    controller: &mut SlotLimitController<G>,
    year: Option<u64>,
) -> anyhow::Result<()> {
    match year {
        Some(year) => {
            let year_id = YearId(year);
            if !controller.school_years().iter().any(|y| y.year_id == year_id) {
                bail!("unknown school year id {year}");
            }
            if controller.form().year_id() != Some(year_id) {
                controller.select_year(Some(year_id)).await?;
            }
            Ok(())
        }
        None if controller.form().year_id().is_none() => {
            bail!("no active school year; pass --year")
        }
        None => Ok(()),
    }
}
