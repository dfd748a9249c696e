//! `slotdesk` registrar command line

mod cli;
mod commands;
mod render;

use commands::Outcome;
use slotdesk_core::{Session, SlotDeskConfig};
use slotdesk_http::HttpGateway;
use std::io::Write as _;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when the access gate refuses the session
const EXIT_DENIED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(globals: &cli::Globals) -> anyhow::Result<SlotDeskConfig> {
    let config = match &globals.config {
        Some(path) => SlotDeskConfig::load(path)?,
        None => SlotDeskConfig::new(),
    };
    let mut config = config.apply_env()?;
    if let Some(url) = &globals.base_url {
        config = config.with_base_url(url.as_str());
    }
    config.validate()?;
    Ok(config)
}

async fn run() -> anyhow::Result<ExitCode> {
    let matches = cli::command().get_matches();
    let (globals, action) = cli::parse(&matches);
    init_tracing(globals.log_json);

    let config = load_config(&globals)?;
    tracing::debug!(
        base_url = %config.api_base_url,
        page_id = config.page_id,
        "configuration loaded"
    );

    let gateway = HttpGateway::from_config(&config)?;
    let session = Session::from_parts(
        globals.email,
        globals.role,
        globals.person_id,
        globals.employee_id,
    );

    let mut out = std::io::stdout().lock();
    let mut errs = std::io::stderr();
    let outcome = commands::run_action(
        &action,
        gateway,
        session.as_ref(),
        &config,
        &mut out,
        &mut errs,
    )
    .await?;
    out.flush()?;

    match outcome {
        Outcome::Done => Ok(ExitCode::SUCCESS),
        Outcome::Denied(reason) => {
            tracing::warn!(%reason, "access denied");
            eprintln!("access denied: {reason}");
            Ok(ExitCode::from(EXIT_DENIED))
        }
    }
}
