use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use tracing::{debug, info};
use url::Url;

use crate::args::ProbeArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::report::RunReport;
use crate::{http, report, scenario};

pub(crate) fn run() -> AppResult<()> {
    let matches = ProbeArgs::command().get_matches();
    let args = ProbeArgs::from_arg_matches(&matches)?;

    crate::logger::init_logging(args.verbose, args.no_color);

    let base_url = resolve_base_url(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, base_url))
}

fn resolve_base_url(args: &ProbeArgs) -> AppResult<Url> {
    let raw = args
        .base_url
        .as_deref()
        .ok_or_else(|| AppError::validation(ValidationError::MissingBaseUrl))?;
    let url = Url::parse(raw).map_err(|source| {
        AppError::validation(ValidationError::InvalidBaseUrl {
            url: raw.to_owned(),
            source,
        })
    })?;
    if url.cannot_be_a_base() {
        return Err(AppError::validation(ValidationError::BaseUrlCannotBeABase {
            url: raw.to_owned(),
        }));
    }
    Ok(url)
}

async fn run_async(args: ProbeArgs, base_url: Url) -> AppResult<()> {
    let client = http::build_client(args.timeout)?;
    let scenarios = scenario::scripted(args.timing_runs);

    info!("Probing {} with {} scenarios", base_url, scenarios.len());
    println!("Target: {}", base_url);
    println!();

    let mut report = RunReport::new();
    for (index, scenario) in scenarios.iter().enumerate() {
        if index > 0 && args.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.delay_ms)).await;
        }

        let spec = scenario.request(&base_url)?;
        debug!("Issuing {} {}", spec.method, spec.url);
        let outcome = http::execute(&client, &spec).await;
        report.record(scenario, &outcome);
    }

    report.print_summary();

    if let Some(path) = args.export_json.as_deref() {
        report::export_json(path, &report).await?;
        info!("Wrote JSON report to {}", path);
    }

    let failed = report.failed();
    if failed > 0 {
        return Err(AppError::ScenariosFailed {
            failed,
            total: report.total(),
        });
    }
    Ok(())
}
