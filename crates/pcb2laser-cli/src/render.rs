use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pcb2laser_export::{LaserJob, SvgError, svg_from_job};
use pcb2laser_geometry::Kernel;
use pcb2laser_layout::{ConversionReport, Layout, Settings, convert};
use tracing::{info, warn};

use crate::error::CliError;

pub struct RenderArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: Option<PathBuf>,
    pub svg: bool,
    pub clean: bool,
}

pub fn run_render(args: RenderArgs) -> Result<(), CliError> {
    println!("Reading layout...");
    let layout = Layout::from_path(&args.input).map_err(|e| CliError::input(e.to_string()))?;
    let settings = resolve_settings(&layout, args.settings.as_deref())?;

    println!("Merging copper...");
    let kernel = Kernel::init(settings.kernel);
    let conversion = convert(&layout, &settings, kernel);
    log_report(&conversion.report);

    if args.clean {
        println!("Cleaning output folder...");
    }
    println!("Writing output to disk...");
    write_outputs(
        &args.output,
        &conversion.job,
        &conversion.report,
        args.svg || settings.svg_preview,
        args.clean,
    )
    .map_err(|e| CliError::processing(format!("{e:#}")))?;

    println!("Done.");
    Ok(())
}

/// A settings file wins over settings embedded in the layout.
fn resolve_settings(layout: &Layout, path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::from_path(path).map_err(|e| CliError::input(e.to_string())),
        None => Ok(layout.settings.clone().unwrap_or_default()),
    }
}

fn log_report(report: &ConversionReport) {
    info!(?report, "conversion report");
    if report.skipped_elements > 0 {
        println!("Skipped {} invalid element(s)", report.skipped_elements);
    }
    if report.merge_fallbacks > 0 {
        println!("{} net(s) could not be merged", report.merge_fallbacks);
    }
    if report.derived_failures > 0 {
        println!("{} derived layer(s) failed", report.derived_failures);
    }
}

fn write_outputs(
    output: &Path,
    job: &LaserJob,
    report: &ConversionReport,
    svg: bool,
    clean: bool,
) -> Result<()> {
    if clean && output.exists() {
        std::fs::remove_dir_all(output)
            .with_context(|| format!("could not clean {}", output.display()))?;
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("could not create {}", output.display()))?;

    job.write_json(&output.join("job.json"))?;

    let report_json = serde_json::to_string_pretty(report)?;
    let report_path = output.join("report.json");
    std::fs::write(&report_path, report_json)
        .with_context(|| format!("could not write {}", report_path.display()))?;

    if svg {
        match svg_from_job(job) {
            Ok(doc) => {
                let svg_path = output.join("job.svg");
                std::fs::write(&svg_path, doc)
                    .with_context(|| format!("could not write {}", svg_path.display()))?;
            }
            Err(SvgError::Empty) => warn!("job is empty, no preview written"),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
