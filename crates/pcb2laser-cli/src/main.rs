use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod error;
mod render;

use error::CliError;
use render::RenderArgs;

#[derive(Parser)]
#[command(name = "pcb2laser", version, about = "Turn a PCB layout into a laser job", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a layout file into job.json (and optionally job.svg)
    Render {
        /// Layout file (YAML or JSON)
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        /// Settings file; replaces any settings embedded in the layout
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Also write an SVG preview
        #[arg(long)]
        svg: bool,

        /// Remove the output directory first
        #[arg(long)]
        clean: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse() -> Result<Cli, CliError> {
    match Cli::try_parse() {
        Ok(cli) => Ok(cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            std::process::exit(0);
        }
        Err(err) => Err(CliError::usage(err.render().to_string())),
    }
}

fn run() -> Result<(), CliError> {
    let cli = parse()?;
    init_tracing(cli.verbose);
    match cli.command {
        Command::Render {
            input,
            output,
            settings,
            svg,
            clean,
        } => render::run_render(RenderArgs {
            input,
            output,
            settings,
            svg,
            clean,
        }),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            err.code.into()
        }
    }
}
