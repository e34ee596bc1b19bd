use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use odt_sfm::scripture::{SfmProject, normalize_corpus};
use odt_sfm::{Config, Converter};

#[derive(Parser)]
#[command(name = "odt-sfm")]
#[command(version, about = "Convert OpenDocument text files to SFM markup", long_about = None)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log per-style and per-chapter detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert .odt files (or every .odt file in a directory) to _<ID>.sfm
    Convert {
        /// Input .odt files or directories
        #[arg(value_name = "PATH", default_value = ".")]
        paths: Vec<PathBuf>,

        /// Directory for generated .sfm files
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// TOML file with marker defaults and extra cleanup rules
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Normalize verse, chapter and footnote markup in a directory of .sfm books
    Normalize {
        /// Project directory holding .sfm files
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Write changed books here instead of back into PROJECT
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Convert {
            paths,
            output,
            config,
        } => convert(&paths, &output, config.as_deref()),
        Command::Normalize { project, output } => normalize(&project, output.as_deref()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one document failed.
fn convert(paths: &[PathBuf], output: &Path, config: Option<&Path>) -> odt_sfm::Result<bool> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let converter = Converter::new(config)?;
    std::fs::create_dir_all(output)?;

    let mut failed = 0;
    let mut converted = 0;
    for path in paths {
        if path.is_dir() {
            let summary = converter.convert_directory(path, output)?;
            converted += summary.converted;
            failed += summary.failed;
        } else {
            log::info!("Converting: {}", path.display());
            match converter.convert_file(path, output) {
                Ok(_) => converted += 1,
                Err(e) => {
                    log::error!("Skipping {}: {e}", path.display());
                    failed += 1;
                }
            }
        }
    }

    log::info!("{converted} converted, {failed} failed");
    Ok(failed == 0)
}

fn normalize(project: &Path, output: Option<&Path>) -> odt_sfm::Result<bool> {
    let source = SfmProject::open(project)?;
    let mut sink = match output {
        Some(dir) => source.with_output_dir(dir),
        None => SfmProject::open(project)?,
    };
    let summary = normalize_corpus(&source, &mut sink)?;
    log::info!(
        "{} chapters, {} changed",
        summary.chapters,
        summary.changed
    );
    Ok(true)
}
