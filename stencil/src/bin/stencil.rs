//! Command-line front end.
//!
//! Usage:
//!   stencil --universe universe.xml src/app/models.go
//!   stencil --universe universe.xml --stdout --tag-key gen a.go b.go

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stencil::codegen::{
    FileOutputWriter, Generator, GeneratorConfig, OutputWriter, RunReport, StreamOutputWriter,
};
use stencil::universe::{load_universe, validate_universe};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(version, about = "Generate code from directive-tagged struct fields")]
struct Args {
    /// Universe interchange document describing the loaded packages
    #[arg(short = 'u', long)]
    universe: PathBuf,

    /// Struct-tag key carrying directives
    #[arg(long, default_value = stencil::codegen::config::DEFAULT_TAG_KEY)]
    tag_key: String,

    /// Maximum nested directive depth
    #[arg(long, default_value_t = stencil::codegen::config::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Template file extension
    #[arg(long = "template-ext", default_value = stencil::codegen::config::DEFAULT_TEMPLATE_EXTENSION)]
    template_ext: String,

    /// Suffix appended to generated file stems
    #[arg(long, default_value = stencil::codegen::config::DEFAULT_OUTPUT_SUFFIX)]
    output_suffix: String,

    /// Print generated files to stdout instead of writing them
    #[arg(long)]
    stdout: bool,

    /// Source files to generate code for
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Args {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_tag_key(&self.tag_key)
            .with_max_depth(self.max_depth)
            .with_template_extension(&self.template_ext)
            .with_output_suffix(&self.output_suffix)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            for (file, err) in &report.failed {
                tracing::error!("{}: {}", file.display(), err);
            }
            tracing::warn!(
                "{} of {} file(s) failed",
                report.failed.len(),
                report.failed.len() + report.written.len()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<RunReport> {
    let universe = load_universe(&args.universe)
        .with_context(|| format!("loading universe {}", args.universe.display()))?;
    validate_universe(&universe).context("validating universe")?;

    let files = args
        .files
        .iter()
        .map(|f| absolute(f))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut generator = Generator::new(&universe, args.config());
    let mut file_writer = FileOutputWriter::new();
    let mut stream_writer = StreamOutputWriter::new(std::io::stdout().lock());
    let writer: &mut dyn OutputWriter = if args.stdout {
        &mut stream_writer
    } else {
        &mut file_writer
    };

    Ok(generator.process_files(files.as_slice(), writer))
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))
}
