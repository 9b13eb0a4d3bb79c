//! interop-eval CLI: communication-need satisfiability for interoperability models.

use std::path::PathBuf;

use clap::Parser;
use miette::Result;

use interop_eval::config::EvalConfig;
use interop_eval::run::{check_dir, run};

#[derive(Parser)]
#[command(
    name = "interop-eval",
    version,
    about = "Interoperability metamodel conformance evaluation"
)]
struct Cli {
    /// Directory holding the model; results are written next to it.
    dir: PathBuf,

    /// Config file (default: `interop.toml` in the model directory, if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip root-cause classification of unsatisfied pairs.
    #[arg(long)]
    no_diagnostics: bool,

    /// Candidate hops examined per pair search before giving up.
    #[arg(long)]
    max_steps: Option<usize>,

    /// Evaluate needs in parallel.
    #[arg(long)]
    parallel: bool,

    /// Do not write the saved model.
    #[arg(long)]
    no_save: bool,

    /// Do not write the DOT rendering.
    #[arg(long)]
    no_dot: bool,
}

impl Cli {
    fn apply(&self, config: &mut EvalConfig) {
        if self.no_diagnostics {
            config.diagnostics = false;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if self.parallel {
            config.parallel = true;
        }
        if self.no_save {
            config.save_model = false;
        }
        if self.no_dot {
            config.write_dot = false;
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    check_dir(&cli.dir)?;

    let mut config = match &cli.config {
        Some(path) => EvalConfig::load(path)?,
        None => EvalConfig::load_from_dir(&cli.dir)?,
    };
    cli.apply(&mut config);

    let summary = run(&cli.dir, &config)?;

    let report = &summary.report;
    println!(
        "{} of {} communication needs satisfied",
        report.stats.needs_satisfied,
        report.needs.len()
    );
    for need in &report.needs {
        let verdict = if need.satisfied {
            "satisfied"
        } else {
            "not satisfied"
        };
        println!("  {}: {verdict}", summary.graph.name(need.need));
    }
    if !report.multiplicity.all_ok {
        println!(
            "  ({} multiplicity violations, see {})",
            report.multiplicity.violations().count(),
            config.results_file
        );
    }
    for path in &summary.written {
        println!("wrote {}", path.display());
    }
    Ok(())
}
