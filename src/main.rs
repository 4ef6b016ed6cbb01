use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use branchmark::{
    report::format_line,
    sequence::InputPattern,
    suite::SuiteLoader,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Branch-prediction micro-benchmark runner")]
struct Cli {
    /// Path to the suite YAML file
    #[arg(long, default_value = "suites/branch_chains.yaml")]
    suite: PathBuf,

    /// Override iteration count for every run (uses suite defaults when omitted)
    #[arg(long)]
    iterations: Option<u64>,

    /// Override the input with a fixed value for every run
    #[arg(long)]
    input: Option<i32>,

    /// Directory for JSON reports (no report is written when omitted)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Serve live results over HTTP instead of exiting after the run
    #[arg(long)]
    serve: bool,

    /// Host for the results view
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the results view
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = SuiteLoader::new(".");
    let suite = loader.load(&cli.suite)?;

    if let Some(iterations) = cli.iterations {
        anyhow::ensure!(iterations > 0, "--iterations must be greater than zero");
    }
    let input_override = cli.input.map(|value| InputPattern::Fixed { value });

    if cli.serve {
        let config = WebServerConfig {
            suite,
            report_dir: cli.report_dir,
            iterations: cli.iterations,
            input: input_override,
            host: cli.host,
            port: cli.port,
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        return runtime.block_on(web::run(config));
    }

    let mut harness = suite.build_harness(
        cli.report_dir,
        cli.iterations,
        input_override.as_ref(),
    )?;
    let measurements = harness.run()?;
    for measurement in &measurements {
        println!("{}", format_line(measurement));
    }
    Ok(())
}
