//! Command-line harness that drives the velha game logic headlessly
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

mod logic;
mod store;

use logic::game_tester::GameTester;
use logic::tester::{LogicTester, ScenarioResult};
use logic::{reports, scenarios, seeds};

#[derive(Parser, Debug)]
#[command(
    name = "velha-tester",
    version,
    about = "Headless scenario runner for the velha game logic"
)]
struct Args {
    /// Comma-separated scenario names, or "all"
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List the available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Comma-separated numeric seeds
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Report format
    #[arg(long, default_value = "console", value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Print every iteration as it runs
    #[arg(short, long)]
    verbose: bool,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Where a report lands. Both arms buffer; `flush_inner` must run before
/// the process exits.
enum OutputTarget {
    Stdout(BufWriter<Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn create(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::Stdout(BufWriter::new(io::stdout()))),
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                Ok(Self::File(BufWriter::new(file)))
            }
        }
    }

    fn flush_inner(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File(writer) => writer.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_inner()
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        return list_scenarios_to(args.output.as_deref());
    }

    println!("{}", "🎮 Velha Logic Tester".bright_cyan().bold());
    println!(
        "Scenarios: {} | Seeds: {} | Iterations: {}",
        args.scenarios, args.seeds, args.iterations
    );

    let seed_inputs = split_csv(&args.seeds);
    let seeds = seeds::resolve_seed_inputs(&seed_inputs)?;
    let names = expand_scenarios(&args.scenarios)?;

    let tester = LogicTester::new(GameTester::new(args.verbose));
    let started = Instant::now();
    let mut results = Vec::new();

    for name in &names {
        let scenario = scenarios::get_scenario(name)
            .with_context(|| format!("unknown scenario {name:?}; try --list-scenarios"))?;
        let scenario_results = tester.run_scenario(&scenario, &seeds, args.iterations);

        for result in &scenario_results {
            let line = format!(
                "{} (seed {}): {}/{} iterations",
                result.scenario_name, result.seed, result.successful_iterations, result.iterations_run
            );
            if result.passed {
                println!("✅ {}", line.green());
            } else {
                println!("❌ {}", line.red());
            }
        }
        results.extend(scenario_results);
    }

    let total_duration = started.elapsed();
    write_report(&args, &results, total_duration)?;
    println!("🏁 Total time: {total_duration:?}");

    if results.iter().any(|result| !result.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn list_scenarios_to(path: Option<&Path>) -> Result<()> {
    let mut target = OutputTarget::create(path)?;
    writeln!(target, "Available scenarios:")?;
    for (key, description) in scenarios::list_scenarios() {
        writeln!(target, "  {key:<20} {description}")?;
    }
    writeln!(target, "  {:<20} every scenario above", "all")?;
    target.flush_inner()?;
    Ok(())
}

fn expand_scenarios(input: &str) -> Result<Vec<String>> {
    let entries = split_csv(input);
    if entries.iter().any(|entry| entry == "all") {
        return Ok(scenarios::list_scenarios()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect());
    }
    anyhow::ensure!(!entries.is_empty(), "no scenario given; try --list-scenarios");
    Ok(entries)
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn write_report(args: &Args, results: &[ScenarioResult], total_duration: Duration) -> Result<()> {
    let mut target = OutputTarget::create(args.output.as_deref())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut target, results, total_duration)?,
        "markdown" => reports::generate_markdown_report(&mut target, results, total_duration)?,
        _ => reports::generate_console_report(&mut target, results, total_duration)?,
    }
    target.flush_inner()?;

    if let Some(path) = &args.output {
        println!("📝 Report written to {}", path.display());
    }
    Ok(())
}
