//! Report rendering for scenario results
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::logic::tester::ScenarioResult;

#[derive(Serialize)]
struct JsonSummary {
    total_scenarios: usize,
    passed: usize,
    failed: usize,
    total_duration_ms: u64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: JsonSummary,
    results: &'a [ScenarioResult],
}

fn summarize(results: &[ScenarioResult], total_duration: Duration) -> JsonSummary {
    let passed = results.iter().filter(|r| r.passed).count();
    JsonSummary {
        total_scenarios: results.len(),
        passed,
        failed: results.len() - passed,
        total_duration_ms: u64::try_from(total_duration.as_millis()).unwrap_or(u64::MAX),
    }
}

/// Plain-text report for terminals.
///
/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    let summary = summarize(results, total_duration);

    writeln!(out, "📊 Velha Logic Test Report")?;
    writeln!(out, "==========================")?;
    writeln!(out, "Scenario runs: {}", summary.total_scenarios)?;
    writeln!(out, "Passed: {}", summary.passed)?;
    writeln!(out, "Failed: {}", summary.failed)?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed { "✅ PASS" } else { "❌ FAIL" };
        writeln!(
            out,
            "{status} {} (seed {}): {}/{} iterations, avg {:?}",
            result.scenario_name,
            result.seed,
            result.successful_iterations,
            result.iterations_run,
            result.average_duration
        )?;
        for failure in &result.failures {
            writeln!(out, "    • {failure}")?;
        }
    }

    let mut timed: Vec<&ScenarioResult> = results
        .iter()
        .filter(|r| !r.performance_data.is_empty())
        .collect();
    if !timed.is_empty() {
        timed.sort_by_key(|r| r.average_duration);
        writeln!(out)?;
        writeln!(out, "⚡ Performance Summary")?;
        if let Some(fastest) = timed.first() {
            writeln!(
                out,
                "Fastest: {} (avg {:?})",
                fastest.scenario_name, fastest.average_duration
            )?;
        }
        if let Some(slowest) = timed.last() {
            writeln!(
                out,
                "Slowest: {} (avg {:?})",
                slowest.scenario_name, slowest.average_duration
            )?;
        }
    }

    Ok(())
}

/// Machine-readable report with a summary block and the raw results.
///
/// # Errors
///
/// Returns an error when serialization or the writer fails.
pub fn generate_json_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    let report = JsonReport {
        summary: summarize(results, total_duration),
        results,
    };
    let json = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Markdown report suitable for pasting into an issue.
///
/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_markdown_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    let summary = summarize(results, total_duration);

    writeln!(out, "# Velha Logic Test Results")?;
    writeln!(out)?;
    writeln!(
        out,
        "**{} run(s), {} passed, {} failed in {:?}**",
        summary.total_scenarios, summary.passed, summary.failed, total_duration
    )?;
    writeln!(out)?;
    writeln!(out, "| Scenario | Seed | Status | Iterations | Avg |")?;
    writeln!(out, "|----------|------|--------|------------|-----|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {}/{} | {:?} |",
            result.scenario_name,
            result.seed,
            status,
            result.successful_iterations,
            result.iterations_run,
            result.average_duration
        )?;
    }

    let failing: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Failures")?;
        for result in failing {
            writeln!(out)?;
            writeln!(out, "### {} (seed {})", result.scenario_name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
        }
    }

    Ok(())
}
