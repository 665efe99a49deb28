//! Custom test runner for the sigil test suite.
//!
//! This binary runs all test cases and reports results in a friendly format:
//! - primitives/number 5/5 PASS
//! - compound/contains 2/3 FAIL

use clap::Parser;
use rayon::prelude::*;
use test_suite::{Case, CaseResult, ScenarioResult, TestRunner, case_id, cases_dir};

#[derive(Parser)]
#[command(name = "test-suite", about = "sigil test suite runner")]
struct Args {
    /// Enable trace output for debugging
    #[arg(short, long)]
    trace: bool,

    /// Filter tests by name pattern (substring match)
    #[arg(short, long)]
    filter: Option<String>,

    /// Show short error summaries instead of detailed output
    #[arg(short, long)]
    short: bool,
}

/// ANSI color codes
mod colors {
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RESET: &str = "\x1b[0m";
}

/// Detailed failure information
struct FailureDetail {
    /// Short one-line description
    short: String,
    /// Detailed multi-line description
    detailed: String,
}

enum Outcome {
    Ran {
        id: String,
        summary: String,
        result: CaseResult,
    },
    ParseError {
        id: String,
        error: String,
    },
}

fn main() {
    let args = Args::parse();
    if args.trace {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("sigil_schema=trace"))
            .with_writer(std::io::stderr)
            .init();
    }
    std::process::exit(run(&args));
}

fn run(args: &Args) -> i32 {
    println!(
        "\n{}{}sigil Test Suite{}",
        colors::BOLD,
        colors::CYAN,
        colors::RESET
    );
    println!("{}{}", colors::DIM, "=".repeat(50));
    println!("{}\n", colors::RESET);

    let base = cases_dir();
    let files = match TestRunner::new(&base).collect() {
        Ok(files) => files,
        Err(e) => {
            eprintln!(
                "{}{}Error:{} Failed to collect test cases: {}",
                colors::BOLD,
                colors::RED,
                colors::RESET,
                e
            );
            return 1;
        }
    };

    let mut pending: Vec<Result<(String, Case), (String, String)>> = Vec::new();
    for file in files {
        match file {
            Ok(parsed) => {
                for case in parsed.cases() {
                    pending.push(Ok((case_id(&base, &case.path, &case.name), case)));
                }
            }
            Err(error) => pending.push(Err((case_id(&base, error.path(), ""), error.to_string()))),
        }
    }

    // Filter cases by name if --filter is specified
    if let Some(filter) = &args.filter {
        pending.retain(|entry| {
            let id = match entry {
                Ok((id, _)) | Err((id, _)) => id,
            };
            id.contains(filter.as_str())
        });
    }

    if pending.is_empty() {
        println!(
            "{}{}Warning:{} No test cases found{}",
            colors::BOLD,
            colors::YELLOW,
            colors::RESET,
            if args.filter.is_some() {
                " matching filter"
            } else {
                ""
            }
        );
        return 0;
    }

    // Run tests in parallel; collect keeps the sorted order
    let outcomes: Vec<Outcome> = pending
        .into_par_iter()
        .map(|entry| match entry {
            Ok((id, case)) => Outcome::Ran {
                id,
                summary: case.status_summary(),
                result: case.run_all(),
            },
            Err((id, error)) => Outcome::ParseError { id, error },
        })
        .collect();

    let mut total_passed = 0;
    let mut total_failed = 0;
    let mut total_scenarios_passed = 0;
    let mut total_scenarios = 0;
    let mut failures: Vec<(String, Vec<FailureDetail>)> = Vec::new();

    for outcome in outcomes {
        match outcome {
            Outcome::Ran {
                id,
                summary,
                result,
            } => {
                let passed = result.passed_count();
                let total = result.total_count();
                total_scenarios_passed += passed;
                total_scenarios += total;

                let (status_text, color) = if result.all_passed() {
                    ("PASS", colors::GREEN)
                } else {
                    ("FAIL", colors::RED)
                };
                println!(
                    "  {}{}{}{} {} {}{}/{}{}",
                    colors::BOLD,
                    color,
                    status_text,
                    colors::RESET,
                    id,
                    colors::DIM,
                    passed,
                    total,
                    colors::RESET
                );

                if result.all_passed() {
                    total_passed += 1;
                    continue;
                }
                total_failed += 1;
                let details = result
                    .failed_scenarios()
                    .iter()
                    .map(|s| {
                        let error = match &s.result {
                            ScenarioResult::Failed { error } => error.clone(),
                            ScenarioResult::Passed => "Unknown error".to_string(),
                        };
                        FailureDetail {
                            short: format!("{}: {}", s.name, error),
                            detailed: format!("{}\n\n{}: {}", summary, s.name, error),
                        }
                    })
                    .collect();
                failures.push((id, details));
            }
            Outcome::ParseError { id, error } => {
                println!(
                    "  {}{}PARSE ERROR{} {}",
                    colors::BOLD,
                    colors::RED,
                    colors::RESET,
                    id
                );
                total_failed += 1;
                failures.push((
                    id,
                    vec![FailureDetail {
                        short: "Parse error".to_string(),
                        detailed: error,
                    }],
                ));
            }
        }
    }

    // Print summary
    println!("\n{}{}Summary{}", colors::BOLD, colors::CYAN, colors::RESET);
    println!("{}{}", colors::DIM, "-".repeat(50));
    println!("{}", colors::RESET);

    println!(
        "  Cases:     {} passed, {} failed, {} total",
        total_passed,
        total_failed,
        total_passed + total_failed
    );
    println!(
        "  Scenarios: {} passed, {} failed, {} total",
        total_scenarios_passed,
        total_scenarios - total_scenarios_passed,
        total_scenarios
    );

    // Print detailed failure reports
    if !failures.is_empty() {
        println!("\n{}{}Failures{}", colors::BOLD, colors::RED, colors::RESET);
        println!("{}{}", colors::DIM, "-".repeat(50));
        println!("{}", colors::RESET);

        for (case_name, details) in &failures {
            println!(
                "\n  {}{}{}{}",
                colors::BOLD,
                colors::RED,
                case_name,
                colors::RESET
            );
            for detail in details {
                let text = if args.short {
                    &detail.short
                } else {
                    &detail.detailed
                };
                // Indent all lines
                for line in text.lines() {
                    println!("    {}", line);
                }
            }
        }
    }

    // Final status line
    println!();
    if total_failed == 0 {
        println!(
            "{}{}All tests passed!{}",
            colors::BOLD,
            colors::GREEN,
            colors::RESET
        );
        0
    } else {
        println!(
            "{}{}{} test(s) failed.{}",
            colors::BOLD,
            colors::RED,
            total_failed,
            colors::RESET
        );
        1
    }
}
