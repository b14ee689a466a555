use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the bifurcation sweep workspace",
    long_about = "A unified CLI for running sweep workers, local sweeps, the plot viewer,\n\
                  benchmarks, and CI checks in the bifurcation sweep workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single worker job, as the batch scheduler would
    Worker {
        /// Index of the job, in [0, total_jobs)
        job_index: usize,
        /// Number of jobs the sweep is split into
        total_jobs: usize,
    },
    /// Run every job of the sweep locally in parallel
    Sweep {
        /// Number of jobs to split the sweep into
        #[arg(long, default_value_t = 500)]
        jobs: usize,
        /// Worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Gather artifacts and open the bifurcation plot
    Plot,
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, smoke sweep, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Run one worker and a full local sweep end to end
    Smoke,
    /// Run benchmarks
    Bench,
    /// Run check + smoke + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn git(args: &[&str]) -> ExitStatus {
    eprintln!("+ git {}", args.join(" "));
    Command::new("git")
        .args(args)
        .status()
        .expect("failed to execute git")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_git(args: &[&str]) {
    let status = git(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_local_sweep(jobs: usize, threads: Option<usize>) {
    let jobs = jobs.to_string();
    let threads = threads.map(|value| value.to_string());

    let mut args: Vec<&str> = vec![
        "run",
        "-p",
        "bifurcation_sweep",
        "--release",
        "--bin",
        "sweep_local",
        "--",
        "--jobs",
        jobs.as_str(),
    ];
    if let Some(threads) = threads.as_deref() {
        args.push("--threads");
        args.push(threads);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test bifurcation_core");
    run_cargo(&["test", "-p", "bifurcation_core"]);

    step("Test bifurcation_sweep");
    run_cargo(&["test", "-p", "bifurcation_sweep"]);

    step("Test bifurcation_plot");
    run_cargo(&["test", "-p", "bifurcation_plot"]);
}

fn ci_smoke() {
    step("Run single worker (job 0 of 500)");
    run_cargo(&[
        "run",
        "-p",
        "bifurcation_sweep",
        "--release",
        "--bin",
        "sweep_worker",
        "--",
        "0",
        "500",
    ]);

    step("Run full local sweep (500 jobs)");
    run_local_sweep(500, None);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&[
        "bench",
        "--package",
        "bifurcation_sweep",
        "--bench",
        "performance",
    ]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Worker {
            job_index,
            total_jobs,
        } => {
            let job_index = job_index.to_string();
            let total_jobs = total_jobs.to_string();
            run_cargo(&[
                "run",
                "-p",
                "bifurcation_sweep",
                "--release",
                "--bin",
                "sweep_worker",
                "--",
                &job_index,
                &total_jobs,
            ]);
        }
        Commands::Sweep { jobs, threads } => {
            run_local_sweep(jobs, threads);
        }
        Commands::Plot => {
            run_cargo(&["run", "-p", "bifurcation_plot", "--release"]);
        }
        Commands::Bench => {
            ci_bench();
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                std::fs::remove_dir_all(baseline_dir).expect("failed to remove target/criterion");
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&[
                "bench",
                "--package",
                "bifurcation_sweep",
                "--bench",
                "performance",
                "--",
                "--save-baseline",
                "main",
            ]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&[
                "bench",
                "--package",
                "bifurcation_sweep",
                "--bench",
                "performance",
                "--",
                "--baseline",
                "main",
            ]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Smoke => ci_smoke(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_smoke();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
