use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cluster_policy_bench::domain::policy::PolicyType;
use cluster_policy_bench::domain::workload::workload_file::{SUITE_JOB_COUNTS, SUITE_SEED, generate_suite};
use cluster_policy_bench::runner::batch_runner::BatchRunner;
use cluster_policy_bench::runner::scenario_runner::ScenarioRunner;
use cluster_policy_bench::{load_config, logger};

#[derive(Debug, Parser)]
#[command(name = "cluster_policy_bench", version, about = "Compares job-to-machine scheduling policies on a simulated cluster")]
struct Cli {
    /// JSON file overriding the built-in cluster and directory settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Writes the seeded workload suite.
    Generate {
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long, default_value_t = SUITE_SEED)]
        seed: u64,
        /// Job counts, one file per count and workload type.
        #[arg(long, value_delimiter = ',')]
        counts: Vec<usize>,
    },
    /// Runs one workload file with one policy and prints the result tables.
    Run {
        #[arg(long)]
        workload: PathBuf,
        #[arg(long, default_value_t = PolicyType::RoundRobin)]
        policy: PolicyType,
    },
    /// Runs every workload of the jobs directory with every policy in parallel.
    Batch {
        #[arg(long)]
        jobs_dir: Option<PathBuf>,
        #[arg(long)]
        results_dir: Option<PathBuf>,
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init();

    let mut config = load_config(cli.config.as_deref()).context("could not load configuration")?;

    match cli.command {
        Command::Generate { output_dir, seed, counts } => {
            let output_dir = output_dir.unwrap_or_else(|| config.jobs_dir.clone());
            let counts = if counts.is_empty() { SUITE_JOB_COUNTS.to_vec() } else { counts };

            let written = generate_suite(&output_dir, &counts, seed).with_context(|| format!("could not generate workloads in {}", output_dir.display()))?;
            println!("Generated {} workload files in {}", written.len(), output_dir.display());
        }
        Command::Run { workload, policy } => {
            log::info!("Running {} with {}.", workload.display(), policy);
            ScenarioRunner::new(&config, policy.get_instance())
                .run(&workload, true)
                .with_context(|| format!("simulation of {} with {} failed", workload.display(), policy))?;
        }
        Command::Batch { jobs_dir, results_dir, workers } => {
            if let Some(jobs_dir) = jobs_dir {
                config.jobs_dir = jobs_dir;
            }
            if let Some(results_dir) = results_dir {
                config.results_dir = results_dir;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            config.validate()?;

            // An empty jobs directory is reported by the runner itself.
            BatchRunner::new(&config).run();
        }
    }

    Ok(())
}
