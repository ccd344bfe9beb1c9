use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use sitesmith_cli::cli::{Cli, Commands};
use sitesmith_cli::config::loader::load_config;
use sitesmith_cli::manifest::Manifest;
use sitesmith_cli::output::{print_error, print_report, print_success, print_warning};
use sitesmith_cli::{commands, observability, state};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    observability::init_tracing(&config.logging);

    let state_path = cli
        .state
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.platform.snapshot_path));
    let platform = Arc::new(state::load_platform(&state_path)?);

    match &cli.command {
        Commands::Apply(args) => {
            let manifest = Manifest::load(&args.manifest)?;
            let result = commands::apply::apply(&platform, &manifest, &config.groups).await;
            // Whatever was applied before a failure is persisted.
            state::save_platform(&platform, &state_path)?;
            print_report(&result?);
            print_success(&format!("State saved to {}", state_path.display()));
        }
        Commands::Remove(args) => {
            let manifest = Manifest::load(&args.manifest)?;
            let result = commands::apply::remove(&platform, &manifest, &config.groups).await;
            state::save_platform(&platform, &state_path)?;
            print_report(&result?);
            print_success(&format!("State saved to {}", state_path.display()));
        }
        Commands::RunJob(args) => {
            commands::jobs::run_job(&platform, &args.scope, &args.name).await?;
            print_success(&format!("Job {} completed", args.name));
        }
        Commands::Schedule(args) => {
            println!(
                "{} scope {} every {}s, Ctrl-C to stop",
                "Scheduling".cyan(),
                args.scope,
                config.jobs.check_interval_secs
            );
            commands::jobs::schedule(&platform, &args.scope, &config.jobs).await?;
        }
        Commands::Members(args) => {
            let members = commands::show::members(
                &platform,
                &config.groups,
                &args.scope,
                &args.group,
                args.emails,
            )
            .await?;
            if members.is_empty() {
                print_warning(&format!("{} has no matching members", args.group));
            }
            for member in members {
                println!("{member}");
            }
        }
        Commands::Show(args) => {
            commands::show::show(&platform, args.scope.as_deref())?;
        }
    }

    Ok(())
}
