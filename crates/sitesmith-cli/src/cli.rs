use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sitesmith")]
#[command(about = "Reconcile access groups and recurring jobs on a site platform")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./sitesmith.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Platform snapshot file (overrides platform.snapshot_path)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update every scope, group and job in a manifest
    Apply(ManifestArgs),
    /// Remove every job and group in a manifest
    Remove(ManifestArgs),
    /// Execute one registered job now
    RunJob(RunJobArgs),
    /// Run due jobs for a scope until interrupted
    Schedule(ScopeArgs),
    /// List a group's members
    Members(MembersArgs),
    /// Show groups and jobs
    Show(ShowArgs),
}

#[derive(clap::Args)]
pub struct ManifestArgs {
    /// Path to the TOML manifest
    #[arg(short, long)]
    pub manifest: PathBuf,
}

#[derive(clap::Args)]
pub struct RunJobArgs {
    #[arg(long)]
    pub scope: String,
    /// Registered job name (e.g. Nightly_Heartbeat_https://portal/hr)
    #[arg(long)]
    pub name: String,
}

#[derive(clap::Args)]
pub struct ScopeArgs {
    #[arg(long)]
    pub scope: String,
}

#[derive(clap::Args)]
pub struct MembersArgs {
    #[arg(long)]
    pub scope: String,
    #[arg(long)]
    pub group: String,
    /// Print contact emails instead of corp ids
    #[arg(long)]
    pub emails: bool,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Only this scope
    #[arg(long)]
    pub scope: Option<String>,
}
