use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use fic_core::{materialise, Arch, CampaignConfig};

/// Run a fault-injection campaign against an ELF binary.
#[derive(Parser)]
#[command(name = "fault-campaign", version)]
struct Cli {
    /// Path to the input ELF binary.
    infile: PathBuf,

    /// Target architecture.
    #[arg(value_parser = ["x86", "arm"])]
    arch: String,

    #[arg(long, default_value_t = 1000)]
    batch_size: usize,

    #[arg(long, default_value_t = 50)]
    workers: usize,

    #[arg(long, default_value_t = 3)]
    timeout_secs: u64,

    #[arg(long, default_value = "faulted-binaries")]
    output_dir: PathBuf,

    #[arg(long, default_value = "results.csv")]
    results_csv: PathBuf,

    #[arg(long, default_value = "/usr/arm-linux-gnueabi/")]
    qemu_sysroot: PathBuf,

    /// Materialise the mutated binaries but skip execution.
    #[arg(long)]
    plan_only: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let arch = Arch::parse(&cli.arch).expect("clap value_parser already validated arch");
    let mut config = CampaignConfig::default();
    config.batch_size = cli.batch_size;
    config.workers = cli.workers;
    config.timeout = Duration::from_secs(cli.timeout_secs);
    config.output_dir = cli.output_dir.clone();
    config.results_csv = cli.results_csv.clone();
    config.qemu_sysroot = cli.qemu_sysroot.clone();

    info!("planning faults for {}", cli.infile.display());
    let (binary_bytes, plans) = fic_core::plan_campaign(&cli.infile, arch)
        .with_context(|| format!("planning faults for {}", cli.infile.display()))?;
    info!("{} fault plans generated", plans.len());

    if config.output_dir.exists() {
        std::fs::remove_dir_all(&config.output_dir)
            .with_context(|| format!("wiping {}", config.output_dir.display()))?;
    }
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let mut mutated = Vec::with_capacity(plans.len());
    for plan in &plans {
        match materialise::materialise(&cli.infile, &config.output_dir, plan) {
            Ok(binary) => mutated.push(binary),
            Err(e) => log::warn!("plan rejected: {e}"),
        }
    }
    info!("{} binaries materialised", mutated.len());
    materialise::write_manifest(&config.output_dir, &plans)
        .context("writing plan manifest")?;

    if cli.plan_only {
        return Ok(());
    }

    if binary_bytes.is_empty() {
        bail!("input binary was empty; nothing to execute");
    }

    fic_core::executor::run_campaign(
        &cli.infile.display().to_string(),
        &mutated,
        &config,
        arch,
    )
    .context("running campaign")?;

    info!("results written to {}", config.results_csv.display());
    Ok(())
}
