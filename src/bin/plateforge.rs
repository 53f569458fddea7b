use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use plateforge::{Config, DatasetPipeline, DirSink, PerturbationRegistry};

#[derive(Parser, Debug)]
#[command(name = "plateforge", version, about = "Synthetic labeled dataset generation")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available perturbations.
    List,
    /// Show the merged configuration (defaults < file < CLI).
    Info(ConfigArgs),
    /// Generate a dataset.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to a JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of variants per background/overlay pair.
    #[arg(long)]
    variants: Option<u32>,

    /// Override the random seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print the generation plan without writing any files.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::List => cmd_list(),
        Command::Info(args) => cmd_info(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn cmd_list() -> anyhow::Result<()> {
    let registry = PerturbationRegistry::with_builtins();
    for kind in registry.kinds() {
        println!("{:<10} {}", kind.name, kind.summary);
    }
    Ok(())
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<Config> {
    let mut cfg = Config::load(args.config.as_deref())?;
    cfg.apply_overrides(args.variants, args.seed);
    Ok(cfg)
}

fn cmd_info(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        eprintln!(
            "dry run: would generate {} variants per pair into {}",
            cfg.dataset.n_variants,
            cfg.dataset.output.display()
        );
        return Ok(());
    }

    let registry = PerturbationRegistry::with_builtins();
    let pipeline = DatasetPipeline::new(
        &registry,
        &cfg.dataset.backgrounds,
        &cfg.dataset.overlays,
        cfg.perturbations.clone(),
        cfg.dataset.random_seed,
    );
    let mut sink = DirSink::new(&cfg.dataset.output, cfg.logging.save_metadata)?;
    let stats = pipeline.run(cfg.dataset.n_variants, &mut sink)?;

    eprintln!(
        "generated {} images into {}",
        stats.images_written,
        cfg.dataset.output.display()
    );
    Ok(())
}
