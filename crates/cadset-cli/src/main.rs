use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cadset_repair::backup_path;
use cadset_runner::Runner;

#[derive(Parser)]
#[command(name = "cadset", version, about = "Validate, repair and augment CadQuery training datasets")]
struct Cli {
    /// Config file (default: .cadset/cadset.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default config (.cadset/cadset.toml) if absent
    Init,

    /// Report interpreter and CAD kernel availability
    Doctor,

    /// Validate a JSONL dataset
    Validate {
        path: Option<PathBuf>,
        /// Skip code execution even when the kernel is available
        #[arg(long)]
        static_only: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Repair a dataset in place (a .backup copy is written first), then re-validate
    Fix {
        path: Option<PathBuf>,
        /// Only apply targeted fixes, e.g. consistency_warning,parameter_error
        #[arg(long)]
        issues: Option<String>,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
        /// Re-validate without code execution
        #[arg(long)]
        static_only: bool,
    },

    /// Generate input variations for each record with a text-generation service
    Augment {
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        dest: Option<PathBuf>,
        /// Source records to process; -1 for all
        #[arg(long, short, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;
    tracing::debug!(root = %root.display(), "cadset starting");

    match cli.cmd {
        Command::Init => {
            let (path, created) = Runner::init(&root)?;
            if created {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
        Command::Doctor => {
            let r = Runner::open(root, cli.config.as_deref())?;
            print!("{}", r.doctor().render());
        }
        Command::Validate { path, static_only, format } => {
            let r = Runner::open(root, cli.config.as_deref())?;
            let path = r.dataset_path(path.as_deref());
            let report = r.validate(&path, static_only);
            match format {
                Format::Text => print!("{}", report.render_text()),
                Format::Json => println!("{}", report.to_json()?),
            }
            std::process::exit(report.exit_code());
        }
        Command::Fix { path, issues, yes, static_only } => {
            let r = Runner::open(root, cli.config.as_deref())?;
            let path = r.dataset_path(path.as_deref());

            println!("DATASET FIXER");
            println!("{}", "=".repeat(40));
            println!("About to fix dataset: {}", path.display());
            println!("This will create a backup and modify the original file.");
            if let Some(issues) = &issues {
                println!("Targeting specific issues: {issues}");
            }
            if !yes && !confirm("Continue? (y/N): ")? {
                println!("Operation cancelled.");
                return Ok(());
            }

            let summary = r.fix(&path, issues.as_deref())?;
            println!("Changes made: {}", summary.changed);
            println!("Invalid lines removed: {}", summary.dropped);
            println!("Original backed up to: {}", backup_path(&path).display());

            println!("\n{}", "=".repeat(50));
            println!("RUNNING VALIDATION AFTER FIXES");
            println!("{}", "=".repeat(50));
            let report = r.validate(&path, static_only);
            print!("{}", report.render_text());
            std::process::exit(report.exit_code());
        }
        Command::Augment { source, dest, limit } => {
            let r = Runner::open(root, cli.config.as_deref())?;
            let client = r.chat_client()?;
            let limit = limit.and_then(|n| usize::try_from(n).ok());
            let summary = r.augment(source.as_deref(), dest.as_deref(), limit, &client)?;
            println!(
                "Augmentation complete: {} source records, {} variations, {} skipped",
                summary.sources, summary.variations, summary.skipped
            );
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
