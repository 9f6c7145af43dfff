//! Fields-file CLI
//!
//! Creates fields-files and appends fields to them.

use clap::{Args, Parser, Subcommand};
use fields_registry::{AppendOutcome, FieldsConfig, RawFieldInput, RegistryStore, WriteOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fields-file")]
#[command(about = "Create and append to field definition files")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the fields-file directory
    #[arg(short, long)]
    registry: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FieldArgs {
    /// The name of the file to create or write fields to
    file_name: String,

    /// Comma-separated field names
    #[arg(long, default_value = "")]
    names: String,

    /// Comma-separated data-type for each field
    #[arg(long, default_value = "")]
    data_types: String,

    /// Comma-separated html-type for each field
    #[arg(long, default_value = "")]
    html_types: String,

    /// Transformation profile (defaults to the configured one)
    #[arg(long)]
    profile: Option<String>,

    /// Show the change without writing it
    #[arg(long)]
    dry_run: bool,
}

impl FieldArgs {
    fn input(&self) -> RawFieldInput {
        RawFieldInput::from_delimited(&self.names, &self.data_types, &self.html_types)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Append fields to a fields-file (creates it when missing)
    Append(FieldArgs),

    /// Create a new fields-file
    Create {
        #[command(flatten)]
        fields: FieldArgs,

        /// Replace the file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// List fields-files in the registry directory
    List,

    /// Print the fields in a fields-file
    Show {
        file_name: String,

        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = FieldsConfig::load_from(cli.config.as_deref())?;
    if let Some(path) = cli.registry {
        cfg.registry.path = path;
    }
    let store = RegistryStore::from_config(&cfg);

    match cli.command {
        Commands::Append(args) => {
            let store = match &args.profile {
                Some(profile) => store.with_profile(profile.as_str()),
                None => store,
            };
            let options = WriteOptions {
                dry_run: args.dry_run,
                force: false,
            };

            let outcome = store.append(&args.file_name, &args.input(), options)?;
            report(&outcome, args.dry_run);
            outcome.check(cfg.merge.duplicates)?;
            Ok(())
        }

        Commands::Create { fields, force } => {
            let store = match &fields.profile {
                Some(profile) => store.with_profile(profile.as_str()),
                None => store,
            };
            let options = WriteOptions {
                dry_run: fields.dry_run,
                force,
            };

            let outcome = store.create(&fields.file_name, &fields.input(), options)?;
            report(&outcome, fields.dry_run);
            outcome.check(cfg.merge.duplicates)?;
            Ok(())
        }

        Commands::List => {
            let files = store.list()?;
            if files.is_empty() {
                println!("No fields-files in {:?}", store.root());
            }
            for path in files {
                match path.file_name().and_then(|n| n.to_str()) {
                    Some(name) => println!("{}", name),
                    None => println!("{}", path.display()),
                }
            }
            Ok(())
        }

        Commands::Show { file_name, json } => {
            let registry = store.load(&file_name)?;
            if json {
                println!("{}", registry.encode()?);
            } else {
                println!("📋 {} ({} fields)\n", file_name, registry.len());
                for field in registry.fields() {
                    println!(
                        "  {:<24} data-type: {:<12} html-type: {}",
                        field.name,
                        field.data_type.as_deref().unwrap_or("-"),
                        field.html_type.as_deref().unwrap_or("-"),
                    );
                }
            }
            Ok(())
        }
    }
}

fn report(outcome: &AppendOutcome, dry_run: bool) {
    for warning in outcome.warnings() {
        println!("⚠️  {}", warning);
    }

    if let Some(diff) = outcome.diff() {
        print!("{}", diff);
    }

    let verb = if dry_run { "Would write" } else { "Wrote" };
    match outcome {
        AppendOutcome::Created { path, added, .. } => {
            println!("✅ {} new fields-file {:?} with {} field(s)", verb, path, added.len());
        }
        AppendOutcome::Merged { path, added, .. } if added.is_empty() => {
            println!("No new fields to append to {:?}", path);
        }
        AppendOutcome::Merged { path, added, .. } => {
            println!("✅ {} {} new field(s) to {:?}: {}", verb, added.len(), path, added.join(", "));
        }
    }
}
