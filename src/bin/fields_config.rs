//! Fields Config CLI
//!
//! View and manage field registry configuration.

use clap::{Parser, Subcommand};
use fields_registry::{transform, FieldsConfig};

#[derive(Parser)]
#[command(name = "fields-config")]
#[command(about = "View and manage field registry configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: fields.toml)
        #[arg(short, long, default_value = "fields.toml")]
        output: String,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = FieldsConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Field Registry Configuration\n");
                println!("Registry:");
                println!("  Path: {:?}", cfg.registry.path);
                println!("  Extension: {}", cfg.registry.extension);

                println!("\nTransform:");
                println!("  Profile: {}", cfg.transform.profile);

                println!("\nMerge:");
                println!("  Duplicates: {:?}", cfg.merge.duplicates);
            }
        }

        Commands::Init { output } => {
            let cfg = FieldsConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => match FieldsConfig::load_from(config.as_deref()) {
            Ok(cfg) => {
                if let Err(e) = transform::transformer_for(&cfg.transform.profile) {
                    eprintln!("❌ Configuration error: {}", e);
                    eprintln!("   Known profiles: {}", transform::profiles().join(", "));
                    std::process::exit(1);
                }
                println!("✅ Configuration is valid");
                println!("   Registry: {:?}", cfg.registry.path);
                println!("   Profile: {}", cfg.transform.profile);
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
