//! symptom-checker CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use symptom_checker::{
    classifier::train::TrainOptions,
    commands::{
        cmd_init, cmd_keygen, cmd_list_records, cmd_serve, cmd_show_record, cmd_status,
        cmd_train, print_init_summary, print_record_detail, print_records, print_status,
        print_train_result,
    },
    config::Config,
    crypto::SymptomCipher,
    db::SymptomDb,
    error::Result,
    logging::init_logging,
};

#[derive(Parser)]
#[command(name = "symptom-checker")]
#[command(version, about = "Symptom-to-condition prediction service", long_about = None)]
struct Cli {
    /// Path to config file, or a directory holding config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and create the seeded database
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Print a fresh base64 encryption key
    Keygen,

    /// Train the classifier on synthetic data
    Train {
        /// Number of synthetic samples
        #[arg(long, default_value = "100")]
        samples: usize,

        /// RNG seed for sample generation
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Where to write the model (defaults to model.path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Show system status
    Status,

    /// Inspect stored prediction records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List the most recent records
    List {
        /// Maximum number of records
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Show one record with its decrypted symptom list
    Show {
        /// Record ID
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Completions and keygen need neither config nor logging
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "symptom-checker", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Keygen => {
            let key = cmd_keygen();
            if cli.json {
                println!("{}", serde_json::json!({ "key": key }));
            } else {
                println!("{}", key);
            }
            return Ok(());
        }
        _ => {}
    }

    if let Commands::Init { force } = cli.command {
        init_logging(cli.verbose, false, None)?;
        return handle_init(cli.config.as_deref(), force, cli.json).await;
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(
        cli.verbose,
        config.logging.json,
        config.log_file().as_deref(),
    )?;

    match cli.command {
        Commands::Init { .. } | Commands::Keygen | Commands::Completions { .. } => unreachable!(),

        Commands::Train {
            samples,
            seed,
            output,
        } => {
            let options = TrainOptions {
                samples,
                seed,
                ..Default::default()
            };
            let result = cmd_train(&config, &options, output)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_train_result(&result);
            }
        }

        Commands::Serve { bind } => {
            cmd_serve(&config, bind).await?;
        }

        Commands::Status => {
            let db = SymptomDb::open(&config).await?;
            let status = cmd_status(&config, &db).await?;
            db.close().await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Records { action } => {
            let db = SymptomDb::open(&config).await?;
            let outcome = handle_records(&config, &db, action, cli.json).await;
            db.close().await;
            outcome?;
        }
    }

    Ok(())
}

async fn handle_init(config: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let (base_dir, config_path) = Config::resolve_location(config);

    let summary = cmd_init(base_dir, config_path, force).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_init_summary(&summary);
    }
    Ok(())
}

async fn handle_records(
    config: &Config,
    db: &SymptomDb,
    action: RecordsAction,
    json: bool,
) -> Result<()> {
    match action {
        RecordsAction::List { limit } => {
            let records = cmd_list_records(db, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
            }
        }
        RecordsAction::Show { id } => {
            let cipher = SymptomCipher::from_config(&config.crypto)?;
            let detail = cmd_show_record(db, &cipher, id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_record_detail(&detail);
            }
        }
    }
    Ok(())
}

/// `--config` is resolved the same way `init` resolves it
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(_) => {
            let (_, config_file) = Config::resolve_location(path);
            Config::load(&config_file)
        }
        None => Config::load_from(None),
    }
}
