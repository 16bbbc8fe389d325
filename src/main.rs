use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use psikotes::config::{self, Config};
use psikotes::error::AppError;
use psikotes::records::{self, SubmissionForm};
use psikotes::report;
use psikotes::session::{self, Session};
use psikotes::store::{RestStore, Store};

const EXIT_SUCCESS: i32 = 0;
const EXIT_SESSION: i32 = 1;
const EXIT_STORE: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a session with an access token
    Login,
    /// Forget the saved session
    Logout,
    /// Validate, score and save a submission file (YAML)
    Submit {
        /// Path to the submission file
        file: PathBuf,
    },
    /// Show the record count and the most recent records
    Dashboard,
    /// List all records, newest first
    List,
    /// Show the full report for one record
    Show {
        /// Record id
        id: String,
        /// Seed for the sampled descriptions (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Delete a record and its test results
    Delete {
        /// Record id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export records to an .xlsx workbook
    Export {
        /// Export only this record (all records when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Output directory (defaults to export.dir, then the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Create a config file interactively
    Init,
    /// Print the classification tables
    Bands,
}

#[derive(Parser, Debug)]
#[command(name = "psikotes")]
#[command(about = "Record, score and report psychological test results", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/psikotes/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "warn,psikotes=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Validation(_) => EXIT_VALIDATION,
        AppError::SessionExpired => EXIT_SESSION,
        AppError::Store(_)
        | AppError::NotFound(_)
        | AppError::PartialWrite { .. }
        | AppError::Export(_) => EXIT_STORE,
    }
}

fn fail(err: AppError) -> ! {
    tracing::error!("{}", err);
    eprintln!("{}", err);
    std::process::exit(exit_code(&err));
}

fn load_config_or_exit(path: Option<PathBuf>) -> Config {
    let config = match config::load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    tracing::debug!(url = %config.store.url, "config loaded");
    config
}

fn session_path_or_exit() -> PathBuf {
    match session::get_session_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn connect(config: &Config, token: String) -> RestStore {
    match RestStore::new(&config.store, token) {
        Ok(s) => s,
        Err(e) => fail(e.into()),
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.map(PathBuf::from);

    match cli.command {
        Commands::Init => {
            if let Err(e) = config::init::run_init_wizard(config_path) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Bands => {
            println!("{}", report::format_band_tables());
        }
        Commands::Logout => {
            let path = session_path_or_exit();
            match session::clear_session(&path) {
                Ok(true) => println!("Logged out."),
                Ok(false) => println!("No active session."),
                Err(e) => {
                    eprintln!("Failed to clear session: {:#}", e);
                    std::process::exit(EXIT_SESSION);
                }
            }
        }
        Commands::Login => {
            let config = load_config_or_exit(config_path);
            login(&config).await;
        }
        command => {
            let config = load_config_or_exit(config_path);
            let session_path = session_path_or_exit();
            let token = match session::require_session(&session_path, Utc::now()) {
                Ok(t) => t,
                Err(e) => fail(e),
            };
            let store = connect(&config, token);
            if let Err(e) = run(command, &store, &config).await {
                fail(e);
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

async fn login(config: &Config) {
    let ttl = match config
        .session
        .ttl_duration()
        .ok()
        .and_then(|d| chrono::Duration::from_std(d).ok())
    {
        Some(d) => d,
        None => {
            eprintln!("Config error: invalid session.ttl");
            std::process::exit(EXIT_CONFIG);
        }
    };

    let token = match session::get_token_from_env() {
        Some(t) => t,
        None => match session::prompt_for_token() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Login failed: {:#}", e);
                std::process::exit(EXIT_SESSION);
            }
        },
    };

    // A count is the cheapest call that proves the token is accepted.
    let store = connect(config, token.clone());
    if let Err(e) = store.count_personal().await {
        fail(e.into());
    }

    let path = session_path_or_exit();
    let session = Session::new(token, Utc::now(), ttl);
    if let Err(e) = session::save_session(&path, &session) {
        eprintln!("Failed to save session: {:#}", e);
        std::process::exit(EXIT_SESSION);
    }
    println!(
        "Logged in until {}.",
        session
            .expires_at
            .with_timezone(&chrono::Local)
            .format("%d/%m/%Y %H:%M")
    );
}

async fn run(command: Commands, store: &dyn Store, config: &Config) -> Result<(), AppError> {
    let use_colors = report::should_use_colors();

    match command {
        Commands::Submit { file } => submit(store, &file).await,
        Commands::Dashboard => {
            let (total, recent) = report::load_dashboard(store).await?;
            println!("{}", report::format_dashboard(total, &recent, use_colors));
            Ok(())
        }
        Commands::List => {
            let records = store.list_personal(None).await?;
            println!("{}", report::format_record_table(&records, use_colors));
            Ok(())
        }
        Commands::Show { id, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            tracing::debug!(seed, "sampling descriptions");
            let view = report::load_report_view(store, &id, seed).await?;
            println!(
                "{}",
                report::format_report(&view.report, &view.descriptions, use_colors)
            );
            Ok(())
        }
        Commands::Delete { id, yes } => {
            if !yes {
                let confirmed = config::init::prompt_yes_no(
                    &format!("Delete record {} and its test results?", id),
                    false,
                )
                .unwrap_or(false);
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            records::delete_record(store, &id).await?;
            println!("Record {} deleted.", id);
            Ok(())
        }
        Commands::Export { id, out } => {
            let dir = out.unwrap_or_else(|| config.export.dir_or_cwd());
            export(store, id.as_deref(), &dir).await
        }
        Commands::Login | Commands::Logout | Commands::Init | Commands::Bands => Ok(()),
    }
}

async fn submit(store: &dyn Store, file: &Path) -> Result<(), AppError> {
    let form = match read_form(file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot read submission: {:#}", e);
            std::process::exit(EXIT_VALIDATION);
        }
    };

    let valid = records::validate_submission(&form)?;
    let year = chrono::Local::now().year();
    let record = records::submit(store, valid, year).await?;
    println!(
        "Saved {} ({}) as record {}.",
        record.info.no_tes, record.info.nama_peserta, record.id
    );
    Ok(())
}

fn read_form(file: &Path) -> anyhow::Result<SubmissionForm> {
    use anyhow::Context;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_saphyr::from_str(&content)
        .with_context(|| format!("Invalid submission YAML in {}", file.display()))
}

async fn export(store: &dyn Store, id: Option<&str>, dir: &Path) -> Result<(), AppError> {
    let path = match id {
        Some(id) => {
            let report = store
                .fetch_report(id)
                .await?
                .ok_or_else(|| AppError::NotFound(id.to_string()))?;
            psikotes::export::export_single(&report, dir)?
        }
        None => {
            let reports = store.list_reports().await?;
            let today = chrono::Local::now().date_naive();
            psikotes::export::export_all(&reports, dir, today)?
        }
    };
    println!("Exported to {}", path.display());
    Ok(())
}
