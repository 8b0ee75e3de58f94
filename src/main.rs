use budget_tracker::args::{Args, Command};
use budget_tracker::{commands, Config, ErrorType, IntoResult, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().budget_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Add(add_args) => {
            let config = load(home).await?;
            commands::add(config, add_args.clone()).await?.print()
        }

        Command::Update(update_args) => {
            let config = load(home).await?;
            commands::update(config, update_args.clone()).await?.print()
        }

        Command::Delete(delete_args) => {
            let config = load(home).await?;
            commands::delete(config, delete_args.clone()).await?.print()
        }

        Command::List(view_args) => {
            let config = load(home).await?;
            commands::list(config, view_args.clone()).await?.print()
        }

        Command::Summary(view_args) => {
            let config = load(home).await?;
            commands::summary(config, view_args.clone()).await?.print()
        }

        Command::Breakdown(breakdown_args) => {
            let config = load(home).await?;
            commands::breakdown(config, breakdown_args.clone())
                .await?
                .print()
        }

        Command::Export(export_args) => {
            let config = load(home).await?;
            commands::export(config, export_args.clone()).await?.print()
        }

        Command::Import(import_args) => {
            let config = load(home).await?;
            commands::import(config, import_args.clone()).await?.print()
        }

        Command::Clear(clear_args) => {
            let config = load(home).await?;
            commands::clear(config, clear_args.clone()).await?.print()
        }

        Command::Info => commands::info(load(home).await?).await?.print(),
    };
    Ok(())
}

async fn load(home: &Path) -> Result<Config> {
    Config::load(home).await.pub_result(ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "budget_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
