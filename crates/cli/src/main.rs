use anyhow::Context;
use clap::{Parser, Subcommand};
use optiscope_core::backend::HttpBackend;
use optiscope_core::config::Settings;
use optiscope_core::session::Session;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod account;
mod analysis;
mod market;
mod watchlist;

#[derive(Debug, Parser)]
#[command(name = "optiscope", about = "Stock and option dashboard for the OptiScope backend")]
struct Args {
    /// Print raw JSON instead of formatted text where supported.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Current price snapshot for a ticker.
    Quote { symbol: String },
    /// Option chain for one expiration, filtered.
    Chain(market::ChainArgs),
    /// Saved stocks and options.
    #[command(subcommand)]
    Watchlist(watchlist::WatchlistCommand),
    /// Expected value of one option contract.
    Ev(analysis::EvArgs),
    /// Premium and EV history of a saved option.
    History(analysis::HistoryArgs),
    /// Smart suggestions feed.
    Suggestions {
        /// Keep running and print the feed on every refresh.
        #[arg(long)]
        watch: bool,
    },
    /// Ask the assistant a question.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Account profile.
    #[command(subcommand)]
    Profile(account::ProfileCommand),
}

/// What every command needs: configuration, the backend client and, when
/// configured, the signed-in user.
pub struct App {
    pub settings: Settings,
    pub backend: Arc<HttpBackend>,
    pub session: Option<Session>,
    pub json: bool,
}

impl App {
    pub fn require_session(&self) -> anyhow::Result<&Session> {
        Ok(Session::require(self.session.as_ref())?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let backend = HttpBackend::from_settings(&settings)?;
    let app = App {
        session: Session::from_settings(&settings),
        settings,
        backend: Arc::new(backend),
        json: args.json,
    };

    let result = run(&app, args.command).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    result
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Quote { symbol } => market::quote(app, &symbol).await,
        Command::Chain(args) => market::chain(app, args).await,
        Command::Watchlist(cmd) => watchlist::run(app, cmd).await,
        Command::Ev(args) => analysis::ev(app, args).await,
        Command::History(args) => analysis::history(app, args).await,
        Command::Suggestions { watch } => market::suggestions(app, watch).await,
        Command::Ask { question } => market::ask(app, &question.join(" ")).await,
        Command::Profile(cmd) => account::run(app, cmd).await,
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}
