use crate::{print_json, App};
use optiscope_core::domain::option::OptionSide;
use optiscope_core::domain::watchlist::{WatchlistKey, WatchlistKind};
use optiscope_core::watchlist::{AddOutcome, WatchlistBook};

#[derive(Debug, clap::Subcommand)]
pub enum WatchlistCommand {
    /// Show saved stocks or options.
    List {
        #[arg(long, default_value = "stocks")]
        kind: WatchlistKind,
    },
    /// Save a stock, or an option when --strike/--expiration/--side are given.
    Add(KeyArgs),
    /// Remove a saved stock or option.
    Remove(KeyArgs),
}

#[derive(Debug, clap::Args)]
pub struct KeyArgs {
    pub symbol: String,

    #[arg(long, requires_all = ["expiration", "side"])]
    pub strike: Option<f64>,

    #[arg(long, requires = "strike")]
    pub expiration: Option<String>,

    #[arg(long, requires = "strike")]
    pub side: Option<OptionSide>,
}

impl KeyArgs {
    pub fn key(&self) -> WatchlistKey {
        match (self.strike, self.expiration.as_deref(), self.side) {
            (Some(strike), Some(expiration), Some(side)) => {
                WatchlistKey::option(&self.symbol, strike, expiration, side)
            }
            _ => WatchlistKey::stock(&self.symbol),
        }
    }
}

pub async fn run(app: &App, cmd: WatchlistCommand) -> anyhow::Result<()> {
    let session = app.require_session()?;
    let backend = app.backend.as_ref();

    match cmd {
        WatchlistCommand::List { kind } => {
            let mut book = WatchlistBook::new(kind);
            book.refresh(backend, session).await?;
            if app.json {
                return print_json(&book.entries());
            }
            print_entries(&book);
        }
        WatchlistCommand::Add(args) => {
            let key = args.key();
            let mut book = WatchlistBook::new(key.kind());
            book.refresh(backend, session).await?;
            match book.add(backend, session, &key).await? {
                AddOutcome::Added => println!("Added {key}."),
                AddOutcome::AlreadyPresent => println!("{key} is already in your watchlist."),
            }
            print_entries(&book);
        }
        WatchlistCommand::Remove(args) => {
            let key = args.key();
            let mut book = WatchlistBook::new(key.kind());
            book.refresh(backend, session).await?;
            if !book.contains(&key) {
                println!("{key} is not in your watchlist.");
                return Ok(());
            }
            book.remove(backend, session, &key).await?;
            println!("Removed {key}.");
            print_entries(&book);
        }
    }
    Ok(())
}

fn print_entries(book: &WatchlistBook) {
    if book.entries().is_empty() {
        println!("Your {} watchlist is empty.", book.kind());
        return;
    }
    println!("{} watchlist:", book.kind());
    for entry in book.entries() {
        let id = entry
            .id
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| "-".into());
        let added = entry.added_at.as_deref().unwrap_or("");
        println!("  {id:>6}  {}  {added}", entry.key);
    }
}
