use crate::{print_json, App};
use anyhow::Context;
use optiscope_core::backend::BackendApi;
use optiscope_core::book::OptionBook;
use optiscope_core::domain::filter::FilterCriteria;
use optiscope_core::domain::option::OptionSide;
use optiscope_core::domain::suggestion::Suggestion;
use optiscope_core::domain::watchlist::{WatchlistEntry, WatchlistKind};
use optiscope_core::refresh::suggestions_feed;
use optiscope_core::watchlist::WatchlistBook;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, clap::Args)]
pub struct ChainArgs {
    pub symbol: String,

    /// Expiration date (YYYY-MM-DD). Defaults to the nearest one.
    #[arg(long)]
    pub expiration: Option<String>,

    #[arg(long, default_value = "calls")]
    pub side: OptionSide,

    #[arg(long, default_value = "")]
    pub min_strike: String,

    #[arg(long, default_value = "")]
    pub max_strike: String,

    #[arg(long, default_value = "")]
    pub min_volume: String,

    /// Maximum implied volatility, in percent.
    #[arg(long, default_value = "")]
    pub max_iv: String,

    #[arg(long)]
    pub itm_only: bool,
}

pub async fn quote(app: &App, symbol: &str) -> anyhow::Result<()> {
    let quote = app.backend.quote(symbol).await?;
    if app.json {
        return print_json(&quote);
    }
    println!("{}  ${:.2}", quote.symbol, quote.current_price);
    println!("{}", quote.change_line());
    println!(
        "Previous close: ${:.2}  Volume: {}",
        quote.previous_close, quote.volume
    );
    Ok(())
}

pub async fn chain(app: &App, args: ChainArgs) -> anyhow::Result<()> {
    let mut book = OptionBook::new(&args.symbol);
    book.set_side(args.side);
    book.criteria = FilterCriteria {
        min_strike: args.min_strike,
        max_strike: args.max_strike,
        min_volume: args.min_volume,
        max_iv: args.max_iv,
        itm_only: args.itm_only,
    };
    book.load(app.backend.as_ref(), args.expiration.as_deref())
        .await
        .with_context(|| format!("load option chain for {}", book.symbol()))?;

    let contracts = book.visible_contracts();
    if app.json {
        return print_json(&contracts);
    }

    let snapshot = option_snapshot(app).await;
    let expirations = book
        .chain()
        .map(|c| c.expirations.join(", "))
        .unwrap_or_default();

    println!(
        "{} {} exp {}",
        book.symbol(),
        book.side(),
        book.selected_expiration().unwrap_or("-")
    );
    println!("Expirations: {expirations}");
    println!(
        "{:>10} {:>8} {:>8} {:>8} {:>7} {:>8} {:>8} {:>4} {:>2}",
        "Strike", "Bid", "Ask", "Last", "IV%", "Volume", "OI", "ITM", ""
    );
    for c in &contracts {
        let saved = book.is_in_watchlist(c, &snapshot);
        println!(
            "{:>10.2} {:>8.2} {:>8.2} {:>8} {:>7.2} {:>8} {:>8} {:>4} {:>2}",
            c.strike,
            c.bid,
            c.ask,
            c.last_price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".into()),
            c.iv_percent(),
            c.volume,
            c.open_interest,
            if c.in_the_money { "yes" } else { "" },
            if saved { "*" } else { "" },
        );
    }
    if contracts.is_empty() {
        println!("No contracts match the filter.");
    }
    Ok(())
}

/// Saved options of the signed-in user, or empty when logged out or when the
/// watchlist cannot be fetched.
async fn option_snapshot(app: &App) -> Vec<WatchlistEntry> {
    let Some(session) = app.session.as_ref() else {
        return Vec::new();
    };
    let mut book = WatchlistBook::new(WatchlistKind::Options);
    match book.refresh(app.backend.as_ref(), session).await {
        Ok(()) => book.entries().to_vec(),
        Err(err) => {
            tracing::warn!(error = %err, "watchlist unavailable; membership markers hidden");
            Vec::new()
        }
    }
}

pub async fn suggestions(app: &App, watch: bool) -> anyhow::Result<()> {
    if !watch {
        let list = app.backend.smart_suggestions().await?;
        let snapshot = option_snapshot(app).await;
        return print_suggestions(app, &list, &snapshot);
    }

    let backend: Arc<dyn BackendApi> = app.backend.clone();
    let period = Duration::from_secs(app.settings.suggestions_refresh_secs);
    let mut feed = suggestions_feed(backend, period);
    tracing::info!(period_secs = period.as_secs(), "watching smart suggestions");

    loop {
        tokio::select! {
            next = feed.next() => {
                let Some(list) = next else { break };
                let snapshot = option_snapshot(app).await;
                print_suggestions(app, &list, &snapshot)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping suggestions feed");
                break;
            }
        }
    }
    feed.stop();
    Ok(())
}

fn print_suggestions(
    app: &App,
    list: &[Suggestion],
    snapshot: &[WatchlistEntry],
) -> anyhow::Result<()> {
    if app.json {
        return print_json(&list);
    }
    println!(
        "Smart suggestions ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if list.is_empty() {
        println!("  none right now");
    }
    for s in list {
        let saved = snapshot.iter().any(|e| e.key == s.watchlist_key());
        println!("  {}{}", s.headline(), if saved { "  [saved]" } else { "" });
        if !s.gpt_analysis.is_empty() {
            println!("    {}", s.short_analysis());
        }
    }
    Ok(())
}

pub async fn ask(app: &App, question: &str) -> anyhow::Result<()> {
    let answer = app.backend.ask_gpt(question).await?;
    println!("{answer}");
    Ok(())
}
