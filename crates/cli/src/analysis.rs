use crate::{print_json, App};
use anyhow::Context;
use optiscope_core::backend::BackendApi;
use optiscope_core::domain::expected_value::dollars;
use optiscope_core::domain::history::{
    summarize_ev, summarize_premiums, summarize_probability, SeriesSummary,
};
use optiscope_core::domain::option::OptionSide;
use optiscope_core::domain::watchlist::{WatchlistKey, WatchlistKind};
use optiscope_core::ev::{EvInputs, EvSession, EvTarget};
use optiscope_core::watchlist::WatchlistBook;

#[derive(Debug, clap::Args)]
pub struct EvArgs {
    pub symbol: String,

    #[arg(long)]
    pub strike: f64,

    /// Expiration date (YYYY-MM-DD).
    #[arg(long)]
    pub expiration: String,

    #[arg(long)]
    pub side: OptionSide,

    /// Override the loaded stock price.
    #[arg(long)]
    pub stock_price: Option<String>,

    /// Override the loaded premium.
    #[arg(long)]
    pub premium: Option<String>,

    /// Override the loaded implied volatility, in percent.
    #[arg(long)]
    pub iv: Option<String>,

    /// Risk-free rate in percent. Defaults to OPTISCOPE_RISK_FREE_RATE_PCT.
    #[arg(long)]
    pub rate: Option<String>,
}

impl EvArgs {
    fn apply_overrides(&self, inputs: &mut EvInputs) {
        let overrides = [
            (&self.stock_price, &mut inputs.stock_price),
            (&self.premium, &mut inputs.premium),
            (&self.iv, &mut inputs.iv),
            (&self.rate, &mut inputs.risk_free_rate),
        ];
        for (value, slot) in overrides {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct HistoryArgs {
    /// Watchlist id of a saved option, as shown by `watchlist list --kind options`.
    pub id: i64,
}

pub async fn ev(app: &App, args: EvArgs) -> anyhow::Result<()> {
    app.require_session()?;
    let backend = app.backend.as_ref();

    let key = WatchlistKey::option(&args.symbol, args.strike, &args.expiration, args.side);
    let target = EvTarget::from_key(&key).context("not an option contract")?;

    let mut session = EvSession::new(app.settings.risk_free_rate_pct);
    session.select(target);
    session
        .load_details(backend)
        .await
        .with_context(|| format!("load details for {key}"))?;
    if let Some(inputs) = session.inputs_mut() {
        args.apply_overrides(inputs);
    }

    let result = session.compute(backend, chrono::Utc::now()).await?;
    if app.json {
        return print_json(&result);
    }

    println!("{key}");
    if let Some(inputs) = session.inputs() {
        println!(
            "  stock ${}  premium ${}  IV {}%  rate {}%",
            inputs.stock_price, inputs.premium, inputs.iv, inputs.risk_free_rate
        );
    }
    for (label, value) in result.display_rows() {
        println!("  {label:<16} {value}");
    }
    Ok(())
}

pub async fn history(app: &App, args: HistoryArgs) -> anyhow::Result<()> {
    let session = app.require_session()?;
    let backend = app.backend.as_ref();

    let mut book = WatchlistBook::new(WatchlistKind::Options);
    book.refresh(backend, session).await?;
    let entry = book
        .find_by_id(args.id)
        .with_context(|| format!("no saved option with id {}", args.id))?;

    let (prices, evs) = tokio::try_join!(
        backend.option_price_history(args.id),
        backend.option_ev_history(args.id),
    )?;

    if app.json {
        return print_json(&serde_json::json!({
            "option": entry,
            "price_history": prices,
            "ev_history": evs,
        }));
    }

    println!("{}", entry.key);
    print_summary("Premium", summarize_premiums(&prices), "$");
    print_summary("Expected value", summarize_ev(&evs), "$");
    print_summary("Probability ITM", summarize_probability(&evs), "%");
    Ok(())
}

fn print_summary(label: &str, summary: Option<SeriesSummary>, unit: &str) {
    let Some(s) = summary else {
        println!("  {label}: no history yet");
        return;
    };
    let fmt = |v: f64| {
        if unit == "%" {
            format!("{v:.2}%")
        } else {
            dollars(v)
        }
    };
    println!(
        "  {label}: {} points, {} -> {} ({} to {}), low {} high {}, change {}",
        s.points,
        fmt(s.first),
        fmt(s.last),
        s.first_at,
        s.last_at,
        fmt(s.min),
        fmt(s.max),
        fmt(s.change()),
    );
}
