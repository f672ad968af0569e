use crate::backend::{ApiResult, BackendApi};
use crate::domain::canonical_symbol;
use crate::domain::filter::FilterCriteria;
use crate::domain::option::{OptionChain, OptionContract, OptionSide};
use crate::domain::watchlist::{is_in_watchlist, WatchlistEntry, WatchlistKey};
use crate::sequence::{RequestSequencer, Ticket};

/// A chain request that has been issued but not yet applied.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    ticket: Ticket,
    pub symbol: String,
    pub expiration: Option<String>,
}

impl PendingLoad {
    pub async fn fetch(self, backend: &dyn BackendApi) -> LoadedChain {
        let result = backend
            .option_chain(&self.symbol, self.expiration.as_deref())
            .await;
        LoadedChain {
            pending: self,
            result,
        }
    }
}

#[derive(Debug)]
pub struct LoadedChain {
    pending: PendingLoad,
    result: ApiResult<OptionChain>,
}

/// Option chain view state for one symbol: which expiration and side are
/// shown and how they are filtered. Chain loads are sequenced so a slow
/// response for an old expiration is never shown over a newer one.
#[derive(Debug, Default)]
pub struct OptionBook {
    symbol: String,
    chain: Option<OptionChain>,
    selected_expiration: Option<String>,
    side: Option<OptionSide>,
    pub criteria: FilterCriteria,
    sequencer: RequestSequencer,
}

impl OptionBook {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: canonical_symbol(symbol),
            ..Self::default()
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn chain(&self) -> Option<&OptionChain> {
        self.chain.as_ref()
    }

    pub fn selected_expiration(&self) -> Option<&str> {
        self.selected_expiration.as_deref()
    }

    pub fn side(&self) -> OptionSide {
        self.side.unwrap_or(OptionSide::Calls)
    }

    pub fn set_side(&mut self, side: OptionSide) {
        self.side = Some(side);
    }

    /// Issues a ticket for loading `expiration`, or the current selection when
    /// none (or a blank one) is given. Any load still in flight becomes stale.
    /// The selection itself only changes once the load is applied.
    pub fn begin_load(&mut self, expiration: Option<&str>) -> PendingLoad {
        let requested = expiration
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .or_else(|| self.selected_expiration.clone());
        PendingLoad {
            ticket: self.sequencer.issue(),
            symbol: self.symbol.clone(),
            expiration: requested,
        }
    }

    /// Applies a finished load. `Ok(false)` means the response was stale and
    /// dropped; errors from stale loads are dropped as well. A current error
    /// leaves the previous chain and selection in place.
    pub fn apply(&mut self, loaded: LoadedChain) -> ApiResult<bool> {
        let LoadedChain { pending, result } = loaded;
        let Some(result) = self.sequencer.accept(pending.ticket, result) else {
            return Ok(false);
        };
        let chain = result?;
        self.selected_expiration = pending
            .expiration
            .or_else(|| chain.default_expiration().map(str::to_string));
        tracing::debug!(
            symbol = %self.symbol,
            expiration = ?self.selected_expiration,
            calls = chain.calls.len(),
            puts = chain.puts.len(),
            "option chain loaded"
        );
        self.chain = Some(chain);
        Ok(true)
    }

    /// `begin_load` + `fetch` + `apply` for callers with a single request in
    /// flight.
    pub async fn load(
        &mut self,
        backend: &dyn BackendApi,
        expiration: Option<&str>,
    ) -> ApiResult<bool> {
        let loaded = self.begin_load(expiration).fetch(backend).await;
        self.apply(loaded)
    }

    /// The chosen side of the loaded chain with the filter applied.
    pub fn visible_contracts(&self) -> Vec<OptionContract> {
        self.chain
            .as_ref()
            .map(|chain| self.criteria.apply(chain.side(self.side())))
            .unwrap_or_default()
    }

    /// Watchlist key of `contract` under the current symbol, expiration and
    /// side. `None` until an expiration is known.
    pub fn key_for(&self, contract: &OptionContract) -> Option<WatchlistKey> {
        let expiration = self.selected_expiration.as_deref()?;
        Some(WatchlistKey::option(
            &self.symbol,
            contract.strike,
            expiration,
            self.side(),
        ))
    }

    pub fn is_in_watchlist(&self, contract: &OptionContract, snapshot: &[WatchlistEntry]) -> bool {
        self.key_for(contract)
            .is_some_and(|key| is_in_watchlist(&key, snapshot))
    }
}
