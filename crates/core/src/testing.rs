//! In-memory `BackendApi` for unit tests.

use crate::backend::{ApiError, ApiResult, BackendApi};
use crate::domain::expected_value::{EvRequest, EvResult, OptionDetails};
use crate::domain::history::{EvPoint, PricePoint};
use crate::domain::option::{OptionChain, OptionSide};
use crate::domain::profile::{ProfileUpdate, UserProfile};
use crate::domain::quote::Quote;
use crate::domain::suggestion::Suggestion;
use crate::domain::watchlist::{WatchlistEntry, WatchlistKey, WatchlistKind};
use crate::session::Session;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    rows: HashMap<String, Vec<WatchlistEntry>>,
    next_id: i64,
    watchlist_fetches: usize,
    mutations: usize,
    fail_mutations: bool,
    chains: HashMap<(String, String), (OptionChain, Duration)>,
    details: Option<OptionDetails>,
    ev_result: Option<EvResult>,
    ev_requests: Vec<EvRequest>,
    suggestions: Vec<Suggestion>,
    suggestion_fetches: usize,
    profiles: HashMap<String, UserProfile>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<State>,
}

fn offline() -> ApiError {
    ApiError::Network("connection refused".into())
}

impl FakeBackend {
    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn seed_watchlist(&self, uid: &str, keys: Vec<WatchlistKey>) {
        self.with(|s| {
            for key in keys {
                insert_row(s, uid, key);
            }
        });
    }

    pub fn watchlist_fetches(&self) -> usize {
        self.with(|s| s.watchlist_fetches)
    }

    pub fn mutations(&self) -> usize {
        self.with(|s| s.mutations)
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.with(|s| s.fail_mutations = fail);
    }

    /// `expiration = ""` serves requests that name no expiration.
    pub fn set_chain(&self, symbol: &str, expiration: &str, chain: OptionChain, delay: Duration) {
        self.with(|s| {
            s.chains
                .insert((symbol.to_string(), expiration.to_string()), (chain, delay))
        });
    }

    pub fn set_details(&self, details: Option<OptionDetails>) {
        self.with(|s| s.details = details);
    }

    pub fn set_ev_result(&self, result: Option<EvResult>) {
        self.with(|s| s.ev_result = result);
    }

    pub fn ev_requests(&self) -> Vec<EvRequest> {
        self.with(|s| s.ev_requests.clone())
    }

    pub fn suggestion_fetches(&self) -> usize {
        self.with(|s| s.suggestion_fetches)
    }
}

fn insert_row(s: &mut State, uid: &str, key: WatchlistKey) {
    s.next_id += 1;
    let id = s.next_id;
    s.rows.entry(uid.to_string()).or_default().push(WatchlistEntry {
        id: Some(id),
        key,
        added_at: Some("2024-05-01T10:00:00".into()),
    });
}

#[async_trait::async_trait]
impl BackendApi for FakeBackend {
    async fn quote(&self, symbol: &str) -> ApiResult<Quote> {
        Err(ApiError::NotFoundOrInvalidInput(format!(
            "Invalid ticker or missing data: {symbol}"
        )))
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiration: Option<&str>,
    ) -> ApiResult<OptionChain> {
        let key = (symbol.to_string(), expiration.unwrap_or_default().to_string());
        let found = self.with(|s| s.chains.get(&key).cloned());
        let (chain, delay) = found.ok_or_else(|| {
            ApiError::NotFoundOrInvalidInput(format!("no chain for {symbol}"))
        })?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(chain)
    }

    async fn watchlist(
        &self,
        session: &Session,
        kind: WatchlistKind,
    ) -> ApiResult<Vec<WatchlistEntry>> {
        Ok(self.with(|s| {
            s.watchlist_fetches += 1;
            s.rows
                .get(&session.uid)
                .map(|rows| {
                    rows.iter()
                        .filter(|r| r.key.kind() == kind)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn add_to_watchlist(&self, session: &Session, key: &WatchlistKey) -> ApiResult<()> {
        self.with(|s| {
            if s.fail_mutations {
                return Err(offline());
            }
            let rows = s.rows.get(&session.uid).map(Vec::as_slice).unwrap_or(&[]);
            if rows.iter().any(|r| &r.key == key) {
                return Err(ApiError::DuplicateEntry);
            }
            s.mutations += 1;
            insert_row(s, &session.uid, key.clone());
            Ok(())
        })
    }

    async fn remove_from_watchlist(
        &self,
        session: &Session,
        key: &WatchlistKey,
    ) -> ApiResult<()> {
        self.with(|s| {
            if s.fail_mutations {
                return Err(offline());
            }
            s.mutations += 1;
            if let Some(rows) = s.rows.get_mut(&session.uid) {
                rows.retain(|r| &r.key != key);
            }
            Ok(())
        })
    }

    async fn option_details(
        &self,
        _symbol: &str,
        _expiration: &str,
        _strike: f64,
        _side: OptionSide,
    ) -> ApiResult<OptionDetails> {
        self.with(|s| s.details.clone()).ok_or_else(offline)
    }

    async fn calculate_ev(&self, request: &EvRequest) -> ApiResult<EvResult> {
        self.with(|s| {
            s.ev_requests.push(request.clone());
            s.ev_result.clone().ok_or_else(offline)
        })
    }

    async fn option_price_history(&self, _watchlist_id: i64) -> ApiResult<Vec<PricePoint>> {
        Ok(Vec::new())
    }

    async fn option_ev_history(&self, _watchlist_id: i64) -> ApiResult<Vec<EvPoint>> {
        Ok(Vec::new())
    }

    async fn smart_suggestions(&self) -> ApiResult<Vec<Suggestion>> {
        Ok(self.with(|s| {
            s.suggestion_fetches += 1;
            s.suggestions.clone()
        }))
    }

    async fn ask_gpt(&self, question: &str) -> ApiResult<String> {
        Ok(format!("echo: {question}"))
    }

    async fn register_user(&self, session: &Session) -> ApiResult<()> {
        self.with(|s| {
            s.profiles.entry(session.uid.clone()).or_insert(UserProfile {
                preferred_view: Default::default(),
                account_type: Default::default(),
                last_login: None,
            });
        });
        Ok(())
    }

    async fn update_user(&self, session: &Session, update: &ProfileUpdate) -> ApiResult<()> {
        self.with(|s| {
            let profile = s
                .profiles
                .get_mut(&session.uid)
                .ok_or_else(|| ApiError::NotFoundOrInvalidInput("User not found".into()))?;
            if let Some(view) = update.preferred_view {
                profile.preferred_view = view;
            }
            if let Some(account) = update.account_type {
                profile.account_type = account;
            }
            Ok(())
        })
    }

    async fn user_profile(&self, session: &Session) -> ApiResult<UserProfile> {
        self.with(|s| s.profiles.get(&session.uid).cloned())
            .ok_or_else(|| ApiError::NotFoundOrInvalidInput("User not found".into()))
    }

    async fn update_last_login(&self, session: &Session) -> ApiResult<()> {
        self.with(|s| {
            let profile = s
                .profiles
                .get_mut(&session.uid)
                .ok_or_else(|| ApiError::NotFoundOrInvalidInput("User not found".into()))?;
            profile.last_login = Some("2024-05-01T10:00:00".into());
            Ok(())
        })
    }
}
