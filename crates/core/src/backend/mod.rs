pub mod error;
pub mod http;

pub use error::ApiError;
pub use http::HttpBackend;

use crate::domain::expected_value::{EvRequest, EvResult, OptionDetails};
use crate::domain::history::{EvPoint, PricePoint};
use crate::domain::option::{OptionChain, OptionSide};
use crate::domain::profile::{ProfileUpdate, UserProfile};
use crate::domain::quote::Quote;
use crate::domain::suggestion::Suggestion;
use crate::domain::watchlist::{WatchlistEntry, WatchlistKey, WatchlistKind};
use crate::session::Session;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every endpoint the client consumes. `HttpBackend` talks to the real
/// service; tests substitute an in-memory implementation.
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    async fn quote(&self, symbol: &str) -> ApiResult<Quote>;

    /// `expiration = None` asks for the server's default (nearest) expiration.
    async fn option_chain(&self, symbol: &str, expiration: Option<&str>)
        -> ApiResult<OptionChain>;

    async fn watchlist(&self, session: &Session, kind: WatchlistKind)
        -> ApiResult<Vec<WatchlistEntry>>;

    /// `Err(ApiError::DuplicateEntry)` when the row already exists.
    async fn add_to_watchlist(&self, session: &Session, key: &WatchlistKey) -> ApiResult<()>;

    async fn remove_from_watchlist(&self, session: &Session, key: &WatchlistKey)
        -> ApiResult<()>;

    async fn option_details(
        &self,
        symbol: &str,
        expiration: &str,
        strike: f64,
        side: OptionSide,
    ) -> ApiResult<OptionDetails>;

    async fn calculate_ev(&self, request: &EvRequest) -> ApiResult<EvResult>;

    async fn option_price_history(&self, watchlist_id: i64) -> ApiResult<Vec<PricePoint>>;

    async fn option_ev_history(&self, watchlist_id: i64) -> ApiResult<Vec<EvPoint>>;

    async fn smart_suggestions(&self) -> ApiResult<Vec<Suggestion>>;

    async fn ask_gpt(&self, question: &str) -> ApiResult<String>;

    async fn register_user(&self, session: &Session) -> ApiResult<()>;

    async fn update_user(&self, session: &Session, update: &ProfileUpdate) -> ApiResult<()>;

    async fn user_profile(&self, session: &Session) -> ApiResult<UserProfile>;

    async fn update_last_login(&self, session: &Session) -> ApiResult<()>;
}
