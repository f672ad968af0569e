use crate::backend::{ApiError, ApiResult, BackendApi};
use crate::config::Settings;
use crate::domain::canonical_symbol;
use crate::domain::expected_value::{EvRequest, EvResult, OptionDetails};
use crate::domain::history::{EvPoint, PricePoint};
use crate::domain::option::{OptionChain, OptionSide};
use crate::domain::profile::{Ack, ProfileUpdate, ProfileUpdateBody, RegisterUser, UserProfile};
use crate::domain::quote::Quote;
use crate::domain::suggestion::{GptAnswer, GptQuestion, Suggestion};
use crate::domain::watchlist::{WatchlistEntry, WatchlistKey, WatchlistKind, WatchlistMutation};
use crate::session::Session;
use anyhow::Context;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.api_base_url)
            .with_context(|| format!("invalid API base url: {}", settings.api_base_url))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "API base url cannot carry paths: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .context("failed to build backend http client")?;

        Ok(Self { http, base_url })
    }

    /// Base url joined with percent-encoded path segments. A trailing `""`
    /// segment yields a trailing slash, which several endpoints require.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Validation(format!("unusable base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<(String, String)> {
        let endpoint = url.path().to_string();
        tracing::debug!(%method, %url, "backend request");

        let mut req = self.http.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|e| {
            tracing::warn!(%endpoint, error = %e, "backend request failed");
            ApiError::from(e)
        })?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            tracing::warn!(%endpoint, %status, error = %err, "backend returned an error");
            return Err(err);
        }

        Ok((endpoint, text))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let (endpoint, text) = self.send::<()>(Method::GET, url, query, None).await?;
        decode(&endpoint, &text)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> ApiResult<T> {
        let (endpoint, text) = self.send(method, url, &[], Some(body)).await?;
        decode(&endpoint, &text)
    }

    /// For endpoints whose 2xx body is only an acknowledgement.
    async fn send_ack<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> ApiResult<()> {
        let (endpoint, text) = self.send(method, url, &[], Some(body)).await?;
        if let Ok(ack) = serde_json::from_str::<Ack>(&text) {
            if let Some(message) = ack.message {
                tracing::debug!(%endpoint, %message, "backend acknowledged");
            }
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, text: &str) -> ApiResult<T> {
    serde_json::from_str::<T>(text).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        detail: e.to_string(),
    })
}

#[async_trait::async_trait]
impl BackendApi for HttpBackend {
    async fn quote(&self, symbol: &str) -> ApiResult<Quote> {
        let symbol = canonical_symbol(symbol);
        let url = self.url(&["stocks", &symbol])?;
        self.get_json(url, &[]).await
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiration: Option<&str>,
    ) -> ApiResult<OptionChain> {
        let symbol = canonical_symbol(symbol);
        let url = self.url(&["options", &symbol])?;
        let mut chain: OptionChain = self
            .get_json(url, &[("expiration", expiration.unwrap_or_default())])
            .await?;
        if chain.symbol.is_empty() {
            chain.symbol = symbol;
        }
        Ok(chain)
    }

    async fn watchlist(
        &self,
        session: &Session,
        kind: WatchlistKind,
    ) -> ApiResult<Vec<WatchlistEntry>> {
        let url = self.url(&["get_watchlist", &session.uid])?;
        self.get_json(url, &[("type", kind.as_str())]).await
    }

    async fn add_to_watchlist(&self, session: &Session, key: &WatchlistKey) -> ApiResult<()> {
        let url = self.url(&["add_to_watchlist", ""])?;
        let body = WatchlistMutation {
            firebase_uid: &session.uid,
            key,
        };
        self.send_ack(Method::POST, url, &body).await
    }

    async fn remove_from_watchlist(
        &self,
        session: &Session,
        key: &WatchlistKey,
    ) -> ApiResult<()> {
        let url = self.url(&["remove_from_watchlist", ""])?;
        let body = WatchlistMutation {
            firebase_uid: &session.uid,
            key,
        };
        self.send_ack(Method::DELETE, url, &body).await
    }

    async fn option_details(
        &self,
        symbol: &str,
        expiration: &str,
        strike: f64,
        side: OptionSide,
    ) -> ApiResult<OptionDetails> {
        let symbol = canonical_symbol(symbol);
        let strike = strike.to_string();
        let url = self.url(&["option_details", &symbol, expiration, &strike, side.as_str()])?;
        self.get_json(url, &[]).await
    }

    async fn calculate_ev(&self, request: &EvRequest) -> ApiResult<EvResult> {
        let url = self.url(&["calculate_ev"])?;
        self.send_json(Method::POST, url, request).await
    }

    async fn option_price_history(&self, watchlist_id: i64) -> ApiResult<Vec<PricePoint>> {
        let id = watchlist_id.to_string();
        let url = self.url(&["option_price_history", &id])?;
        self.get_json(url, &[]).await
    }

    async fn option_ev_history(&self, watchlist_id: i64) -> ApiResult<Vec<EvPoint>> {
        let id = watchlist_id.to_string();
        let url = self.url(&["option_ev_history", &id])?;
        self.get_json(url, &[]).await
    }

    async fn smart_suggestions(&self) -> ApiResult<Vec<Suggestion>> {
        let url = self.url(&["smart_suggestions"])?;
        self.get_json(url, &[]).await
    }

    async fn ask_gpt(&self, question: &str) -> ApiResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ApiError::Validation("question must be non-empty".into()));
        }
        let url = self.url(&["ask_gpt"])?;
        let answer: GptAnswer = self
            .send_json(Method::POST, url, &GptQuestion { question })
            .await?;
        Ok(answer.response)
    }

    async fn register_user(&self, session: &Session) -> ApiResult<()> {
        let email = session
            .email
            .as_deref()
            .ok_or_else(|| ApiError::Validation("registration needs an email".into()))?;
        let url = self.url(&["register_user", ""])?;
        let body = RegisterUser {
            firebase_uid: &session.uid,
            email,
            name: session.display_name.as_deref().unwrap_or_default(),
        };
        self.send_ack(Method::POST, url, &body).await
    }

    async fn update_user(&self, session: &Session, update: &ProfileUpdate) -> ApiResult<()> {
        let url = self.url(&["update_user", ""])?;
        let body = ProfileUpdateBody {
            firebase_uid: &session.uid,
            update,
        };
        self.send_ack(Method::PATCH, url, &body).await
    }

    async fn user_profile(&self, session: &Session) -> ApiResult<UserProfile> {
        let url = self.url(&["user_profile", &session.uid])?;
        self.get_json(url, &[]).await
    }

    async fn update_last_login(&self, session: &Session) -> ApiResult<()> {
        let url = self.url(&["update_last_login", ""])?;
        let body = serde_json::json!({ "firebase_uid": session.uid });
        self.send_ack(Method::POST, url, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        let settings = Settings {
            api_base_url: base.to_string(),
            ..Settings::default()
        };
        HttpBackend::from_settings(&settings).unwrap()
    }

    #[test]
    fn builds_encoded_urls() {
        let b = backend("http://127.0.0.1:8000");
        assert_eq!(
            b.url(&["stocks", "BRK B"]).unwrap().as_str(),
            "http://127.0.0.1:8000/stocks/BRK%20B"
        );
        assert_eq!(
            b.url(&["add_to_watchlist", ""]).unwrap().as_str(),
            "http://127.0.0.1:8000/add_to_watchlist/"
        );
        assert_eq!(
            b.url(&["option_details", "AAPL", "2025-01-17", "150", "calls"])
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8000/option_details/AAPL/2025-01-17/150/calls"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let b = backend("https://example.com/api/");
        assert_eq!(
            b.url(&["smart_suggestions"]).unwrap().as_str(),
            "https://example.com/api/smart_suggestions"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        let settings = Settings {
            api_base_url: "mailto:someone@example.com".into(),
            ..Settings::default()
        };
        assert!(HttpBackend::from_settings(&settings).is_err());
    }

    #[test]
    fn decode_errors_name_the_endpoint() {
        let err = decode::<Quote>("/stocks/AAPL", "{\"symbol\": 1}").unwrap_err();
        match err {
            ApiError::Decode { endpoint, .. } => assert_eq!(endpoint, "/stocks/AAPL"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
