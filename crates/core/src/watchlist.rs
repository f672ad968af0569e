use crate::backend::{ApiError, ApiResult, BackendApi};
use crate::domain::watchlist::{is_in_watchlist, WatchlistEntry, WatchlistKey, WatchlistKind};
use crate::session::Session;

/// What `add` achieved. A duplicate is reported, not failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Cached copy of one kind of watchlist. The server owns the truth: every
/// successful mutation is followed by a full refetch, and a failed mutation
/// leaves the snapshot as it was.
#[derive(Debug, Clone)]
pub struct WatchlistBook {
    kind: WatchlistKind,
    entries: Vec<WatchlistEntry>,
}

impl WatchlistBook {
    pub fn new(kind: WatchlistKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> WatchlistKind {
        self.kind
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn contains(&self, candidate: &WatchlistKey) -> bool {
        is_in_watchlist(candidate, &self.entries)
    }

    /// Server row id for `key`, needed by the history endpoints.
    pub fn id_of(&self, key: &WatchlistKey) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| &e.key == key)
            .and_then(|e| e.id)
    }

    pub fn find_by_id(&self, id: i64) -> Option<&WatchlistEntry> {
        self.entries.iter().find(|e| e.id == Some(id))
    }

    /// Replaces the snapshot. Rows of another kind and repeated keys are
    /// dropped; the first occurrence of a key wins.
    pub fn replace(&mut self, rows: Vec<WatchlistEntry>) {
        let mut entries: Vec<WatchlistEntry> = Vec::with_capacity(rows.len());
        for row in rows {
            if row.key.kind() != self.kind {
                tracing::warn!(kind = %self.kind, key = %row.key, "ignoring watchlist row of another kind");
                continue;
            }
            if is_in_watchlist(&row.key, &entries) {
                tracing::warn!(key = %row.key, "ignoring duplicate watchlist row");
                continue;
            }
            entries.push(row);
        }
        self.entries = entries;
    }

    pub async fn refresh(&mut self, backend: &dyn BackendApi, session: &Session) -> ApiResult<()> {
        let rows = backend.watchlist(session, self.kind).await?;
        tracing::debug!(kind = %self.kind, rows = rows.len(), "watchlist refreshed");
        self.replace(rows);
        Ok(())
    }

    pub async fn add(
        &mut self,
        backend: &dyn BackendApi,
        session: &Session,
        key: &WatchlistKey,
    ) -> ApiResult<AddOutcome> {
        self.check_kind(key)?;
        match backend.add_to_watchlist(session, key).await {
            Ok(()) => {
                tracing::info!(%key, "added to watchlist");
                self.refresh_after_mutation(backend, session).await;
                Ok(AddOutcome::Added)
            }
            Err(ApiError::DuplicateEntry) => {
                tracing::info!(%key, "already in watchlist");
                Ok(AddOutcome::AlreadyPresent)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn remove(
        &mut self,
        backend: &dyn BackendApi,
        session: &Session,
        key: &WatchlistKey,
    ) -> ApiResult<()> {
        self.check_kind(key)?;
        backend.remove_from_watchlist(session, key).await?;
        tracing::info!(%key, "removed from watchlist");
        self.entries.retain(|e| &e.key != key);
        self.refresh_after_mutation(backend, session).await;
        Ok(())
    }

    /// Adds when absent, removes when present. Returns whether the key is in
    /// the watchlist afterwards.
    pub async fn toggle(
        &mut self,
        backend: &dyn BackendApi,
        session: &Session,
        key: &WatchlistKey,
    ) -> ApiResult<bool> {
        if self.contains(key) {
            self.remove(backend, session, key).await?;
        } else {
            self.add(backend, session, key).await?;
        }
        Ok(self.contains(key))
    }

    fn check_kind(&self, key: &WatchlistKey) -> ApiResult<()> {
        if key.kind() != self.kind {
            return Err(ApiError::Validation(format!(
                "{key} does not belong in the {} watchlist",
                self.kind
            )));
        }
        Ok(())
    }

    /// The mutation already succeeded, so a failed refetch only leaves the
    /// snapshot stale until the next refresh.
    async fn refresh_after_mutation(&mut self, backend: &dyn BackendApi, session: &Session) {
        if let Err(err) = self.refresh(backend, session).await {
            tracing::warn!(kind = %self.kind, error = %err, "watchlist refetch after mutation failed");
        }
    }
}
