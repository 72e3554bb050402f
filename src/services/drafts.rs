//! Open product drafts, one per browser session.
//!
//! The session cookie only carries a random key; the draft itself stays in
//! process memory so long descriptions and image lists do not hit cookie
//! size limits. Drafts left idle longer than the store's timeout are dropped.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::draft::ProductDraft;

const KEY_LEN: usize = 24;

/// Idle time after which an abandoned draft is discarded.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug)]
struct StoredDraft {
    draft: ProductDraft,
    touched: Instant,
}

#[derive(Debug)]
pub struct DraftStore {
    idle_timeout: Duration,
    drafts: Mutex<HashMap<String, StoredDraft>>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl DraftStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            drafts: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh key for a session that has no draft yet.
    pub fn new_key() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(KEY_LEN)
            .map(char::from)
            .collect()
    }

    fn is_idle(&self, stored: &StoredDraft, now: Instant) -> bool {
        now.saturating_duration_since(stored.touched) > self.idle_timeout
    }

    pub fn get(&self, key: &str) -> Option<ProductDraft> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<ProductDraft> {
        let mut drafts = self.drafts.lock();
        let idle = self.is_idle(drafts.get(key)?, now);
        if idle {
            drafts.remove(key);
            return None;
        }
        drafts.get_mut(key).map(|stored| {
            stored.touched = now;
            stored.draft.clone()
        })
    }

    /// Replaces the draft stored under `key` and drops idle drafts.
    pub fn put(&self, key: &str, draft: ProductDraft) {
        self.put_at(key, draft, Instant::now());
    }

    fn put_at(&self, key: &str, draft: ProductDraft, now: Instant) {
        let mut drafts = self.drafts.lock();
        let before = drafts.len();
        drafts.retain(|_, stored| !self.is_idle(stored, now));
        let evicted = before - drafts.len();
        if evicted > 0 {
            log::info!("Discarded {evicted} idle product draft(s)");
        }
        drafts.insert(
            key.to_string(),
            StoredDraft {
                draft,
                touched: now,
            },
        );
    }

    /// Applies `change` to the current draft under `key` and stores the result.
    ///
    /// The store stays locked while `change` runs, so edits saved in the
    /// meantime are never lost. Returns `None` when there is no live draft.
    pub fn update<E>(
        &self,
        key: &str,
        change: impl FnOnce(ProductDraft) -> Result<ProductDraft, E>,
    ) -> Option<Result<ProductDraft, E>> {
        let now = Instant::now();
        let mut drafts = self.drafts.lock();
        let stored = drafts
            .get_mut(key)
            .filter(|stored| !self.is_idle(stored, now))?;

        let result = change(stored.draft.clone());
        if let Ok(draft) = &result {
            stored.draft = draft.clone();
            stored.touched = now;
        }
        Some(result)
    }

    pub fn remove(&self, key: &str) -> Option<ProductDraft> {
        self.drafts.lock().remove(key).map(|stored| stored.draft)
    }

    pub fn len(&self) -> usize {
        self.drafts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::{DraftAction, DraftField};

    fn named(name: &str) -> ProductDraft {
        ProductDraft::new()
            .apply(DraftAction::SetField(DraftField::Name, name.into()))
            .unwrap()
    }

    #[test]
    fn drafts_are_isolated_per_key() {
        let store = DraftStore::default();
        let first = DraftStore::new_key();
        let second = DraftStore::new_key();
        assert_ne!(first, second);

        let draft = named("Grip");
        store.put(&first, draft.clone());

        assert_eq!(store.get(&first), Some(draft));
        assert_eq!(store.get(&second), None);

        store.remove(&first);
        assert_eq!(store.get(&first), None);
        assert!(store.is_empty());
    }

    #[test]
    fn abandoned_draft_is_evicted_on_next_put() {
        let store = DraftStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store.put_at("abandoned", named("Grip"), start);
        store.put_at("active", named("Shoe"), start + Duration::from_secs(30));

        store.put_at("new", named("Ball"), start + Duration::from_secs(61));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_at("abandoned", start + Duration::from_secs(61)), None);
        assert!(
            store
                .get_at("active", start + Duration::from_secs(61))
                .is_some()
        );
    }

    #[test]
    fn reading_a_draft_keeps_it_alive() {
        let store = DraftStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store.put_at("open", named("Grip"), start);

        assert!(store.get_at("open", start + Duration::from_secs(50)).is_some());
        store.put_at("other", named("Ball"), start + Duration::from_secs(100));

        assert!(store.get_at("open", start + Duration::from_secs(100)).is_some());
    }

    #[test]
    fn idle_draft_is_gone_when_read() {
        let store = DraftStore::new(Duration::from_secs(60));
        let start = Instant::now();
        store.put_at("open", named("Grip"), start);

        assert_eq!(store.get_at("open", start + Duration::from_secs(120)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn update_changes_the_latest_draft_only_on_success() {
        let store = DraftStore::default();
        store.put("open", named("Grip"));

        let failed: Option<Result<ProductDraft, &str>> = store.update("open", |_| Err("nope"));
        assert_eq!(failed, Some(Err("nope")));
        assert_eq!(store.get("open"), Some(named("Grip")));

        let updated = store.update("open", |draft| {
            draft.apply(DraftAction::SetField(DraftField::Name, "Tape".into()))
        });
        assert!(matches!(updated, Some(Ok(_))));
        assert_eq!(store.get("open"), Some(named("Tape")));

        assert!(store.update("missing", |d| Ok::<_, ()>(d)).is_none());
    }
}
