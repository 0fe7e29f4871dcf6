//! Typed access to the persisted session fields.
//!
//! Three keys, no schema version. A key that is missing, unreadable or does
//! not parse is reported as absent.

use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use aurora_core::ports::KeyValueStorePort;
use aurora_core::{NotificationToken, Preferences, SubscriberId};

pub const SUBSCRIBER_ID_KEY: &str = "aurora_user_id";
pub const TOKEN_KEY: &str = "aurora_fcm_token";
pub const PREFERENCES_KEY: &str = "aurora_user_data";

/// Snapshot of what the store holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSession {
    pub subscriber_id: Option<SubscriberId>,
    pub token: Option<NotificationToken>,
    pub preferences: Option<Preferences>,
}

impl PersistedSession {
    /// A previous subscription can be resumed without talking to the backend.
    pub fn has_subscription(&self) -> bool {
        self.subscriber_id.is_some() && self.preferences.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStorePort>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> PersistedSession {
        let subscriber_id = self.read(SUBSCRIBER_ID_KEY).await.and_then(SubscriberId::new);
        let token = self
            .read(TOKEN_KEY)
            .await
            .and_then(NotificationToken::from_persisted);
        let preferences = self.read(PREFERENCES_KEY).await.and_then(|raw| {
            match serde_json::from_str::<Preferences>(&raw) {
                Ok(preferences) => Some(preferences),
                Err(err) => {
                    warn!(key = PREFERENCES_KEY, error = %err, "ignoring unreadable preferences");
                    None
                }
            }
        });

        PersistedSession {
            subscriber_id,
            token,
            preferences,
        }
    }

    /// Record a completed subscription.
    pub async fn save_subscription(
        &self,
        subscriber_id: &SubscriberId,
        token: &NotificationToken,
        preferences: &Preferences,
    ) -> anyhow::Result<()> {
        self.store
            .set(SUBSCRIBER_ID_KEY, subscriber_id.as_str())
            .await
            .context("persist subscriber id")?;
        self.store
            .set(TOKEN_KEY, token.as_str())
            .await
            .context("persist notification token")?;
        self.save_preferences(preferences).await
    }

    pub async fn save_preferences(&self, preferences: &Preferences) -> anyhow::Result<()> {
        let json = serde_json::to_string(preferences).context("serialize preferences")?;
        self.store
            .set(PREFERENCES_KEY, &json)
            .await
            .context("persist preferences")
    }

    /// Remove all three keys. Every delete is attempted; the first failure is
    /// returned.
    pub async fn clear(&self) -> anyhow::Result<()> {
        let mut first_error = None;
        for key in [SUBSCRIBER_ID_KEY, TOKEN_KEY, PREFERENCES_KEY] {
            if let Err(err) = self.store.delete(key).await {
                warn!(key, error = %err, "failed to delete persisted session key");
                first_error.get_or_insert(err.context(format!("delete {key}")));
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "treating unreadable session key as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    fn prefs() -> Preferences {
        Preferences {
            lat: 40.0,
            lon: -105.0,
            radius_km: 250,
            threshold: 15,
        }
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let store = SessionStore::new(Arc::new(MemoryStore::default()));
        let loaded = store.load().await;
        assert_eq!(loaded, PersistedSession::default());
        assert!(!loaded.has_subscription());
    }

    #[tokio::test]
    async fn save_subscription_writes_all_three_keys() {
        let backend = Arc::new(MemoryStore::default());
        let store = SessionStore::new(backend.clone());

        store
            .save_subscription(
                &SubscriberId::new("abc").unwrap(),
                &NotificationToken::delivered("tok"),
                &prefs(),
            )
            .await
            .unwrap();

        assert_eq!(backend.value(SUBSCRIBER_ID_KEY).as_deref(), Some("abc"));
        assert_eq!(backend.value(TOKEN_KEY).as_deref(), Some("tok"));
        assert!(backend
            .value(PREFERENCES_KEY)
            .unwrap()
            .contains("\"radius_km\":250"));

        let loaded = store.load().await;
        assert!(loaded.has_subscription());
        assert_eq!(loaded.preferences, Some(prefs()));
    }

    #[tokio::test]
    async fn corrupt_preferences_count_as_absent() {
        let backend = Arc::new(MemoryStore::default());
        backend.set(SUBSCRIBER_ID_KEY, "abc").await.unwrap();
        backend.set(PREFERENCES_KEY, "{not json").await.unwrap();

        let loaded = SessionStore::new(backend).load().await;

        assert_eq!(loaded.subscriber_id, SubscriberId::new("abc"));
        assert_eq!(loaded.preferences, None);
        assert!(!loaded.has_subscription());
    }

    #[tokio::test]
    async fn unreadable_store_counts_as_empty() {
        let backend = Arc::new(MemoryStore::failing_reads());
        let loaded = SessionStore::new(backend).load().await;
        assert_eq!(loaded, PersistedSession::default());
    }

    #[tokio::test]
    async fn clear_removes_every_key() {
        let backend = Arc::new(MemoryStore::default());
        let store = SessionStore::new(backend.clone());
        store
            .save_subscription(
                &SubscriberId::new("abc").unwrap(),
                &NotificationToken::degraded_at(7),
                &prefs(),
            )
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(backend.is_empty());
    }
}
