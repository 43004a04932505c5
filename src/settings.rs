/// Scoped settings persistence over the host's key/value storage
///
/// The host keeps one JSON object per scope/visibility pair and allows at most
/// [`SCOPE_BUDGET`] characters for each. [`SettingsStore`] checks that budget
/// before anything is written, so a rejected write leaves the stored object
/// untouched.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Characters available per scope/visibility pair
pub const SCOPE_BUDGET: usize = 4096;

/// Link submitted for the current card
pub const CARD_URL_KEY: &str = "url";
pub const FRUIT_KEY: &str = "fruit";
pub const VEGETABLE_KEY: &str = "vegetable";

pub const FRUITS: &[&str] = &["apple", "banana", "orange", "pear", "strawberry"];
pub const VEGETABLES: &[&str] = &["broccoli", "carrot", "pea", "spinach"];

static PREFERENCE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+$").expect("preference pattern is valid"));

/// Everything stored under one scope/visibility pair
pub type Bucket = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Organization,
    Board,
    Card,
    Member,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Organization => "organization",
            Scope::Board => "board",
            Scope::Card => "card",
            Scope::Member => "member",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Shared,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Shared => "shared",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which board and card the current iframe runs for
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostContext {
    pub board: Option<String>,
    pub card: Option<String>,
}

impl HostContext {
    pub fn for_card(board: impl Into<String>, card: impl Into<String>) -> Self {
        HostContext {
            board: Some(board.into()),
            card: Some(card.into()),
        }
    }

    pub fn for_board(board: impl Into<String>) -> Self {
        HostContext {
            board: Some(board.into()),
            card: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{scope}/{visibility} storage would hold {size} characters, over the {limit} character budget")]
    QuotaExceeded {
        scope: Scope,
        visibility: Visibility,
        size: usize,
        limit: usize,
    },

    #[error("{0} scope is not available outside a {0} context")]
    InvalidScope(Scope),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("host storage failed: {0}")]
    Host(String),

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transport to wherever the scoped key/value data actually lives
#[allow(async_fn_in_trait)]
pub trait StorageBackend {
    /// The whole object stored under `scope`/`visibility` (empty if unset)
    async fn bucket(&self, scope: Scope, visibility: Visibility) -> Result<Bucket, SettingsError>;

    async fn write(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError>;
}

/// Budget-checked access to scoped storage for one host context
pub struct SettingsStore<B> {
    backend: B,
    context: HostContext,
}

impl<B: StorageBackend> SettingsStore<B> {
    pub fn new(backend: B, context: HostContext) -> Self {
        SettingsStore { backend, context }
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Fails with `QuotaExceeded` if the serialized scope/visibility object
    /// would exceed [`SCOPE_BUDGET`]; nothing is written in that case.
    pub async fn put(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        self.check_scope(scope)?;

        let mut bucket = self.backend.bucket(scope, visibility).await?;
        bucket.insert(key.to_string(), Value::String(value.to_string()));

        // The host measures JS string length, i.e. UTF-16 code units
        let size = serde_json::to_string(&bucket)?.encode_utf16().count();
        if size > SCOPE_BUDGET {
            warn!(
                "Rejected write of {} to {}/{}: {} characters over budget",
                key,
                scope,
                visibility,
                size - SCOPE_BUDGET
            );
            return Err(SettingsError::QuotaExceeded {
                scope,
                visibility,
                size,
                limit: SCOPE_BUDGET,
            });
        }

        self.backend.write(scope, visibility, key, value).await
    }

    /// Last value stored under `key`, if any
    pub async fn get(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
    ) -> Result<Option<String>, SettingsError> {
        self.check_scope(scope)?;

        let bucket = self.backend.bucket(scope, visibility).await?;
        Ok(bucket.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn check_scope(&self, scope: Scope) -> Result<(), SettingsError> {
        if scope == Scope::Card && self.context.card.is_none() {
            warn!("Card scoped storage used without an active card");
            return Err(SettingsError::InvalidScope(scope));
        }
        Ok(())
    }
}

/// In-process storage, used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    buckets: RefCell<HashMap<(Scope, Visibility), Bucket>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    async fn bucket(&self, scope: Scope, visibility: Visibility) -> Result<Bucket, SettingsError> {
        Ok(self
            .buckets
            .borrow()
            .get(&(scope, visibility))
            .cloned()
            .unwrap_or_default())
    }

    async fn write(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        self.buckets
            .borrow_mut()
            .entry((scope, visibility))
            .or_default()
            .insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }
}

/// Remember the link a user submitted for the current card
pub async fn store_card_link<B: StorageBackend>(
    store: &SettingsStore<B>,
    url: &str,
) -> Result<(), SettingsError> {
    store
        .put(Scope::Card, Visibility::Private, CARD_URL_KEY, url.trim())
        .await
}

pub async fn stored_card_link<B: StorageBackend>(
    store: &SettingsStore<B>,
) -> Result<Option<String>, SettingsError> {
    Ok(store
        .get(Scope::Card, Visibility::Private, CARD_URL_KEY)
        .await?
        .filter(|url| !url.trim().is_empty()))
}

/// Board level choices shown in the settings popup.
///
/// `fruit` is shared with the whole board, `vegetable` is private to the
/// member. The two are unrelated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPreferences {
    pub fruit: Option<String>,
    pub vegetable: Option<String>,
}

impl BoardPreferences {
    /// Load both values; anything that is not a plain lowercase word is ignored
    pub async fn load<B: StorageBackend>(store: &SettingsStore<B>) -> Result<Self, SettingsError> {
        let fruit = store
            .get(Scope::Board, Visibility::Shared, FRUIT_KEY)
            .await?
            .filter(|v| is_preference_value(v));
        let vegetable = store
            .get(Scope::Board, Visibility::Private, VEGETABLE_KEY)
            .await?
            .filter(|v| is_preference_value(v));

        Ok(BoardPreferences { fruit, vegetable })
    }

    pub async fn save<B: StorageBackend>(&self, store: &SettingsStore<B>) -> Result<(), SettingsError> {
        if let Some(fruit) = &self.fruit {
            save_preference(store, Visibility::Shared, FRUIT_KEY, fruit).await?;
        }
        if let Some(vegetable) = &self.vegetable {
            save_preference(store, Visibility::Private, VEGETABLE_KEY, vegetable).await?;
        }
        Ok(())
    }
}

async fn save_preference<B: StorageBackend>(
    store: &SettingsStore<B>,
    visibility: Visibility,
    key: &str,
    value: &str,
) -> Result<(), SettingsError> {
    if !is_preference_value(value) {
        return Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    store.put(Scope::Board, visibility, key, value).await
}

fn is_preference_value(value: &str) -> bool {
    PREFERENCE_VALUE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn card_store() -> SettingsStore<MemoryBackend> {
        SettingsStore::new(MemoryBackend::new(), HostContext::for_card("board-1", "card-1"))
    }

    fn board_store() -> SettingsStore<MemoryBackend> {
        SettingsStore::new(MemoryBackend::new(), HostContext::for_board("board-1"))
    }

    #[test]
    fn test_get_unset_key() {
        let store = card_store();
        let value = block_on(store.get(Scope::Card, Visibility::Shared, "missing")).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_read_after_write() {
        let store = card_store();

        block_on(store.put(Scope::Card, Visibility::Private, "url", "https://youtu.be/abc")).unwrap();
        let value = block_on(store.get(Scope::Card, Visibility::Private, "url")).unwrap();

        assert_eq!(value.as_deref(), Some("https://youtu.be/abc"));
    }

    #[test]
    fn test_overwrite() {
        let store = card_store();

        block_on(store.put(Scope::Board, Visibility::Shared, "fruit", "apple")).unwrap();
        block_on(store.put(Scope::Board, Visibility::Shared, "fruit", "pear")).unwrap();

        let value = block_on(store.get(Scope::Board, Visibility::Shared, "fruit")).unwrap();
        assert_eq!(value.as_deref(), Some("pear"));
    }

    #[test]
    fn test_visibilities_are_independent() {
        let store = card_store();

        block_on(store.put(Scope::Card, Visibility::Private, "url", "private")).unwrap();
        block_on(store.put(Scope::Card, Visibility::Shared, "url", "shared")).unwrap();

        let private = block_on(store.get(Scope::Card, Visibility::Private, "url")).unwrap();
        let shared = block_on(store.get(Scope::Card, Visibility::Shared, "url")).unwrap();
        assert_eq!(private.as_deref(), Some("private"));
        assert_eq!(shared.as_deref(), Some("shared"));
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_value() {
        let store = card_store();
        block_on(store.put(Scope::Card, Visibility::Private, "url", "https://youtu.be/abc")).unwrap();

        let huge = "x".repeat(SCOPE_BUDGET);
        let result = block_on(store.put(Scope::Card, Visibility::Private, "url", &huge));

        assert!(matches!(
            result,
            Err(SettingsError::QuotaExceeded { scope: Scope::Card, visibility: Visibility::Private, limit: SCOPE_BUDGET, .. })
        ));
        let value = block_on(store.get(Scope::Card, Visibility::Private, "url")).unwrap();
        assert_eq!(value.as_deref(), Some("https://youtu.be/abc"));
    }

    #[test]
    fn test_quota_counts_whole_bucket() {
        let store = card_store();
        // {"a":"<value>"} is 8 characters of overhead
        let first = "a".repeat(SCOPE_BUDGET - 8);
        block_on(store.put(Scope::Board, Visibility::Shared, "a", &first)).unwrap();

        let result = block_on(store.put(Scope::Board, Visibility::Shared, "b", "c"));
        assert!(matches!(result, Err(SettingsError::QuotaExceeded { .. })));

        // Other visibilities have their own budget
        block_on(store.put(Scope::Board, Visibility::Private, "b", "c")).unwrap();
    }

    #[test]
    fn test_quota_boundary() {
        let store = card_store();
        let exact = "a".repeat(SCOPE_BUDGET - 8);
        assert!(block_on(store.put(Scope::Member, Visibility::Private, "a", &exact)).is_ok());

        let over = "a".repeat(SCOPE_BUDGET - 7);
        assert!(block_on(store.put(Scope::Member, Visibility::Shared, "a", &over)).is_err());
    }

    #[test]
    fn test_quota_counts_utf16_units() {
        let store = card_store();

        // Each emoji is two UTF-16 units: 3000 of them is 6008 units once wrapped
        let emoji = "\u{1F600}".repeat(3000);
        let result = block_on(store.put(Scope::Card, Visibility::Private, "a", &emoji));
        assert!(matches!(
            result,
            Err(SettingsError::QuotaExceeded { size: 6008, .. })
        ));

        let fits = "\u{1F600}".repeat((SCOPE_BUDGET - 8) / 2);
        assert!(block_on(store.put(Scope::Card, Visibility::Private, "a", &fits)).is_ok());

        let over = format!("{}x", fits);
        assert!(block_on(store.put(Scope::Card, Visibility::Shared, "a", &over)).is_err());
    }

    #[test]
    fn test_card_scope_requires_card_context() {
        let store = board_store();

        let put = block_on(store.put(Scope::Card, Visibility::Private, "url", "x"));
        assert!(matches!(put, Err(SettingsError::InvalidScope(Scope::Card))));

        let get = block_on(store.get(Scope::Card, Visibility::Shared, "url"));
        assert!(matches!(get, Err(SettingsError::InvalidScope(Scope::Card))));

        assert!(block_on(store.put(Scope::Board, Visibility::Shared, "fruit", "apple")).is_ok());
    }

    #[test]
    fn test_card_link() {
        let store = card_store();
        assert_eq!(block_on(stored_card_link(&store)).unwrap(), None);

        block_on(store_card_link(&store, "  https://youtu.be/abc ")).unwrap();
        assert_eq!(
            block_on(stored_card_link(&store)).unwrap().as_deref(),
            Some("https://youtu.be/abc")
        );
    }

    #[test]
    fn test_board_preferences_round_trip() {
        let store = board_store();
        let prefs = BoardPreferences {
            fruit: Some("banana".to_string()),
            vegetable: Some("carrot".to_string()),
        };

        block_on(prefs.save(&store)).unwrap();

        let backend = store.backend();
        let shared = block_on(backend.bucket(Scope::Board, Visibility::Shared)).unwrap();
        let private = block_on(backend.bucket(Scope::Board, Visibility::Private)).unwrap();
        assert_eq!(shared.get("fruit"), Some(&Value::String("banana".to_string())));
        assert_eq!(private.get("vegetable"), Some(&Value::String("carrot".to_string())));

        assert_eq!(block_on(BoardPreferences::load(&store)).unwrap(), prefs);
    }

    #[test]
    fn test_board_preferences_reject_invalid_values() {
        let store = board_store();
        let prefs = BoardPreferences {
            fruit: Some("<b>apple</b>".to_string()),
            vegetable: None,
        };

        let result = block_on(prefs.save(&store));
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));

        // Values written by other means are ignored on load
        block_on(store.put(Scope::Board, Visibility::Private, VEGETABLE_KEY, "Carrot!")).unwrap();
        let loaded = block_on(BoardPreferences::load(&store)).unwrap();
        assert_eq!(loaded, BoardPreferences::default());
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::Organization.to_string(), "organization");
        assert_eq!(Visibility::Shared.to_string(), "shared");
        assert_eq!(serde_json::to_string(&Scope::Card).unwrap(), "\"card\"");
    }

    #[test]
    fn test_host_context_from_json() {
        let context: HostContext = serde_json::from_str(
            r#"{"board":"b1","card":"c1","member":"m1","permissions":{}}"#,
        )
        .unwrap();
        assert_eq!(context, HostContext::for_card("b1", "c1"));

        let context: HostContext = serde_json::from_str(r#"{"board":"b1"}"#).unwrap();
        assert_eq!(context.card, None);
    }
}
