// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Registry for tracking concurrent voice agent sessions.
//!
//! One agent process typically serves many rooms at once; the registry maps
//! each room to its [`SessionRecord`] and answers lookups by room or by user
//! identity. It also keeps a greeting ledger per user so a reconnecting user
//! is not greeted again within a configurable interval. The ledger outlives
//! session records on purpose: leaving a room and coming straight back does
//! not earn a second greeting.
//!
//! [`SessionRegistry`] is a cheap cloneable handle over shared state. There
//! is no process-global instance; construct one registry and pass clones to
//! whoever needs access.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use downcast_rs::{impl_downcast, DowncastSync};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::utils::helpers::format_timestamp;

// ---------------------------------------------------------------------------
// Session records
// ---------------------------------------------------------------------------

/// Marker trait for live objects attached to a session record.
///
/// Session and agent attachments are stored type-erased so the registry does
/// not depend on any particular agent implementation; downcast to recover
/// the concrete type.
pub trait SessionHandle: DowncastSync + Send + Sync {}
impl_downcast!(sync SessionHandle);

/// Information about one active session.
#[derive(Clone)]
pub struct SessionRecord {
    /// Room the session is bound to. Also the registry key.
    pub room_name: String,
    /// Stable identity of the connected user.
    pub user_identity: String,
    /// Display name of the connected user.
    pub user_name: String,
    /// When the record was created.
    pub created_at: SystemTime,
    /// Attached live session object, if any.
    pub session_handle: Option<Arc<dyn SessionHandle>>,
    /// Attached agent object, if any.
    pub agent_handle: Option<Arc<dyn SessionHandle>>,
    /// Free-form metadata carried with the record.
    pub metadata: HashMap<String, Value>,
}

impl SessionRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        room_name: impl Into<String>,
        user_identity: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            room_name: room_name.into(),
            user_identity: user_identity.into(),
            user_name: user_name.into(),
            created_at: SystemTime::now(),
            session_handle: None,
            agent_handle: None,
            metadata: HashMap::new(),
        }
    }

    /// Builder method: attach a live session object.
    pub fn with_session_handle(mut self, handle: Arc<dyn SessionHandle>) -> Self {
        self.session_handle = Some(handle);
        self
    }

    /// Builder method: attach a live agent object.
    pub fn with_agent_handle(mut self, handle: Arc<dyn SessionHandle>) -> Self {
        self.agent_handle = Some(handle);
        self
    }

    /// Builder method: set the metadata map.
    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Seconds elapsed since the record was created.
    ///
    /// Returns `0.0` if the clock has gone backwards.
    pub fn duration_seconds(&self) -> f64 {
        self.created_at
            .elapsed()
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("room_name", &self.room_name)
            .field("user_identity", &self.user_identity)
            .field("user_name", &self.user_name)
            .field("created_at", &self.created_at)
            .field("has_session_handle", &self.session_handle.is_some())
            .field("has_agent_handle", &self.agent_handle.is_some())
            .field("metadata", &self.metadata)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Serializable snapshot
// ---------------------------------------------------------------------------

/// Serializable view of one session record.
///
/// Live handles are deliberately absent; this is what status endpoints
/// return.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub room_name: String,
    pub user_identity: String,
    pub user_name: String,
    pub created_at: String,
    pub duration_seconds: f64,
    pub metadata: HashMap<String, Value>,
}

/// Serializable view of the whole registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub active_sessions: usize,
    pub sessions: Vec<SessionSnapshot>,
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryInner {
    /// Active sessions keyed by room name.
    sessions: HashMap<String, SessionRecord>,
    /// When each user identity was last greeted.
    greeting_times: HashMap<String, SystemTime>,
}

/// Cloneable handle to a shared session registry.
///
/// All clones observe the same state; cloning is an `Arc` bump.
///
/// # Example
///
/// ```rust,no_run
/// use voicebridge::session::{SessionRecord, SessionRegistry};
///
/// # async fn example() {
/// let registry = SessionRegistry::new();
/// registry
///     .register(SessionRecord::new("room-1", "user-1", "Ada"))
///     .await;
/// # }
/// ```
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl SessionRegistry {
    /// Minimum time between greetings for the same user.
    pub const DEFAULT_GREETING_INTERVAL: Duration = Duration::from_secs(3600);

    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, returning the stored record.
    ///
    /// A record already registered for the same room is replaced silently;
    /// reconnects overwrite rather than error.
    pub async fn register(&self, record: SessionRecord) -> SessionRecord {
        let mut inner = self.inner.lock().await;
        info!(
            "Registered session for room '{}' (user: {})",
            record.room_name, record.user_name,
        );
        inner
            .sessions
            .insert(record.room_name.clone(), record.clone());
        record
    }

    /// Remove a session by room name and return its record.
    ///
    /// Unregistering a room that is not present is not an error.
    pub async fn unregister(&self, room_name: &str) -> Option<SessionRecord> {
        let mut inner = self.inner.lock().await;
        let record = inner.sessions.remove(room_name);
        if let Some(ref record) = record {
            info!(
                "Unregistered session for room '{}' (duration: {:.1}s)",
                room_name,
                record.duration_seconds(),
            );
        }
        record
    }

    /// Look up a session by room name.
    pub async fn get(&self, room_name: &str) -> Option<SessionRecord> {
        let inner = self.inner.lock().await;
        inner.sessions.get(room_name).cloned()
    }

    /// Look up a session by user identity.
    ///
    /// When the same identity is somehow present in several rooms, an
    /// arbitrary one of them is returned.
    pub async fn get_by_user(&self, user_identity: &str) -> Option<SessionRecord> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .values()
            .find(|record| record.user_identity == user_identity)
            .cloned()
    }

    /// All active sessions, in no particular order.
    pub async fn list_sessions(&self) -> Vec<SessionRecord> {
        let inner = self.inner.lock().await;
        inner.sessions.values().cloned().collect()
    }

    /// Number of active sessions.
    pub async fn active_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.sessions.len()
    }

    /// Serializable view of the registry for status endpoints.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let inner = self.inner.lock().await;
        let sessions = inner
            .sessions
            .values()
            .map(|record| SessionSnapshot {
                room_name: record.room_name.clone(),
                user_identity: record.user_identity.clone(),
                user_name: record.user_name.clone(),
                created_at: format_timestamp(record.created_at),
                duration_seconds: record.duration_seconds(),
                metadata: record.metadata.clone(),
            })
            .collect();
        RegistrySnapshot {
            active_sessions: inner.sessions.len(),
            sessions,
        }
    }

    /// Whether a greeting should be sent for this user.
    ///
    /// True when the user has never been greeted or when at least
    /// `min_interval` has passed since the last recorded greeting.
    pub async fn should_greet(&self, user_identity: &str, min_interval: Duration) -> bool {
        let inner = self.inner.lock().await;
        match inner.greeting_times.get(user_identity) {
            None => true,
            Some(last) => last
                .elapsed()
                .map(|elapsed| elapsed >= min_interval)
                .unwrap_or(false),
        }
    }

    /// Record that a greeting was sent for this user.
    pub async fn record_greeting(&self, user_identity: &str) {
        let mut inner = self.inner.lock().await;
        inner
            .greeting_times
            .insert(user_identity.to_string(), SystemTime::now());
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeAgent {
        name: String,
    }

    impl SessionHandle for FakeAgent {}

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;

        let record = registry.get("room-1").await.unwrap();
        assert_eq!(record.user_identity, "user-1");
        assert_eq!(record.user_name, "Ada");
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_room() {
        let registry = SessionRegistry::new();
        assert!(registry.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_same_room() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;
        registry
            .register(SessionRecord::new("room-1", "user-2", "Grace"))
            .await;

        assert_eq!(registry.active_count().await, 1);
        let record = registry.get("room-1").await.unwrap();
        assert_eq!(record.user_identity, "user-2");
    }

    #[tokio::test]
    async fn test_unregister_returns_record_then_absent() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;

        let removed = registry.unregister("room-1").await.unwrap();
        assert_eq!(removed.room_name, "room-1");
        assert!(registry.get("room-1").await.is_none());
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_unknown_room_is_noop() {
        let registry = SessionRegistry::new();
        assert!(registry.unregister("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_get_by_user() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;
        registry
            .register(SessionRecord::new("room-2", "user-2", "Grace"))
            .await;

        let record = registry.get_by_user("user-2").await.unwrap();
        assert_eq!(record.room_name, "room-2");
        assert!(registry.get_by_user("user-3").await.is_none());
    }

    #[tokio::test]
    async fn test_list_sessions() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;
        registry
            .register(SessionRecord::new("room-2", "user-2", "Grace"))
            .await;

        let sessions = registry.list_sessions().await;
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let registry = SessionRegistry::new();
        let clone = registry.clone();

        clone
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;
        assert!(registry.get("room-1").await.is_some());
    }

    #[tokio::test]
    async fn test_handles_roundtrip_through_downcast() {
        let registry = SessionRegistry::new();
        let agent = Arc::new(FakeAgent {
            name: "agent-1".to_string(),
        });
        registry
            .register(
                SessionRecord::new("room-1", "user-1", "Ada").with_agent_handle(agent),
            )
            .await;

        let record = registry.get("room-1").await.unwrap();
        let handle = record.agent_handle.unwrap();
        let agent = handle.downcast_ref::<FakeAgent>().unwrap();
        assert_eq!(agent.name, "agent-1");
        assert!(record.session_handle.is_none());
    }

    #[tokio::test]
    async fn test_metadata_is_kept() {
        let registry = SessionRegistry::new();
        let mut metadata = HashMap::new();
        metadata.insert("locale".to_string(), json!("en-GB"));

        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada").with_metadata(metadata))
            .await;

        let record = registry.get("room-1").await.unwrap();
        assert_eq!(record.metadata["locale"], json!("en-GB"));
    }

    #[tokio::test]
    async fn test_snapshot_shape() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.active_sessions, 1);
        assert_eq!(snapshot.sessions.len(), 1);
        assert_eq!(snapshot.sessions[0].room_name, "room-1");
        assert!(snapshot.sessions[0].duration_seconds >= 0.0);
        assert!(snapshot.sessions[0].created_at.ends_with('Z'));

        let rendered = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(rendered["active_sessions"], 1);
        assert!(rendered["sessions"][0]["metadata"].is_object());
    }

    #[tokio::test]
    async fn test_should_greet_unknown_user() {
        let registry = SessionRegistry::new();
        assert!(
            registry
                .should_greet("user-1", SessionRegistry::DEFAULT_GREETING_INTERVAL)
                .await
        );
    }

    #[tokio::test]
    async fn test_greeting_suppressed_within_interval() {
        let registry = SessionRegistry::new();
        registry.record_greeting("user-1").await;

        assert!(
            !registry
                .should_greet("user-1", SessionRegistry::DEFAULT_GREETING_INTERVAL)
                .await
        );
        // A zero interval always allows another greeting.
        assert!(registry.should_greet("user-1", Duration::ZERO).await);
    }

    #[tokio::test]
    async fn test_greeting_ledger_survives_unregister() {
        let registry = SessionRegistry::new();
        registry
            .register(SessionRecord::new("room-1", "user-1", "Ada"))
            .await;
        registry.record_greeting("user-1").await;
        registry.unregister("room-1").await;

        assert!(
            !registry
                .should_greet("user-1", SessionRegistry::DEFAULT_GREETING_INTERVAL)
                .await
        );
    }

    #[test]
    fn test_record_duration_is_non_negative() {
        let record = SessionRecord::new("room-1", "user-1", "Ada");
        assert!(record.duration_seconds() >= 0.0);
    }

    #[test]
    fn test_record_debug_hides_handles() {
        let record = SessionRecord::new("room-1", "user-1", "Ada")
            .with_session_handle(Arc::new(FakeAgent {
                name: "s".to_string(),
            }));
        let rendered = format!("{record:?}");
        assert!(rendered.contains("has_session_handle: true"));
        assert!(rendered.contains("has_agent_handle: false"));
    }
}
