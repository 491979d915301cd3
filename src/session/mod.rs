//! Per-session state.
//!
//! Each signed-in browser session owns a [`SessionContext`] holding the
//! scan results, the contact cache, the current selections, and the send
//! log. Contexts live only in memory: they are dropped at logout and
//! reaped after the idle timeout. Nothing is ever written to disk.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    CompanyCandidate, CompanyDomain, ContactInfo, RequestSelection, SendLogEntry, SessionId,
    UserProfile,
};

/// Mutable state for one browser session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// The signed-in user.
    pub profile: UserProfile,
    /// Companies detected so far, deduplicated by domain.
    candidates: Vec<CompanyCandidate>,
    /// Discovered contacts, at most one per domain.
    contacts: HashMap<CompanyDomain, ContactInfo>,
    /// Requests the user has queued.
    selections: Vec<RequestSelection>,
    /// Append-only log of send attempts.
    send_log: Vec<SendLogEntry>,
    /// Last time a handler touched this session.
    last_active: DateTime<Utc>,
}

impl SessionContext {
    /// Creates an empty context for a signed-in user.
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            candidates: Vec::new(),
            contacts: HashMap::new(),
            selections: Vec::new(),
            send_log: Vec::new(),
            last_active: Utc::now(),
        }
    }

    /// Merges newly detected candidates into the session, deduplicating by
    /// domain. Re-scanning the same date range therefore yields the same
    /// candidate set.
    pub fn merge_candidates(&mut self, detected: Vec<CompanyCandidate>) {
        for candidate in detected {
            match self
                .candidates
                .iter_mut()
                .find(|c| c.domain == candidate.domain)
            {
                Some(existing) => existing.merge(candidate),
                None => self.candidates.push(candidate),
            }
        }
    }

    /// All candidates detected in this session.
    pub fn candidates(&self) -> &[CompanyCandidate] {
        &self.candidates
    }

    /// Caches a discovered contact.
    ///
    /// The first discovery for a domain wins; later calls for the same
    /// domain are ignored, keeping the at-most-one-per-domain invariant.
    pub fn cache_contact(&mut self, contact: ContactInfo) {
        self.contacts.entry(contact.domain.clone()).or_insert(contact);
    }

    /// The cached contact for a domain, if discovery has found one.
    pub fn contact(&self, domain: &CompanyDomain) -> Option<&ContactInfo> {
        self.contacts.get(domain)
    }

    /// All cached contacts.
    pub fn contacts(&self) -> &HashMap<CompanyDomain, ContactInfo> {
        &self.contacts
    }

    /// Adds a selection if an identical one is not already queued.
    pub fn add_selection(&mut self, selection: RequestSelection) {
        if !self.selections.contains(&selection) {
            self.selections.push(selection);
        }
    }

    /// Removes a selection.
    pub fn remove_selection(&mut self, selection: &RequestSelection) {
        self.selections.retain(|s| s != selection);
    }

    /// The queued selections, in insertion order.
    pub fn selections(&self) -> &[RequestSelection] {
        &self.selections
    }

    /// Clears all queued selections (after a bulk send).
    pub fn clear_selections(&mut self) {
        self.selections.clear();
    }

    /// Appends entries to the send log.
    pub fn append_send_log(&mut self, entries: Vec<SendLogEntry>) {
        self.send_log.extend(entries);
    }

    /// The session's send log, oldest first.
    pub fn send_log(&self) -> &[SendLogEntry] {
        &self.send_log
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn is_idle(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_active > timeout
    }
}

/// In-memory store of live sessions, keyed by the cookie's session ID.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<RwLock<SessionContext>>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Creates a store with the given idle timeout in seconds.
    pub fn new(idle_timeout_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::seconds(idle_timeout_secs as i64),
        }
    }

    /// Returns the context for a session, creating it on first access.
    ///
    /// Touches the session's activity timestamp and reaps any sessions
    /// that have sat idle past the timeout. Reaping happens lazily here
    /// rather than on a background task; a request is the only thing that
    /// can observe a session anyway.
    pub async fn get_or_create(
        &self,
        session_id: &SessionId,
        profile: &UserProfile,
    ) -> Arc<RwLock<SessionContext>> {
        self.reap_idle().await;

        let mut sessions = self.sessions.write().await;
        let context = sessions
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(RwLock::new(SessionContext::new(profile.clone()))))
            .clone();
        drop(sessions);

        context.write().await.touch();
        context
    }

    /// Drops a session's state entirely (logout).
    pub async fn remove(&self, session_id: &SessionId) {
        self.sessions.write().await.remove(session_id);
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn reap_idle(&self) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        let mut keep = HashMap::new();
        for (id, context) in sessions.drain() {
            let idle = context.read().await.is_idle(self.idle_timeout, now);
            if !idle {
                keep.insert(id, context);
            }
        }
        let reaped = before - keep.len();
        *sessions = keep;

        if reaped > 0 {
            tracing::debug!(reaped, "reaped idle sessions");
        }
    }
}
