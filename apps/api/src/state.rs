use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::analysis::MatchAnalyzer;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum
/// extractors. The session lock is only ever held for short, synchronous
/// critical sections — never across an LLM call — so progress reads stay
/// responsive while a run is in flight.
#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<Session>>,
    /// Pluggable analyzer. Production: `GeminiAnalyzer`; tests script it.
    pub analyzer: Arc<dyn MatchAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn MatchAnalyzer>) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::default())),
            analyzer,
        }
    }

    pub fn session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().expect("session lock poisoned")
    }

    pub fn session_mut(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().expect("session lock poisoned")
    }
}
