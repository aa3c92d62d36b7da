//! Page numbers currently being generated.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
struct InFlightState {
    session: Uuid,
    pages: BTreeSet<u32>,
}

/// Shared set of page numbers with generation in progress.
///
/// Entries belong to a story session. Starting a new session clears the set,
/// and guards from an older session never touch the new one.
#[derive(Debug, Clone)]
pub struct InFlightPages {
    state: Arc<Mutex<InFlightState>>,
}

impl Default for InFlightPages {
    fn default() -> Self {
        Self::new(Uuid::nil())
    }
}

impl InFlightPages {
    /// Empty set for `session`.
    pub fn new(session: Uuid) -> Self {
        Self {
            state: Arc::new(Mutex::new(InFlightState {
                session,
                pages: BTreeSet::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InFlightState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clear the set and bind it to `session`.
    pub fn reset(&self, session: Uuid) {
        let mut state = self.lock();
        state.session = session;
        state.pages.clear();
    }

    /// Claim every page in `pages` that is not already claimed.
    ///
    /// Returns one guard per newly claimed page. Nothing is claimed when
    /// `session` is not the current session.
    pub fn admit(&self, session: Uuid, pages: impl IntoIterator<Item = u32>) -> Vec<InFlightGuard> {
        let mut state = self.lock();
        if state.session != session {
            debug!(%session, current = %state.session, "Ignoring admission for stale session");
            return Vec::new();
        }
        pages
            .into_iter()
            .filter(|page| state.pages.insert(*page))
            .map(|page| InFlightGuard {
                pages: self.clone(),
                session,
                page,
            })
            .collect()
    }

    /// Whether `page` is claimed.
    pub fn contains(&self, page: u32) -> bool {
        self.lock().pages.contains(&page)
    }

    /// Claimed pages in ascending order.
    pub fn snapshot(&self) -> Vec<u32> {
        self.lock().pages.iter().copied().collect()
    }

    /// Number of claimed pages.
    pub fn len(&self) -> usize {
        self.lock().pages.len()
    }

    /// Whether no page is claimed.
    pub fn is_empty(&self) -> bool {
        self.lock().pages.is_empty()
    }

    fn release(&self, session: Uuid, page: u32) {
        let mut state = self.lock();
        if state.session == session {
            state.pages.remove(&page);
        }
    }
}

/// Claim on one page; released on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    pages: InFlightPages,
    session: Uuid,
    page: u32,
}

impl InFlightGuard {
    /// The claimed page number.
    pub fn page(&self) -> u32 {
        self.page
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.pages.release(self.session, self.page);
    }
}
