//! The single source of truth for story state.
//!
//! Every change goes through [`StoryStore::apply`], which serializes
//! mutations, discards writes from superseded sessions, notifies observers
//! and persists the result.

use derive_getters::Getters;
use heroes_core::{Page, PageStatus, PageUpdate, Persona, SavedStory, StoryConfig};
use heroes_error::{HeroesResult, TransportErrorKind};
use heroes_interface::{StoryObserver, StoryPersistence};
use heroes_storage::SharedStory;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Default persistence key.
pub const DEFAULT_SAVE_KEY: &str = "infinite_heroes_save_v1";

/// Snapshot of a story in progress.
#[derive(Debug, Clone, Getters)]
pub struct StoryState {
    /// Current story session
    session: Uuid,
    /// Protagonist
    hero: Option<Persona>,
    /// Co-star, if established
    costar: Option<Persona>,
    /// Story configuration
    config: StoryConfig,
    /// History
    pages: Vec<Page>,
    /// Reading position
    current_sheet: usize,
    /// Whether a story has been launched
    started: bool,
    /// Share token being replayed
    replay: Option<Arc<SharedStory>>,
}

impl Default for StoryState {
    fn default() -> Self {
        Self {
            session: Uuid::new_v4(),
            hero: None,
            costar: None,
            config: StoryConfig::default(),
            pages: Vec::new(),
            current_sheet: 0,
            started: false,
            replay: None,
        }
    }
}

impl StoryState {
    /// Page with a given number.
    pub fn page(&self, index: u32) -> Option<&Page> {
        self.pages.iter().find(|page| *page.index() == index)
    }

    /// History sorted by page number.
    pub fn sorted_pages(&self) -> Vec<Page> {
        let mut pages = self.pages.clone();
        pages.sort_by_key(|page| *page.index());
        pages
    }

    /// Highest page number in the history.
    pub fn max_index(&self) -> Option<u32> {
        self.pages.iter().map(|page| *page.index()).max()
    }

    /// Whether a share token is being replayed.
    pub fn is_replay(&self) -> bool {
        self.replay.is_some()
    }

    /// Persistable snapshot.
    pub fn to_saved(&self) -> SavedStory {
        SavedStory::new(
            self.hero.clone(),
            self.costar.clone(),
            self.config.clone(),
            self.sorted_pages(),
            self.current_sheet,
        )
    }

    fn start_session(&mut self) -> Uuid {
        self.session = Uuid::new_v4();
        self.pages.clear();
        self.current_sheet = 0;
        self.session
    }
}

/// A change to the story state.
#[derive(Debug, Clone)]
pub enum StoryMutation {
    /// Abandon the story, keeping the personas
    Reset,
    /// Start a fresh story
    Begin {
        /// Protagonist
        hero: Persona,
        /// Co-star supplied up front
        costar: Option<Persona>,
        /// Configuration with the tone already chosen
        config: StoryConfig,
    },
    /// Resume a saved story
    Restore(SavedStory),
    /// Prepare to replay a shared story
    EnterReplay(Arc<SharedStory>),
    /// Add placeholder pages
    AppendPages {
        /// Session that scheduled the pages
        session: Uuid,
        /// New pages
        pages: Vec<Page>,
    },
    /// Change one page
    UpdatePage {
        /// Session that produced the update
        session: Uuid,
        /// Page id
        id: String,
        /// Fields to change
        update: PageUpdate,
    },
    /// Commit a reader choice, unless one is already committed
    ResolveChoice {
        /// Session the reader is in
        session: Uuid,
        /// Page number
        page: u32,
        /// Chosen option
        choice: String,
    },
    /// Establish the co-star
    InstallCostar {
        /// Session that synthesized the co-star
        session: Uuid,
        /// The co-star
        costar: Persona,
    },
    /// Record the reading position
    SetReadingPosition {
        /// Session the reader is in
        session: Uuid,
        /// Sheet index
        sheet: usize,
    },
}

impl StoryMutation {
    fn session(&self) -> Option<Uuid> {
        match self {
            StoryMutation::AppendPages { session, .. }
            | StoryMutation::UpdatePage { session, .. }
            | StoryMutation::ResolveChoice { session, .. }
            | StoryMutation::InstallCostar { session, .. }
            | StoryMutation::SetReadingPosition { session, .. } => Some(*session),
            _ => None,
        }
    }
}

/// Result of [`StoryStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation took effect in this session
    Applied {
        /// Session after the mutation
        session: Uuid,
    },
    /// The mutation targeted a stale session or a missing page
    Discarded,
}

impl MutationOutcome {
    /// Whether the mutation took effect.
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }
}

enum Persist {
    Save,
    Clear,
}

/// Shared handle to the story state.
#[derive(Clone)]
pub struct StoryStore {
    state: Arc<Mutex<StoryState>>,
    persistence: Option<Arc<dyn StoryPersistence>>,
    observers: Vec<Arc<dyn StoryObserver>>,
    save_key: String,
}

impl std::fmt::Debug for StoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryStore")
            .field("save_key", &self.save_key)
            .field("persistent", &self.persistence.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for StoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_KEY)
    }
}

impl StoryStore {
    /// Create an empty, unpersisted store.
    pub fn new(save_key: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoryState::default())),
            persistence: None,
            observers: Vec::new(),
            save_key: save_key.into(),
        }
    }

    /// Persist snapshots through `persistence`.
    pub fn with_persistence(mut self, persistence: Arc<dyn StoryPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Notify `observer` of every change.
    pub fn with_observer(mut self, observer: Arc<dyn StoryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Persistence key.
    pub fn save_key(&self) -> &str {
        &self.save_key
    }

    /// Read the current state.
    pub async fn read<T>(&self, f: impl FnOnce(&StoryState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> StoryState {
        self.state.lock().await.clone()
    }

    /// Current session id.
    pub async fn session(&self) -> Uuid {
        self.state.lock().await.session
    }

    /// Surface a credential failure to observers.
    pub fn notify_reauth(&self, kind: TransportErrorKind, message: &str) {
        warn!(%kind, message, "Generation credentials rejected");
        for observer in &self.observers {
            observer.reauth_required(kind, message);
        }
    }

    /// Load the saved snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the persistence backend fails.
    pub async fn load_saved(&self) -> HeroesResult<Option<SavedStory>> {
        match &self.persistence {
            Some(persistence) => persistence.load(&self.save_key).await,
            None => Ok(None),
        }
    }

    /// Apply one mutation.
    ///
    /// Session-scoped mutations from a superseded session, and updates to
    /// pages that are not in the history, are discarded.
    #[instrument(skip(self, mutation))]
    pub async fn apply(&self, mutation: StoryMutation) -> MutationOutcome {
        let mut state = self.state.lock().await;

        if let Some(stale) = mutation.session().filter(|session| *session != state.session) {
            warn!(
                stale = %stale,
                current = %state.session,
                "Discarding mutation from superseded session"
            );
            return MutationOutcome::Discarded;
        }

        let persist = match mutation {
            StoryMutation::Reset => {
                let session = state.start_session();
                state.started = false;
                state.replay = None;
                info!(%session, "Story reset");
                for observer in &self.observers {
                    observer.story_reset();
                }
                Persist::Clear
            }
            StoryMutation::Begin {
                hero,
                costar,
                config,
            } => {
                let session = state.start_session();
                state.hero = Some(hero);
                state.costar = costar;
                state.config = config;
                state.started = true;
                info!(
                    %session,
                    genre = %state.config.genre(),
                    replay = state.is_replay(),
                    "Story started"
                );
                Persist::Save
            }
            StoryMutation::Restore(saved) => {
                let session = state.start_session();
                let (hero, costar, config, mut pages, current_sheet) = saved.into_parts();
                for page in pages.iter_mut().filter(|page| page.is_loading()) {
                    page.apply(PageUpdate::default().with_status(PageStatus::Failed));
                }
                state.hero = hero;
                state.costar = costar;
                state.config = config;
                state.pages = pages;
                state.current_sheet = current_sheet;
                state.started = true;
                state.replay = None;
                info!(%session, pages = state.pages.len(), "Story restored");
                Persist::Save
            }
            StoryMutation::EnterReplay(shared) => {
                let session = state.start_session();
                state.config = shared.config();
                state.started = false;
                info!(%session, beats = shared.beats.len(), "Entered replay");
                state.replay = Some(shared);
                Persist::Clear
            }
            StoryMutation::AppendPages { pages, .. } => {
                for page in pages {
                    if state.pages.iter().any(|existing| existing.id() == page.id()) {
                        continue;
                    }
                    for observer in &self.observers {
                        observer.page_updated(&page);
                    }
                    state.pages.push(page);
                }
                Persist::Save
            }
            StoryMutation::UpdatePage { id, update, .. } => {
                let Some(page) = state.pages.iter_mut().find(|page| *page.id() == id) else {
                    warn!(page = %id, "Discarding update for page not in history");
                    return MutationOutcome::Discarded;
                };
                page.apply(update);
                debug!(page = %id, status = ?page.status(), "Page updated");
                for observer in &self.observers {
                    observer.page_updated(page);
                }
                Persist::Save
            }
            StoryMutation::ResolveChoice { page, choice, .. } => {
                let Some(target) = state
                    .pages
                    .iter_mut()
                    .find(|candidate| *candidate.index() == page)
                else {
                    return MutationOutcome::Discarded;
                };
                if target.resolved_choice().is_some() {
                    debug!(page, "Choice already resolved");
                    return MutationOutcome::Discarded;
                }
                target.apply(PageUpdate::default().with_resolved_choice(choice));
                info!(page, choice = ?target.resolved_choice(), "Choice resolved");
                for observer in &self.observers {
                    observer.page_updated(target);
                }
                Persist::Save
            }
            StoryMutation::InstallCostar { costar, .. } => {
                info!(name = %costar.name(), "Co-star introduced");
                for observer in &self.observers {
                    observer.costar_introduced(&costar);
                }
                state.costar = Some(costar);
                Persist::Save
            }
            StoryMutation::SetReadingPosition { sheet, .. } => {
                state.current_sheet = sheet;
                Persist::Save
            }
        };

        self.persist(&state, persist).await;
        MutationOutcome::Applied {
            session: state.session,
        }
    }

    async fn persist(&self, state: &StoryState, persist: Persist) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let result = match persist {
            Persist::Save if state.started && !state.is_replay() => {
                persistence.save(&self.save_key, &state.to_saved()).await
            }
            Persist::Clear => persistence.clear(&self.save_key).await,
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, key = %self.save_key, "Failed to persist story");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroes_core::{ImageData, StoryLayout};
    use heroes_storage::InMemoryStateStore;

    fn hero() -> Persona {
        Persona::new("Aria", "", ImageData::new("image/png", "AA"))
    }

    #[tokio::test]
    async fn test_stale_session_mutation_is_discarded() {
        let store = StoryStore::default();
        let outcome = store
            .apply(StoryMutation::Begin {
                hero: hero(),
                costar: None,
                config: StoryConfig::default(),
            })
            .await;
        let MutationOutcome::Applied { session: old } = outcome else {
            panic!("begin should apply");
        };

        store.apply(StoryMutation::Reset).await;
        let outcome = store
            .apply(StoryMutation::AppendPages {
                session: old,
                pages: vec![Page::placeholder(0, &StoryLayout::default())],
            })
            .await;

        assert_eq!(outcome, MutationOutcome::Discarded);
        assert!(store.read(|s| s.pages().is_empty()).await);
    }

    #[tokio::test]
    async fn test_saves_while_started_and_clears_on_reset() {
        let memory = InMemoryStateStore::new();
        let store = StoryStore::new("slot").with_persistence(Arc::new(memory.clone()));

        store
            .apply(StoryMutation::Begin {
                hero: hero(),
                costar: None,
                config: StoryConfig::default(),
            })
            .await;
        let session = store.session().await;
        store
            .apply(StoryMutation::AppendPages {
                session,
                pages: vec![Page::placeholder(1, &StoryLayout::default())],
            })
            .await;

        let saved = memory.get("slot").unwrap();
        assert_eq!(saved.pages().len(), 1);
        assert_eq!(saved.hero().as_ref().unwrap().name(), "Aria");

        store.apply(StoryMutation::Reset).await;
        assert!(memory.get("slot").is_none());
        assert!(store.read(|s| s.hero().is_some()).await);
    }

    #[tokio::test]
    async fn test_restore_fails_interrupted_pages() {
        let layout = StoryLayout::default();
        let mut loading = Page::placeholder(2, &layout);
        loading.apply(PageUpdate::default().with_status(PageStatus::GeneratingImage));
        let mut ready = Page::placeholder(1, &layout);
        ready.apply(PageUpdate::default().with_status(PageStatus::Ready));
        let saved = SavedStory::new(
            Some(hero()),
            None,
            StoryConfig::default(),
            vec![ready, loading],
            2,
        );

        let store = StoryStore::default();
        store.apply(StoryMutation::Restore(saved)).await;

        let state = store.snapshot().await;
        assert_eq!(state.page(1).unwrap().status(), &PageStatus::Ready);
        assert_eq!(state.page(2).unwrap().status(), &PageStatus::Failed);
        assert_eq!(*state.current_sheet(), 2);
        assert!(*state.started());
    }

    #[tokio::test]
    async fn test_update_for_unknown_page_is_discarded() {
        let store = StoryStore::default();
        let session = store.session().await;
        let outcome = store
            .apply(StoryMutation::UpdatePage {
                session,
                id: "page-9".to_string(),
                update: PageUpdate::default().with_status(PageStatus::Ready),
            })
            .await;
        assert!(!outcome.is_applied());
    }
}
