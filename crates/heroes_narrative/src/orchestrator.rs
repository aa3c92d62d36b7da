//! Page orchestration.
//!
//! The orchestrator launches stories, schedules batches of pages and drives
//! each page through beat, co-star and panel generation. Batches run their
//! pages in ascending order. At launch the warm-up batch starts once the
//! opening batch has written its last beat, so the two overlap by one panel.

use crate::{
    Cast, ContextInput, InFlightGuard, InFlightPages, MutationOutcome, NarrativeContextBuilder,
    OrchestratorSettings, RandomSource, StoryGenerator, StoryMutation, StoryStore, back_cover_beat,
    fallback_beat,
};
use heroes_core::{
    Beat, COSTAR_FALLBACK_NAME, FocusChar, HERO_FALLBACK_NAME, Page, PageKind, PageStatus,
    PageUpdate, Persona, StorySetup,
};
use heroes_error::{HeroesError, HeroesResult, ValidationError, ValidationErrorKind};
use heroes_interface::GenerationDriver;
use heroes_storage::SharedStory;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How a single page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Beat and panel are in place
    Ready,
    /// Generation failed; the page is marked failed
    Failed,
    /// The session changed underneath the page
    Discarded,
}

/// A scheduled batch of pages.
#[derive(Debug)]
pub struct ScheduledBatch {
    pages: Vec<u32>,
    handle: Option<JoinHandle<Vec<u32>>>,
}

impl ScheduledBatch {
    fn empty() -> Self {
        Self {
            pages: Vec::new(),
            handle: None,
        }
    }

    /// Page numbers claimed by this batch, in processing order.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    /// Whether nothing was scheduled.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Wait for the batch; returns the pages that became ready.
    pub async fn wait(self) -> Vec<u32> {
        let Some(handle) = self.handle else {
            return Vec::new();
        };
        match handle.await {
            Ok(ready) => ready,
            Err(e) => {
                warn!(error = %e, "Batch task did not complete");
                Vec::new()
            }
        }
    }
}

/// Work started by [`PageOrchestrator::launch`].
#[derive(Debug)]
pub struct ScheduledWork {
    session: Uuid,
    handles: Vec<JoinHandle<()>>,
}

impl ScheduledWork {
    /// Session of the launched story.
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Wait for the cover and the opening batches.
    pub async fn wait(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Launch task did not complete");
            }
        }
    }
}

struct Inner<D> {
    generator: StoryGenerator<D>,
    context: NarrativeContextBuilder,
    store: StoryStore,
    in_flight: InFlightPages,
    random: Arc<dyn RandomSource>,
    settings: OrchestratorSettings,
    costar_lock: tokio::sync::Mutex<()>,
}

/// Schedules and generates pages for one story store.
pub struct PageOrchestrator<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for PageOrchestrator<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> std::fmt::Debug for PageOrchestrator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageOrchestrator")
            .field("store", &self.inner.store)
            .field("in_flight", &self.inner.in_flight.snapshot())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl<D: GenerationDriver + 'static> PageOrchestrator<D> {
    /// Create an orchestrator over `driver` and `store`.
    pub fn new(
        driver: D,
        store: StoryStore,
        settings: OrchestratorSettings,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let generator = StoryGenerator::new(
            driver,
            settings.text_model().clone(),
            settings.image_model().clone(),
        );
        let context =
            NarrativeContextBuilder::new(Arc::clone(&random), *settings.layout().max_story_pages());
        Self {
            inner: Arc::new(Inner {
                generator,
                context,
                store,
                in_flight: InFlightPages::default(),
                random,
                settings,
                costar_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// The story store.
    pub fn store(&self) -> &StoryStore {
        &self.inner.store
    }

    /// Pages currently being generated.
    pub fn in_flight(&self) -> &InFlightPages {
        &self.inner.in_flight
    }

    /// Orchestrator settings.
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.inner.settings
    }

    /// The request layer.
    pub fn generator(&self) -> &StoryGenerator<D> {
        &self.inner.generator
    }

    /// Start a new story.
    ///
    /// The cover is scheduled immediately; the opening batch follows after
    /// the launch delay and the warm-up batch once the opening batch has
    /// written its last beat. When a share token is being replayed its
    /// configuration is used instead of the setup's, and the story continues
    /// past the shared choice without waiting for the reader.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the hero is missing, or if the custom
    /// genre has no premise. Nothing is reset in that case.
    #[instrument(skip(self, setup), fields(genre = %setup.genre()))]
    pub async fn launch(&self, setup: StorySetup) -> HeroesResult<ScheduledWork> {
        let replay = self.inner.store.read(|state| state.replay().clone()).await;

        let hero = setup
            .hero()
            .clone()
            .ok_or_else(|| ValidationError::new(ValidationErrorKind::MissingHero))?;
        if replay.is_none() && setup.genre().is_custom() && setup.premise().trim().is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::MissingPremise).into());
        }

        let config = match &replay {
            Some(shared) => shared.config(),
            None => {
                let pool = setup.genre().tone_pool();
                let tone = pool
                    .get(self.inner.random.pick(pool.len()))
                    .copied()
                    .unwrap_or_default();
                setup.config_with_tone(tone)
            }
        };
        info!(tone = config.tone().label(), language = %config.language(), "Launching story");

        let outcome = self
            .inner
            .store
            .apply(StoryMutation::Begin {
                hero: hero.with_default_name(HERO_FALLBACK_NAME),
                costar: setup
                    .costar()
                    .clone()
                    .map(|costar| costar.with_default_name(COSTAR_FALLBACK_NAME)),
                config,
            })
            .await;
        let MutationOutcome::Applied { session } = outcome else {
            return Err(ValidationError::new(ValidationErrorKind::NotStarted).into());
        };
        self.inner.in_flight.reset(session);

        let cover = self.schedule_batch_for(session, 0, 1).await;
        let mut handles = Vec::new();
        if let Some(handle) = cover.handle {
            handles.push(tokio::spawn(async move {
                let _ = handle.await;
            }));
        }

        let this = self.clone();
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(*this.inner.settings.launch_delay()).await;
            if this.inner.store.session().await != session {
                debug!(%session, "Story replaced before opening batches");
                return;
            }
            let layout = this.inner.settings.layout();
            let initial = *layout.initial_batch();
            let (tail_tx, tail_rx) = oneshot::channel();
            let first = this
                .schedule_batch_with_tail(session, 1, initial, Some(tail_tx))
                .await;
            // Sender drops without a value when the last page fails
            let _ = tail_rx.await;
            let second = this
                .schedule_batch_for(session, initial + 1, *layout.warmup_batch())
                .await;
            tokio::join!(first.wait(), second.wait());
            if let Some(rest) = this.replay_continuation(session).await {
                rest.wait().await;
            }
        }));

        Ok(ScheduledWork { session, handles })
    }

    /// Schedule pages `[start, start + count)` in the current session.
    ///
    /// Pages already in the history or already in flight are skipped.
    pub async fn schedule_batch(&self, start: u32, count: u32) -> ScheduledBatch {
        let session = self.inner.store.session().await;
        self.schedule_batch_for(session, start, count).await
    }

    /// Schedule the batch following the last page in history.
    ///
    /// Returns `None` once every page up to the back cover exists.
    pub(crate) async fn schedule_continuation(&self, session: Uuid) -> Option<ScheduledBatch> {
        let layout = self.inner.settings.layout();
        let next = self
            .inner
            .store
            .read(|state| state.max_index())
            .await
            .map_or(0, |max| max + 1);
        if next > *layout.total_pages() {
            return None;
        }
        Some(self.schedule_batch_for(session, next, *layout.batch_size()).await)
    }

    /// A replayed story continues on its own once the shared choice is in place.
    async fn replay_continuation(&self, session: Uuid) -> Option<ScheduledBatch> {
        let resolved = self
            .inner
            .store
            .read(|state| {
                *state.session() == session
                    && state.is_replay()
                    && state
                        .pages()
                        .iter()
                        .any(|page| *page.is_decision_page() && page.resolved_choice().is_some())
            })
            .await;
        if !resolved {
            return None;
        }
        debug!(%session, "Continuing replay past the shared choice");
        self.schedule_continuation(session).await
    }

    /// Schedule a batch and wait for it. Returns the pages that became ready.
    pub async fn generate_batch(&self, start: u32, count: u32) -> Vec<u32> {
        self.schedule_batch(start, count).await.wait().await
    }

    async fn schedule_batch_for(
        &self,
        session: Uuid,
        start: u32,
        count: u32,
    ) -> ScheduledBatch {
        self.schedule_batch_with_tail(session, start, count, None).await
    }

    /// Schedule a batch; `tail` fires once its last page has a beat.
    #[instrument(skip(self, tail))]
    async fn schedule_batch_with_tail(
        &self,
        session: Uuid,
        start: u32,
        count: u32,
        tail: Option<oneshot::Sender<()>>,
    ) -> ScheduledBatch {
        let layout = self.inner.settings.layout();
        let mut guards = self
            .inner
            .in_flight
            .admit(session, layout.window(start, count));

        let existing: Vec<u32> = self
            .inner
            .store
            .read(|state| state.pages().iter().map(|page| *page.index()).collect())
            .await;
        guards.retain(|guard| !existing.contains(&guard.page()));
        if guards.is_empty() {
            debug!("Nothing to schedule");
            return ScheduledBatch::empty();
        }

        let pages: Vec<u32> = guards.iter().map(InFlightGuard::page).collect();
        let placeholders = pages
            .iter()
            .map(|number| Page::placeholder(*number, layout))
            .collect();
        let outcome = self
            .inner
            .store
            .apply(StoryMutation::AppendPages {
                session,
                pages: placeholders,
            })
            .await;
        if !outcome.is_applied() {
            return ScheduledBatch::empty();
        }

        info!(?pages, "Scheduled batch");
        let this = self.clone();
        let handle = tokio::spawn(async move { this.process_batch(session, guards, tail).await });
        ScheduledBatch {
            pages,
            handle: Some(handle),
        }
    }

    async fn process_batch(
        &self,
        session: Uuid,
        guards: Vec<InFlightGuard>,
        mut tail: Option<oneshot::Sender<()>>,
    ) -> Vec<u32> {
        let mut ready = Vec::new();
        let last = guards.last().map(InFlightGuard::page);
        for guard in guards {
            if self.inner.store.session().await != session {
                debug!(%session, "Abandoning batch for superseded session");
                break;
            }
            let number = guard.page();
            let beat_written = if Some(number) == last {
                tail.take()
            } else {
                None
            };
            match self.generate_page(session, number, beat_written).await {
                PageOutcome::Ready => ready.push(number),
                PageOutcome::Failed => {}
                PageOutcome::Discarded => break,
            }
            drop(guard);
        }
        ready
    }

    /// Generate one page end to end.
    pub async fn generate_single_page(&self, session: Uuid, number: u32) -> PageOutcome {
        self.generate_page(session, number, None).await
    }

    #[instrument(skip(self, beat_written))]
    async fn generate_page(
        &self,
        session: Uuid,
        number: u32,
        beat_written: Option<oneshot::Sender<()>>,
    ) -> PageOutcome {
        let layout = self.inner.settings.layout();
        let id = layout.page_id(number);
        let kind = layout.kind_for(number);
        let is_decision = layout.is_decision_page(number);

        let first_status = match kind {
            PageKind::Cover => PageStatus::GeneratingImage,
            _ => PageStatus::GeneratingBeat,
        };
        if !self
            .update(session, &id, PageUpdate::default().with_status(first_status))
            .await
        {
            return PageOutcome::Discarded;
        }

        let beat = match kind {
            PageKind::Cover => None,
            PageKind::BackCover => Some((back_cover_beat(), None)),
            PageKind::Story => match self.story_beat(number, is_decision).await {
                Ok(found) => Some(found),
                Err(e) => return self.fail(session, &id, &e).await,
            },
        };

        let panel_beat = match beat {
            None => fallback_beat(number),
            Some((mut beat, shared_choice)) => {
                if kind == PageKind::Story && *beat.focus_char() == FocusChar::Friend {
                    match self.ensure_costar(session).await {
                        Ok(true) => {}
                        Ok(false) => return PageOutcome::Discarded,
                        Err(e) => {
                            warn!(error = %e, page = number, "Co-star synthesis failed");
                            if let Some(reauth) =
                                e.transport_kind().filter(|k| k.requires_reauth())
                            {
                                self.inner.store.notify_reauth(reauth, &e.to_string());
                            }
                            beat.set_focus_char(FocusChar::Other);
                        }
                    }
                }
                let mut update = PageUpdate::default()
                    .with_choices(beat.choices().clone())
                    .with_narrative(beat.clone())
                    .with_is_decision_page(is_decision)
                    .with_status(PageStatus::GeneratingImage);
                update.resolved_choice = shared_choice;
                if !self.update(session, &id, update).await {
                    return PageOutcome::Discarded;
                }
                beat
            }
        };

        if let Some(tx) = beat_written {
            let _ = tx.send(());
        }
        self.render(session, &id, kind, &panel_beat).await
    }

    async fn render(&self, session: Uuid, id: &str, kind: PageKind, beat: &Beat) -> PageOutcome {
        let state = self.inner.store.snapshot().await;
        let cast = Cast {
            hero: state.hero().as_ref(),
            costar: state.costar().as_ref(),
        };
        match self
            .inner
            .generator
            .request_panel(kind, beat, cast, state.config())
            .await
        {
            Ok(image) => {
                let update = PageUpdate::default()
                    .with_image(image)
                    .with_status(PageStatus::Ready);
                if self.update(session, id, update).await {
                    PageOutcome::Ready
                } else {
                    PageOutcome::Discarded
                }
            }
            Err(e) => self.fail(session, id, &e).await,
        }
    }

    /// Beat for a story page, with the choice already committed to it when
    /// the beat comes from a share token.
    async fn story_beat(
        &self,
        number: u32,
        is_decision: bool,
    ) -> HeroesResult<(Beat, Option<String>)> {
        let state = self.inner.store.snapshot().await;
        if let Some(shared) = state.replay().as_ref().and_then(|shared| shared.beat_for(number)) {
            debug!(page = number, "Using shared beat");
            let choice = shared.resolved_choice.clone().filter(|_| is_decision);
            return Ok((shared.to_beat(), choice));
        }

        let context = self.inner.context.build(ContextInput {
            history: state.pages(),
            page_number: number,
            is_decision,
            config: state.config(),
            hero: state.hero().as_ref(),
            costar: state.costar().as_ref(),
        });
        match self.inner.generator.request_beat(&context).await {
            Ok(beat) => Ok((beat, None)),
            Err(e) if e.is_malformed_response() => {
                warn!(error = %e, page = number, "Using fallback beat");
                Ok((fallback_beat(number), None))
            }
            Err(e) => Err(e),
        }
    }

    /// Make sure a co-star exists. Returns `false` if the session changed.
    async fn ensure_costar(&self, session: Uuid) -> HeroesResult<bool> {
        let _lock = self.inner.costar_lock.lock().await;
        let (existing, config) = self
            .inner
            .store
            .read(|state| (state.costar().is_some(), state.config().clone()))
            .await;
        if existing {
            return Ok(true);
        }

        let description = if config.genre().is_custom() {
            "A fitting sidekick for this story".to_string()
        } else {
            format!("Sidekick for {} story.", config.genre())
        };
        let portrait = self.inner.generator.request_portrait(&description).await?;
        let costar = Persona::new(COSTAR_FALLBACK_NAME, description, portrait);
        Ok(self
            .inner
            .store
            .apply(StoryMutation::InstallCostar { session, costar })
            .await
            .is_applied())
    }

    async fn update(&self, session: Uuid, id: &str, update: PageUpdate) -> bool {
        self.inner
            .store
            .apply(StoryMutation::UpdatePage {
                session,
                id: id.to_string(),
                update,
            })
            .await
            .is_applied()
    }

    async fn fail(&self, session: Uuid, id: &str, error: &HeroesError) -> PageOutcome {
        warn!(page = %id, error = %error, "Page generation failed");
        let applied = self
            .update(
                session,
                id,
                PageUpdate::default().with_status(PageStatus::Failed),
            )
            .await;
        if !applied {
            return PageOutcome::Discarded;
        }
        if let Some(kind) = error.transport_kind().filter(|k| k.requires_reauth()) {
            self.inner.store.notify_reauth(kind, &error.to_string());
        }
        PageOutcome::Failed
    }

    /// Abandon the current story. Returns the new session.
    pub async fn reset(&self) -> Uuid {
        let outcome = self.inner.store.apply(StoryMutation::Reset).await;
        let session = match outcome {
            MutationOutcome::Applied { session } => session,
            MutationOutcome::Discarded => self.inner.store.session().await,
        };
        self.inner.in_flight.reset(session);
        session
    }

    /// Resume the saved story, if there is one.
    ///
    /// # Errors
    ///
    /// Returns error if the saved snapshot cannot be loaded.
    pub async fn restore(&self) -> HeroesResult<Option<Uuid>> {
        let Some(saved) = self.inner.store.load_saved().await? else {
            return Ok(None);
        };
        let outcome = self.inner.store.apply(StoryMutation::Restore(saved)).await;
        let MutationOutcome::Applied { session } = outcome else {
            return Ok(None);
        };
        self.inner.in_flight.reset(session);
        Ok(Some(session))
    }

    /// Prepare to replay a shared story. The next launch uses its beats.
    pub async fn enter_replay(&self, shared: SharedStory) -> Uuid {
        let outcome = self
            .inner
            .store
            .apply(StoryMutation::EnterReplay(Arc::new(shared)))
            .await;
        let session = match outcome {
            MutationOutcome::Applied { session } => session,
            MutationOutcome::Discarded => self.inner.store.session().await,
        };
        self.inner.in_flight.reset(session);
        session
    }

    /// Record the reader's position.
    pub async fn set_reading_position(&self, sheet: usize) -> MutationOutcome {
        let session = self.inner.store.session().await;
        self.inner
            .store
            .apply(StoryMutation::SetReadingPosition { session, sheet })
            .await
    }
}
