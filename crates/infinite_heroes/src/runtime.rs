//! Story operations for the command line, backed by the filesystem.

use crate::HeroesConfig;
use heroes_core::{PageKind, Persona, SavedStory, StorySetup};
use heroes_error::{HeroesResult, ValidationError, ValidationErrorKind};
use heroes_interface::{GenerationDriver, StoryObserver, StoryPersistence};
use heroes_models::GeminiClient;
use heroes_narrative::{ChoiceResolver, PageOrchestrator, SeededRandom, StoryState, StoryStore};
use heroes_rate_limit::RateLimitedDriver;
use heroes_storage::{ExportDocument, FileSystemStateStore, SharedStory};
use std::sync::Arc;
use tracing::{info, instrument};

/// Driver used against the live API.
pub type HeroesDriver = RateLimitedDriver<GeminiClient>;

/// One process's view of the saved story.
pub struct StoryRuntime<D> {
    orchestrator: PageOrchestrator<D>,
    resolver: ChoiceResolver<D>,
    persistence: FileSystemStateStore,
    save_key: String,
}

impl StoryRuntime<HeroesDriver> {
    /// Runtime talking to Gemini with the key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an `AuthInvalid` transport error if no key is set, or a
    /// storage error if the state directory cannot be created.
    pub fn from_config(
        config: &HeroesConfig,
        observer: Arc<dyn StoryObserver>,
    ) -> HeroesResult<Self> {
        let client = GeminiClient::from_env(config.models().text_model())?
            .with_base_url(config.models().base_url().clone());
        let driver = RateLimitedDriver::new(client, config.rate_limit());
        Self::with_driver(driver, config, observer)
    }
}

impl<D: GenerationDriver + 'static> StoryRuntime<D> {
    /// Runtime over an explicit driver.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the state directory cannot be created.
    pub fn with_driver(
        driver: D,
        config: &HeroesConfig,
        observer: Arc<dyn StoryObserver>,
    ) -> HeroesResult<Self> {
        let persistence = FileSystemStateStore::new(config.storage().state_dir().clone())?;
        let save_key = config.storage().save_key().clone();
        let store = StoryStore::new(save_key.clone())
            .with_persistence(Arc::new(persistence.clone()))
            .with_observer(observer);
        let orchestrator = PageOrchestrator::new(
            driver,
            store,
            config.orchestrator_settings(),
            Arc::new(SeededRandom::from_entropy()),
        );
        let resolver = ChoiceResolver::new(orchestrator.clone());
        Ok(Self {
            orchestrator,
            resolver,
            persistence,
            save_key,
        })
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &PageOrchestrator<D> {
        &self.orchestrator
    }

    /// Launch a story and wait for the cover and opening pages.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the setup is incomplete.
    #[instrument(skip(self, setup))]
    pub async fn start(&self, setup: StorySetup) -> HeroesResult<StoryState> {
        self.orchestrator.launch(setup).await?.wait().await;
        Ok(self.orchestrator.store().snapshot().await)
    }

    /// Resume the saved story, commit a choice and wait for the pages that follow.
    ///
    /// # Errors
    ///
    /// Returns a validation error if there is no saved story or the choice
    /// is not valid.
    #[instrument(skip(self))]
    pub async fn choose(&self, page: u32, choice: &str) -> HeroesResult<StoryState> {
        if self.orchestrator.restore().await?.is_none() {
            return Err(ValidationError::new(ValidationErrorKind::NotStarted).into());
        }
        if let Some(batch) = self.resolver.resolve_choice(page, choice).await? {
            batch.wait().await;
        }
        Ok(self.orchestrator.store().snapshot().await)
    }

    /// Replay a shared story with `hero` as the protagonist.
    ///
    /// Beats and the reader's recorded choices come from the token; panels
    /// are generated fresh. Waits until the replayed issue is complete.
    /// Nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns a storage error for a bad token.
    #[instrument(skip(self, token, hero))]
    pub async fn replay(&self, token: &str, hero: Persona) -> HeroesResult<StoryState> {
        let shared = SharedStory::from_token(token)?;
        info!(beats = shared.beats.len(), "Replaying shared story");

        self.orchestrator.enter_replay(shared).await;
        let setup = StorySetup::builder()
            .hero(Some(hero))
            .build()
            .map_err(|_| ValidationError::new(ValidationErrorKind::MissingHero))?;
        self.orchestrator.launch(setup).await?.wait().await;
        Ok(self.orchestrator.store().snapshot().await)
    }

    /// The saved story, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the save cannot be read.
    pub async fn saved(&self) -> HeroesResult<Option<SavedStory>> {
        self.persistence.load(&self.save_key).await
    }

    async fn require_saved(&self) -> HeroesResult<SavedStory> {
        self.saved()
            .await?
            .ok_or_else(|| ValidationError::new(ValidationErrorKind::NotStarted).into())
    }

    /// Share token for the saved story.
    ///
    /// # Errors
    ///
    /// Returns a validation error if nothing is saved.
    pub async fn share_token(&self) -> HeroesResult<String> {
        let saved = self.require_saved().await?;
        SharedStory::from_pages(saved.config(), saved.pages()).to_token()
    }

    /// Printable document of the saved story's finished pages.
    ///
    /// # Errors
    ///
    /// Returns a validation error if nothing is saved.
    pub async fn export(&self) -> HeroesResult<ExportDocument> {
        let saved = self.require_saved().await?;
        Ok(ExportDocument::compose(saved.pages()))
    }

    /// Discard the saved story.
    pub async fn reset(&self) {
        self.orchestrator.reset().await;
    }
}

/// Number of finished story pages in a snapshot.
pub fn finished_story_pages(state: &StoryState) -> usize {
    state
        .pages()
        .iter()
        .filter(|page| *page.kind() == PageKind::Story && page.image().is_some())
        .count()
}
