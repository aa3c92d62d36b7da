//! Trait definitions for generation backends, persistence and observers.

use async_trait::async_trait;
use heroes_core::{GenerateRequest, GenerateResponse, Page, Persona, SavedStory};
use heroes_error::{HeroesResult, TransportErrorKind};
use std::sync::Arc;

/// Core trait that every generation backend implements.
///
/// A backend accepts a multi-part request (text plus optional reference
/// images, with an optional output schema) and returns text and/or image
/// outputs. Backends never retry on their own.
#[async_trait]
pub trait GenerationDriver: Send + Sync {
    /// Generate model output given a multimodal request.
    async fn generate(&self, req: &GenerateRequest) -> HeroesResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<D: GenerationDriver + ?Sized> GenerationDriver for Arc<D> {
    async fn generate(&self, req: &GenerateRequest) -> HeroesResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Key-value persistence for whole-story snapshots.
#[async_trait]
pub trait StoryPersistence: Send + Sync {
    /// Overwrite the snapshot stored under `key`.
    async fn save(&self, key: &str, story: &SavedStory) -> HeroesResult<()>;

    /// Load the snapshot stored under `key`, if any.
    async fn load(&self, key: &str) -> HeroesResult<Option<SavedStory>>;

    /// Remove the snapshot stored under `key`. Missing keys are not an error.
    async fn clear(&self, key: &str) -> HeroesResult<()>;
}

/// Receives story changes for rendering, logging or UI prompts.
///
/// All methods default to no-ops. Page and reset callbacks run while the
/// story store is locked and must not call back into it.
pub trait StoryObserver: Send + Sync {
    /// A page was created or changed.
    fn page_updated(&self, _page: &Page) {}

    /// A co-star persona was installed mid-story.
    fn costar_introduced(&self, _costar: &Persona) {}

    /// A generation call failed in a way only new credentials can fix.
    fn reauth_required(&self, _kind: TransportErrorKind, _message: &str) {}

    /// The story was cleared.
    fn story_reset(&self) {}
}
