//! Reader choices.

use crate::{PageOrchestrator, ScheduledBatch, StoryMutation};
use heroes_core::PageUpdate;
use heroes_error::{HeroesResult, ValidationError, ValidationErrorKind};
use heroes_interface::GenerationDriver;
use tracing::{debug, info, instrument};

/// Commits reader choices and schedules the pages that follow.
pub struct ChoiceResolver<D> {
    orchestrator: PageOrchestrator<D>,
}

impl<D> Clone for ChoiceResolver<D> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
        }
    }
}

impl<D> std::fmt::Debug for ChoiceResolver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChoiceResolver")
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

impl<D: GenerationDriver + 'static> ChoiceResolver<D> {
    /// Create a resolver driving `orchestrator`.
    pub fn new(orchestrator: PageOrchestrator<D>) -> Self {
        Self { orchestrator }
    }

    /// The orchestrator this resolver schedules through.
    pub fn orchestrator(&self) -> &PageOrchestrator<D> {
        &self.orchestrator
    }

    /// Commit `choice` on decision page `page`.
    ///
    /// The choice is acknowledged at once, committed after the choice delay,
    /// and then the next batch is scheduled from the first page past the
    /// history. Returns `None` when the story is already complete or was
    /// replaced during the delay.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if no story is running, the page does not
    /// exist or is not a decision page, a choice is already committed, or the
    /// choice is not one of the page's options.
    #[instrument(skip(self))]
    pub async fn resolve_choice(
        &self,
        page: u32,
        choice: &str,
    ) -> HeroesResult<Option<ScheduledBatch>> {
        let store = self.orchestrator.store();
        let state = store.snapshot().await;
        if !*state.started() {
            return Err(ValidationError::new(ValidationErrorKind::NotStarted).into());
        }
        let target = state
            .page(page)
            .ok_or_else(|| ValidationError::new(ValidationErrorKind::UnknownPage(page)))?;
        if !*target.is_decision_page() {
            return Err(ValidationError::new(ValidationErrorKind::NotDecisionPage(page)).into());
        }
        if target.resolved_choice().is_some() {
            return Err(
                ValidationError::new(ValidationErrorKind::ChoiceAlreadyResolved(page)).into(),
            );
        }
        if !target.choices().iter().any(|offered| offered == choice) {
            return Err(ValidationError::new(ValidationErrorKind::ChoiceNotOffered {
                page,
                choice: choice.to_string(),
            })
            .into());
        }

        let session = *state.session();
        let id = target.id().clone();
        store
            .apply(StoryMutation::UpdatePage {
                session,
                id,
                update: PageUpdate::default().with_selected_choice(choice.to_string()),
            })
            .await;

        tokio::time::sleep(*self.orchestrator.settings().choice_delay()).await;

        let outcome = store
            .apply(StoryMutation::ResolveChoice {
                session,
                page,
                choice: choice.to_string(),
            })
            .await;
        if !outcome.is_applied() {
            let same_session = store.read(|state| *state.session() == session).await;
            if same_session {
                return Err(
                    ValidationError::new(ValidationErrorKind::ChoiceAlreadyResolved(page)).into(),
                );
            }
            debug!(page, "Story replaced before the choice was committed");
            return Ok(None);
        }

        let next = self.orchestrator.schedule_continuation(session).await;
        if next.is_none() {
            info!(page, "Story complete; nothing left to schedule");
        }
        Ok(next)
    }
}
