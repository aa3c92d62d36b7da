//! Console feedback for the command-line front end.

use heroes_core::{Page, Persona};
use heroes_error::TransportErrorKind;
use heroes_interface::StoryObserver;
use tracing::{debug, info};

/// Logs page transitions and prints credential prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

/// Prompt shown when the generation service rejects the credentials.
pub fn reauth_prompt(kind: TransportErrorKind) -> String {
    match kind {
        TransportErrorKind::AuthInvalid => {
            "The API key was rejected. Set GEMINI_API_KEY to a valid key and try again.".to_string()
        }
        TransportErrorKind::PermissionDenied => {
            "The API key lacks access to the configured models. Use a key from a project with billing enabled.".to_string()
        }
        TransportErrorKind::NotFound => {
            "The configured model was not found. Check [models] in infinite_heroes.toml or re-enter your key.".to_string()
        }
        TransportErrorKind::Other => "The generation service failed.".to_string(),
    }
}

impl StoryObserver for ConsoleObserver {
    fn page_updated(&self, page: &Page) {
        debug!(page = %page.id(), status = ?page.status(), "Page update");
        if page.status().is_terminal() {
            info!(page = %page.id(), status = ?page.status(), "Page finished");
        }
    }

    fn costar_introduced(&self, costar: &Persona) {
        info!(name = %costar.name(), "A co-star joins the story");
    }

    fn reauth_required(&self, kind: TransportErrorKind, message: &str) {
        debug!(%kind, message, "Re-authentication required");
        eprintln!("{}", reauth_prompt(kind));
    }

    fn story_reset(&self) {
        info!("Story reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_name_the_fix() {
        assert!(reauth_prompt(TransportErrorKind::AuthInvalid).contains("GEMINI_API_KEY"));
        assert!(reauth_prompt(TransportErrorKind::PermissionDenied).contains("billing"));
        assert!(reauth_prompt(TransportErrorKind::NotFound).contains("[models]"));
    }
}
