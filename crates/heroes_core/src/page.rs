//! Pages of the comic and their generation lifecycle.

use crate::{Beat, ImageData, StoryLayout};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What a page holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Title page
    #[display("cover")]
    Cover,
    /// A story page with a beat
    #[display("story")]
    Story,
    /// Teaser page closing the issue
    #[display("back_cover")]
    BackCover,
}

/// Generation state of a page.
///
/// `Queued → GeneratingBeat → GeneratingImage → Ready`, with `Failed`
/// reachable from either generating state. `Ready` and `Failed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Scheduled, not started
    #[display("queued")]
    Queued,
    /// Waiting for the beat
    #[display("generating beat")]
    GeneratingBeat,
    /// Beat written, waiting for the panel image
    #[display("generating image")]
    GeneratingImage,
    /// Image and (for story pages) beat available
    #[display("ready")]
    Ready,
    /// Generation stopped without an image
    #[display("failed")]
    Failed,
}

impl PageStatus {
    /// Whether generation has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PageStatus::Ready | PageStatus::Failed)
    }

    /// Whether the presentation layer should show a spinner.
    pub fn is_loading(&self) -> bool {
        !self.is_terminal()
    }
}

/// One side of the comic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Page {
    /// Stable id ("cover", "page-N")
    id: String,
    /// Page number, 0 for the cover
    index: u32,
    /// Cover, story or back cover
    kind: PageKind,
    /// Generation state
    status: PageStatus,
    /// Rendered panel
    #[serde(default)]
    image: Option<ImageData>,
    /// Narrative beat
    #[serde(default)]
    narrative: Option<Beat>,
    /// Options presented to the reader
    #[serde(default)]
    choices: Vec<String>,
    /// Choice the reader clicked (visual acknowledgement only)
    #[serde(default)]
    selected_choice: Option<String>,
    /// Choice committed to the story
    #[serde(default)]
    resolved_choice: Option<String>,
    /// Whether this page ends in a decision
    #[serde(default)]
    is_decision_page: bool,
}

impl Page {
    /// A queued placeholder for a freshly scheduled page number.
    ///
    /// # Examples
    ///
    /// ```
    /// use heroes_core::{Page, PageKind, PageStatus, StoryLayout};
    ///
    /// let page = Page::placeholder(4, &StoryLayout::default());
    /// assert_eq!(page.id(), "page-4");
    /// assert_eq!(page.kind(), &PageKind::Story);
    /// assert_eq!(page.status(), &PageStatus::Queued);
    /// ```
    pub fn placeholder(index: u32, layout: &StoryLayout) -> Self {
        Self {
            id: layout.page_id(index),
            index,
            kind: layout.kind_for(index),
            status: PageStatus::Queued,
            image: None,
            narrative: None,
            choices: Vec::new(),
            selected_choice: None,
            resolved_choice: None,
            is_decision_page: false,
        }
    }

    /// Whether the page is still being generated.
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Choices still open to the reader.
    ///
    /// Empty once a choice has been resolved.
    pub fn open_choices(&self) -> &[String] {
        if self.resolved_choice.is_some() {
            &[]
        } else {
            &self.choices
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: PageUpdate) {
        let PageUpdate {
            status,
            narrative,
            image,
            choices,
            is_decision_page,
            selected_choice,
            resolved_choice,
        } = update;
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(narrative) = narrative {
            self.narrative = Some(narrative);
        }
        if let Some(image) = image {
            self.image = Some(image);
        }
        if let Some(choices) = choices {
            self.choices = choices;
        }
        if let Some(flag) = is_decision_page {
            self.is_decision_page = flag;
        }
        if let Some(choice) = selected_choice {
            self.selected_choice = Some(choice);
        }
        if let Some(choice) = resolved_choice {
            self.resolved_choice = Some(choice);
        }
    }
}

/// A partial page update; `None` fields are left unchanged.
///
/// # Examples
///
/// ```
/// use heroes_core::{Page, PageStatus, PageUpdate, StoryLayout};
///
/// let mut page = Page::placeholder(1, &StoryLayout::default());
/// page.apply(PageUpdate::default().with_status(PageStatus::GeneratingBeat));
/// assert_eq!(page.status(), &PageStatus::GeneratingBeat);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct PageUpdate {
    /// New status
    pub status: Option<PageStatus>,
    /// New beat
    pub narrative: Option<Beat>,
    /// New image
    pub image: Option<ImageData>,
    /// New choices
    pub choices: Option<Vec<String>>,
    /// New decision flag
    pub is_decision_page: Option<bool>,
    /// New selected choice
    pub selected_choice: Option<String>,
    /// New resolved choice
    pub resolved_choice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_page_offers_no_choices() {
        let mut page = Page::placeholder(3, &StoryLayout::default());
        page.apply(
            PageUpdate::default()
                .with_choices(vec!["Trust".to_string(), "Doubt".to_string()])
                .with_is_decision_page(true),
        );
        assert_eq!(page.open_choices().len(), 2);

        page.apply(PageUpdate::default().with_resolved_choice("Trust".to_string()));
        assert!(page.open_choices().is_empty());
        assert_eq!(page.choices().len(), 2);
    }

    #[test]
    fn test_terminal_states() {
        assert!(PageStatus::Ready.is_terminal());
        assert!(PageStatus::Failed.is_terminal());
        assert!(PageStatus::GeneratingImage.is_loading());
        assert!(PageStatus::Queued.is_loading());
    }

    #[test]
    fn test_back_cover_placeholder() {
        let page = Page::placeholder(11, &StoryLayout::default());
        assert_eq!(page.kind(), &PageKind::BackCover);
        assert_eq!(page.id(), "page-11");
    }
}
