//! Page structure of a comic issue.

use crate::PageKind;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Fixed page structure of one issue.
///
/// Page 0 is the cover, pages `1..=max_story_pages` carry story beats and
/// `back_cover_page` closes the issue. `total_pages` is the highest page
/// number that may ever be scheduled.
///
/// # Examples
///
/// ```
/// use heroes_core::{PageKind, StoryLayout};
///
/// let layout = StoryLayout::default();
/// assert_eq!(layout.kind_for(0), PageKind::Cover);
/// assert_eq!(layout.kind_for(3), PageKind::Story);
/// assert_eq!(layout.kind_for(11), PageKind::BackCover);
/// assert!(layout.is_decision_page(3));
/// assert!(layout.is_final_story_page(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct StoryLayout {
    /// Highest schedulable page number
    #[builder(default = "11")]
    #[serde(default = "default_total_pages")]
    total_pages: u32,
    /// Number of story pages
    #[builder(default = "10")]
    #[serde(default = "default_max_story_pages")]
    max_story_pages: u32,
    /// Page number of the back cover
    #[builder(default = "11")]
    #[serde(default = "default_back_cover_page")]
    back_cover_page: u32,
    /// Pages in the first batch after launch
    #[builder(default = "2")]
    #[serde(default = "default_initial_batch")]
    initial_batch: u32,
    /// Pages in the overlapping warm-up batch after launch
    #[builder(default = "3")]
    #[serde(default = "default_warmup_batch")]
    warmup_batch: u32,
    /// Pages per continuation batch
    #[builder(default = "6")]
    #[serde(default = "default_batch_size")]
    batch_size: u32,
    /// Pages that end in a reader decision
    #[builder(default = "vec![3]")]
    #[serde(default = "default_decision_pages")]
    decision_pages: Vec<u32>,
}

fn default_total_pages() -> u32 {
    11
}

fn default_max_story_pages() -> u32 {
    10
}

fn default_back_cover_page() -> u32 {
    11
}

fn default_initial_batch() -> u32 {
    2
}

fn default_warmup_batch() -> u32 {
    3
}

fn default_batch_size() -> u32 {
    6
}

fn default_decision_pages() -> Vec<u32> {
    vec![3]
}

impl Default for StoryLayout {
    fn default() -> Self {
        Self {
            total_pages: default_total_pages(),
            max_story_pages: default_max_story_pages(),
            back_cover_page: default_back_cover_page(),
            initial_batch: default_initial_batch(),
            warmup_batch: default_warmup_batch(),
            batch_size: default_batch_size(),
            decision_pages: default_decision_pages(),
        }
    }
}

impl StoryLayout {
    /// Creates a new builder for `StoryLayout`.
    pub fn builder() -> StoryLayoutBuilder {
        StoryLayoutBuilder::default()
    }

    /// Page kind for a page number.
    pub fn kind_for(&self, page: u32) -> PageKind {
        if page == 0 {
            PageKind::Cover
        } else if page == self.back_cover_page {
            PageKind::BackCover
        } else {
            PageKind::Story
        }
    }

    /// Stable page id for a page number.
    pub fn page_id(&self, page: u32) -> String {
        if page == 0 {
            "cover".to_string()
        } else {
            format!("page-{}", page)
        }
    }

    /// Whether this page ends in a reader decision.
    pub fn is_decision_page(&self, page: u32) -> bool {
        self.decision_pages.contains(&page)
    }

    /// Whether this is the last story page.
    pub fn is_final_story_page(&self, page: u32) -> bool {
        page == self.max_story_pages
    }

    /// Page numbers in `[start, start + count)` capped at `total_pages`.
    pub fn window(&self, start: u32, count: u32) -> std::ops::Range<u32> {
        let end = start.saturating_add(count).min(self.total_pages.saturating_add(1));
        start..end
    }
}
