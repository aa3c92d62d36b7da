//! Fixed-layout export of finished pages.
//!
//! Every page with an image that is no longer loading becomes one
//! 480×720 pt sheet. Story pages get their caption in a yellow box across the
//! top and their dialogue in a round bubble at the bottom right; the text is
//! overlaid, never baked into the image.

use derive_getters::Getters;
use heroes_core::{ImageData, Page, PageKind};
use tracing::debug;

/// Export sheet width in points.
pub const EXPORT_PAGE_WIDTH: f32 = 480.0;

/// Export sheet height in points.
pub const EXPORT_PAGE_HEIGHT: f32 = 720.0;

/// Caption box geometry and text, in points from the top-left corner.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct CaptionBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    fill_rgb: (u8, u8, u8),
    font_size: f32,
    text_x: f32,
    text_y: f32,
    max_text_width: f32,
    text: String,
}

impl CaptionBox {
    fn new(text: &str) -> Self {
        Self {
            x: 10.0,
            y: 10.0,
            width: EXPORT_PAGE_WIDTH - 60.0,
            height: 40.0,
            fill_rgb: (254, 240, 138),
            font_size: 10.0,
            text_x: 15.0,
            text_y: 25.0,
            max_text_width: EXPORT_PAGE_WIDTH - 70.0,
            text: text.to_string(),
        }
    }
}

/// Dialogue bubble geometry and text, in points from the top-left corner.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct DialogueBubble {
    center_x: f32,
    center_y: f32,
    radius: f32,
    font_size: f32,
    max_text_width: f32,
    text: String,
}

impl DialogueBubble {
    fn new(text: &str) -> Self {
        Self {
            center_x: EXPORT_PAGE_WIDTH - 100.0,
            center_y: EXPORT_PAGE_HEIGHT - 60.0,
            radius: 50.0,
            font_size: 12.0,
            max_text_width: 80.0,
            text: text.to_string(),
        }
    }
}

/// One exported sheet.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ExportPage {
    index: u32,
    kind: PageKind,
    image: ImageData,
    caption: Option<CaptionBox>,
    dialogue: Option<DialogueBubble>,
}

/// A laid-out document ready to render.
#[derive(Debug, Clone, PartialEq, Default, Getters)]
pub struct ExportDocument {
    pages: Vec<ExportPage>,
}

impl ExportDocument {
    /// Lay out every finished page with an image, in page order.
    pub fn compose(pages: &[Page]) -> Self {
        let mut finished: Vec<&Page> = pages
            .iter()
            .filter(|page| page.image().is_some() && !page.is_loading())
            .collect();
        finished.sort_by_key(|page| *page.index());

        let pages: Vec<ExportPage> = finished
            .into_iter()
            .filter_map(|page| {
                let image = page.image().clone()?;
                let beat = page
                    .narrative()
                    .as_ref()
                    .filter(|_| *page.kind() == PageKind::Story);
                let caption = beat
                    .map(|b| b.caption().trim())
                    .filter(|text| !text.is_empty())
                    .map(CaptionBox::new);
                let dialogue = beat
                    .map(|b| b.dialogue().trim())
                    .filter(|text| !text.is_empty())
                    .map(DialogueBubble::new);
                Some(ExportPage {
                    index: *page.index(),
                    kind: *page.kind(),
                    image,
                    caption,
                    dialogue,
                })
            })
            .collect();

        debug!(pages = pages.len(), "Composed export document");
        Self { pages }
    }

    /// Whether there is nothing to export.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Render a self-contained, print-ready HTML document.
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Infinite Heroes</title>\n<style>\n");
        html.push_str(&format!(
            "@page {{ size: {w}pt {h}pt; margin: 0; }}\n\
             body {{ margin: 0; font-family: 'Courier New', Courier, monospace; font-weight: bold; }}\n\
             .sheet {{ position: relative; width: {w}pt; height: {h}pt; overflow: hidden; page-break-after: always; }}\n\
             .sheet img {{ position: absolute; left: 0; top: 0; width: {w}pt; height: {h}pt; }}\n\
             .caption {{ position: absolute; box-sizing: border-box; }}\n\
             .dialogue {{ position: absolute; display: flex; align-items: center; justify-content: center; text-align: center; background: #ffffff; border-radius: 50%; }}\n",
            w = EXPORT_PAGE_WIDTH,
            h = EXPORT_PAGE_HEIGHT
        ));
        html.push_str("</style>\n</head>\n<body>\n");

        for page in &self.pages {
            html.push_str(&format!(
                "<div class=\"sheet\" data-page=\"{}\" data-kind=\"{}\">\n",
                page.index, page.kind
            ));
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"Page {}\">\n",
                page.image.to_data_url(),
                page.index
            ));
            if let Some(caption) = &page.caption {
                let (r, g, b) = caption.fill_rgb;
                html.push_str(&format!(
                    "<div class=\"caption\" style=\"left: {}pt; top: {}pt; width: {}pt; height: {}pt; background: rgb({}, {}, {}); font-size: {}pt; padding: {}pt {}pt 0 {}pt;\"><span style=\"display: block; max-width: {}pt;\">{}</span></div>\n",
                    caption.x,
                    caption.y,
                    caption.width,
                    caption.height,
                    r,
                    g,
                    b,
                    caption.font_size,
                    caption.text_y - caption.y - caption.font_size,
                    caption.text_x - caption.x,
                    caption.text_x - caption.x,
                    caption.max_text_width,
                    escape_html(&caption.text)
                ));
            }
            if let Some(bubble) = &page.dialogue {
                html.push_str(&format!(
                    "<div class=\"dialogue\" style=\"left: {}pt; top: {}pt; width: {}pt; height: {}pt; font-size: {}pt;\"><span style=\"max-width: {}pt;\">{}</span></div>\n",
                    bubble.center_x - bubble.radius,
                    bubble.center_y - bubble.radius,
                    bubble.radius * 2.0,
                    bubble.radius * 2.0,
                    bubble.font_size,
                    bubble.max_text_width,
                    escape_html(&bubble.text)
                ));
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroes_core::{Beat, FocusChar, PageStatus, PageUpdate, StoryLayout};

    fn page(index: u32, status: PageStatus, with_image: bool, caption: &str) -> Page {
        let mut page = Page::placeholder(index, &StoryLayout::default());
        let mut update = PageUpdate::default().with_status(status);
        if with_image {
            update = update.with_image(ImageData::new("image/png", format!("IMG{}", index)));
        }
        if *page.kind() == PageKind::Story {
            update = update.with_narrative(Beat::new(
                caption,
                "",
                "scene",
                FocusChar::Hero,
                Vec::new(),
            ));
        }
        page.apply(update);
        page
    }

    #[test]
    fn test_compose_keeps_finished_pages_in_order() {
        let pages = vec![
            page(2, PageStatus::Ready, true, "Second"),
            page(0, PageStatus::Ready, true, ""),
            page(1, PageStatus::Ready, true, "First"),
            page(3, PageStatus::GeneratingImage, false, "Loading"),
            page(4, PageStatus::Failed, false, "Failed"),
        ];

        let doc = ExportDocument::compose(&pages);
        let indices: Vec<u32> = doc.pages().iter().map(|p| *p.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let cover = &doc.pages()[0];
        assert!(cover.caption().is_none());
        assert!(cover.dialogue().is_none());

        let first = &doc.pages()[1];
        let caption = first.caption().as_ref().unwrap();
        assert_eq!(caption.text(), "First");
        assert_eq!(*caption.width(), 420.0);
        assert_eq!(*caption.max_text_width(), 410.0);
        assert!(first.dialogue().is_none());
    }

    #[test]
    fn test_dialogue_bubble_position() {
        let mut story = Page::placeholder(1, &StoryLayout::default());
        story.apply(
            PageUpdate::default()
                .with_status(PageStatus::Ready)
                .with_image(ImageData::new("image/png", "X"))
                .with_narrative(Beat::new("", "Hold on!", "scene", FocusChar::Hero, vec![])),
        );

        let doc = ExportDocument::compose(&[story]);
        let bubble = doc.pages()[0].dialogue().as_ref().unwrap();
        assert_eq!((*bubble.center_x(), *bubble.center_y()), (380.0, 660.0));
        assert_eq!(*bubble.radius(), 50.0);
        assert!(doc.pages()[0].caption().is_none());
    }

    #[test]
    fn test_render_html_escapes_text() {
        let pages = vec![page(1, PageStatus::Ready, true, "<b>Boom</b> & \"bang\"")];
        let html = ExportDocument::compose(&pages).render_html();
        assert!(html.contains("&lt;b&gt;Boom&lt;/b&gt; &amp; &quot;bang&quot;"));
        assert!(html.contains("data:image/png;base64,IMG1"));
        assert!(html.contains("size: 480pt 720pt"));
    }
}
