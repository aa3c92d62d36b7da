//! Scripted generation driver and helpers for orchestration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use heroes_core::{
    GenerateRequest, GenerateResponse, Genre, ImageData, Page, Persona, StoryLayout, StorySetup,
};
use heroes_error::{HeroesResult, TransportErrorKind};
use heroes_interface::{GenerationDriver, StoryObserver};
use heroes_narrative::{OrchestratorSettings, PageOrchestrator, RandomSource, StoryStore};
use heroes_storage::InMemoryStateStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// Beat for a story page
    Beat(u32),
    /// Character portrait
    Portrait,
    /// Panel for a page (0 cover, 11 back cover)
    Panel(u32),
}

impl Call {
    /// Classify a request by its shape.
    pub fn classify(request: &GenerateRequest) -> Self {
        let text = request.prompt_text();
        if request.response_schema().is_some() {
            return Call::Beat(number_after(&text, "PAGE ").unwrap_or(0));
        }
        if request.aspect_ratio().as_deref() == Some("1:1") {
            return Call::Portrait;
        }
        if text.contains("TYPE: Comic Book Cover") {
            return Call::Panel(0);
        }
        if text.contains("TYPE: Comic Back Cover") {
            return Call::Panel(11);
        }
        Call::Panel(number_after(&text, "for page ").unwrap_or(0))
    }
}

fn number_after(text: &str, marker: &str) -> Option<u32> {
    let start = text.find(marker)? + marker.len();
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

type Responder = dyn Fn(Call) -> HeroesResult<GenerateResponse> + Send + Sync;

/// Driver that answers from a closure and records every call.
#[derive(Clone)]
pub struct ScriptedDriver {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<Call>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    active: Arc<Mutex<(usize, usize)>>,
}

impl ScriptedDriver {
    /// Driver answering with `responder`.
    pub fn new(
        responder: impl Fn(Call) -> HeroesResult<GenerateResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(Mutex::new((0, 0))),
        }
    }

    /// Driver that completes every request successfully.
    pub fn happy() -> Self {
        Self::new(happy_response)
    }

    /// Calls in the order they were issued.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests in the order they were issued.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of requests outstanding at once.
    pub fn peak_concurrency(&self) -> usize {
        self.active.lock().unwrap().1
    }
}

#[async_trait]
impl GenerationDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> HeroesResult<GenerateResponse> {
        let call = Call::classify(req);
        self.calls.lock().unwrap().push(call);
        self.requests.lock().unwrap().push(req.clone());
        {
            let mut active = self.active.lock().unwrap();
            active.0 += 1;
            active.1 = active.1.max(active.0);
        }
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.active.lock().unwrap().0 -= 1;
        (self.responder)(call)
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Beat JSON for a page.
pub fn beat_json(page: u32, focus: &str, choices: &[&str]) -> String {
    serde_json::json!({
        "caption": format!("Caption {}", page),
        "dialogue": format!("Line {}", page),
        "scene": format!("Scene for page {}", page),
        "focus_char": focus,
        "choices": choices,
    })
    .to_string()
}

/// A tiny image.
pub fn image() -> ImageData {
    ImageData::new("image/png", "iVBORw0KGgo=")
}

/// Successful response for any call; page 3 offers two choices.
pub fn happy_response(call: Call) -> HeroesResult<GenerateResponse> {
    Ok(match call {
        Call::Beat(3) => GenerateResponse::text(beat_json(
            3,
            "hero",
            &["Trust the stranger", "Walk away"],
        )),
        Call::Beat(n) => GenerateResponse::text(beat_json(n, "hero", &[])),
        Call::Portrait | Call::Panel(_) => GenerateResponse::image(image()),
    })
}

/// Random source with fixed answers.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    /// Answer for every `chance`
    pub chance: bool,
    /// Answer for every `pick`
    pub pick: usize,
}

impl RandomSource for FixedRandom {
    fn chance(&self, _probability: f64) -> bool {
        self.chance
    }

    fn pick(&self, len: usize) -> usize {
        self.pick.min(len.saturating_sub(1))
    }
}

/// Observer that records notifications.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// Re-authentication prompts
    pub reauth: Mutex<Vec<TransportErrorKind>>,
    /// Co-stars introduced
    pub costars: Mutex<Vec<String>>,
    /// Page updates, as (id, status)
    pub updates: Mutex<Vec<(String, String)>>,
    /// Reset count
    pub resets: Mutex<usize>,
}

impl StoryObserver for RecordingObserver {
    fn page_updated(&self, page: &Page) {
        self.updates
            .lock()
            .unwrap()
            .push((page.id().clone(), format!("{:?}", page.status())));
    }

    fn costar_introduced(&self, costar: &Persona) {
        self.costars.lock().unwrap().push(costar.name().clone());
    }

    fn reauth_required(&self, kind: TransportErrorKind, _message: &str) {
        self.reauth.lock().unwrap().push(kind);
    }

    fn story_reset(&self) {
        *self.resets.lock().unwrap() += 1;
    }
}

/// Hero persona with a portrait.
pub fn hero() -> Persona {
    Persona::new("Aria", "A stubborn cartographer", image())
}

/// Setup for a genre with the test hero.
pub fn setup(genre: Genre) -> StorySetup {
    StorySetup::builder()
        .hero(Some(hero()))
        .genre(genre)
        .build()
        .unwrap()
}

/// Settings with no delays.
pub fn settings() -> OrchestratorSettings {
    settings_with_layout(StoryLayout::default())
}

/// Settings with no delays and a custom layout.
pub fn settings_with_layout(layout: StoryLayout) -> OrchestratorSettings {
    OrchestratorSettings::builder()
        .layout(layout)
        .launch_delay(Duration::ZERO)
        .choice_delay(Duration::ZERO)
        .build()
        .unwrap()
}

/// Everything a test needs to drive a story.
pub struct Harness {
    /// Orchestrator under test
    pub orchestrator: PageOrchestrator<ScriptedDriver>,
    /// The driver, for call inspection
    pub driver: ScriptedDriver,
    /// Persisted snapshots
    pub saves: InMemoryStateStore,
    /// Notifications
    pub observer: Arc<RecordingObserver>,
}

/// Build a harness over `driver`.
pub fn harness(driver: ScriptedDriver) -> Harness {
    harness_with(driver, settings(), FixedRandom { chance: false, pick: 0 })
}

/// Build a harness with explicit settings and randomness.
pub fn harness_with(
    driver: ScriptedDriver,
    settings: OrchestratorSettings,
    random: FixedRandom,
) -> Harness {
    let saves = InMemoryStateStore::new();
    let observer = Arc::new(RecordingObserver::default());
    let store = StoryStore::new("test_save")
        .with_persistence(Arc::new(saves.clone()))
        .with_observer(observer.clone());
    let orchestrator = PageOrchestrator::new(driver.clone(), store, settings, Arc::new(random));
    Harness {
        orchestrator,
        driver,
        saves,
        observer,
    }
}
