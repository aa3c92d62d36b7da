//! Restore, replay and persistence across sessions.

mod test_utils;

use heroes_core::{FocusChar, Genre, PageStatus, PageUpdate, StoryLayout};
use heroes_narrative::{ChoiceResolver, PageOrchestrator, StoryMutation, StoryStore};
use heroes_storage::{InMemoryStateStore, SharedStory};
use std::sync::Arc;
use test_utils::{Call, FixedRandom, ScriptedDriver, harness, settings, setup};

#[tokio::test]
async fn test_restore_resumes_saved_story() {
    let first = harness(ScriptedDriver::happy());
    first.orchestrator.launch(setup(Genre::NeonNoirDetective)).await.unwrap().wait().await;
    first.orchestrator.set_reading_position(1).await;

    let store = StoryStore::new("test_save").with_persistence(Arc::new(first.saves.clone()));
    let driver = ScriptedDriver::happy();
    let second = PageOrchestrator::new(
        driver.clone(),
        store,
        settings(),
        Arc::new(FixedRandom {
            chance: false,
            pick: 0,
        }),
    );

    let session = second.restore().await.unwrap();
    assert!(session.is_some());

    let state = second.store().snapshot().await;
    assert_eq!(state.pages().len(), 6);
    assert_eq!(*state.current_sheet(), 1);
    assert_eq!(state.config().genre(), &Genre::NeonNoirDetective);
    assert_eq!(state.hero().as_ref().unwrap().name(), "Aria");

    let resolver = ChoiceResolver::new(second.clone());
    resolver
        .resolve_choice(3, "Walk away")
        .await
        .unwrap()
        .unwrap()
        .wait()
        .await;
    assert!(driver.calls().contains(&Call::Beat(6)));
    assert!(!driver.calls().contains(&Call::Beat(1)));
}

#[tokio::test]
async fn test_restore_without_save_is_none() {
    let h = harness(ScriptedDriver::happy());
    assert!(h.orchestrator.restore().await.unwrap().is_none());
}

#[tokio::test]
async fn test_restore_marks_interrupted_pages_failed() {
    let saves = InMemoryStateStore::new();
    let writer = StoryStore::new("test_save").with_persistence(Arc::new(saves.clone()));
    writer
        .apply(StoryMutation::Begin {
            hero: test_utils::hero(),
            costar: None,
            config: Default::default(),
        })
        .await;
    let session = writer.session().await;
    let layout = StoryLayout::default();
    writer
        .apply(StoryMutation::AppendPages {
            session,
            pages: vec![heroes_core::Page::placeholder(1, &layout)],
        })
        .await;
    writer
        .apply(StoryMutation::UpdatePage {
            session,
            id: "page-1".to_string(),
            update: PageUpdate::default().with_status(PageStatus::GeneratingBeat),
        })
        .await;

    let reader = StoryStore::new("test_save").with_persistence(Arc::new(saves));
    let orchestrator = PageOrchestrator::new(
        ScriptedDriver::happy(),
        reader,
        settings(),
        Arc::new(FixedRandom {
            chance: false,
            pick: 0,
        }),
    );
    orchestrator.restore().await.unwrap();

    let page = orchestrator
        .store()
        .read(|s| s.page(1).cloned())
        .await
        .unwrap();
    assert_eq!(page.status(), &PageStatus::Failed);
    assert!(!page.is_loading());
}

#[tokio::test]
async fn test_replay_reads_beats_from_token() {
    let original = harness(ScriptedDriver::happy());
    original.orchestrator.launch(setup(Genre::LightheartedComedy)).await.unwrap().wait().await;
    ChoiceResolver::new(original.orchestrator.clone())
        .resolve_choice(3, "Walk away")
        .await
        .unwrap()
        .unwrap()
        .wait()
        .await;
    let state = original.orchestrator.store().snapshot().await;
    let token = SharedStory::from_pages(state.config(), state.pages())
        .to_token()
        .unwrap();

    let replay = harness(ScriptedDriver::happy());
    let shared = SharedStory::from_token(&token).unwrap();
    replay.orchestrator.enter_replay(shared).await;
    replay.orchestrator.launch(setup(Genre::DarkSciFi)).await.unwrap().wait().await;

    let calls = replay.driver.calls();
    assert!(!calls.iter().any(|c| matches!(c, Call::Beat(_))));
    assert!(calls.contains(&Call::Panel(1)));
    assert!(calls.contains(&Call::Panel(11)));

    let replayed = replay.orchestrator.store().snapshot().await;
    let mut indices: Vec<u32> = replayed.pages().iter().map(|p| *p.index()).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..=11).collect::<Vec<_>>());
    assert!(replayed.pages().iter().all(|p| *p.status() == PageStatus::Ready));
    assert_eq!(replayed.config().genre(), &Genre::LightheartedComedy);
    assert_eq!(replayed.config().tone(), state.config().tone());
    for page in 1..=10 {
        let a = state.page(page).unwrap().narrative().clone().unwrap();
        let b = replayed.page(page).unwrap().narrative().clone().unwrap();
        assert_eq!(a.caption(), b.caption());
        assert_eq!(a.scene(), b.scene());
        assert_eq!(a.choices(), b.choices());
    }
    assert_eq!(
        replayed.page(3).unwrap().resolved_choice().as_deref(),
        Some("Walk away")
    );
    assert!(replay.saves.get("test_save").is_none());
}

#[tokio::test]
async fn test_replayed_choice_cannot_be_resolved_again() {
    let original = harness(ScriptedDriver::happy());
    original.orchestrator.launch(setup(Genre::ClassicHorror)).await.unwrap().wait().await;
    ChoiceResolver::new(original.orchestrator.clone())
        .resolve_choice(3, "Trust the stranger")
        .await
        .unwrap()
        .unwrap()
        .wait()
        .await;
    let state = original.orchestrator.store().snapshot().await;
    let shared = SharedStory::from_pages(state.config(), state.pages());

    let replay = harness(ScriptedDriver::happy());
    replay.orchestrator.enter_replay(shared).await;
    replay.orchestrator.launch(setup(Genre::ClassicHorror)).await.unwrap().wait().await;

    let page = replay.orchestrator.store().read(|s| s.page(3).cloned()).await.unwrap();
    assert_eq!(page.resolved_choice().as_deref(), Some("Trust the stranger"));
    assert!(page.open_choices().is_empty());
    let err = ChoiceResolver::new(replay.orchestrator.clone())
        .resolve_choice(3, "Walk away")
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        heroes_error::HeroesErrorKind::Validation(e)
            if e.kind == heroes_error::ValidationErrorKind::ChoiceAlreadyResolved(3)
    ));
}

#[tokio::test]
async fn test_replay_ignores_missing_premise() {
    let original = harness(ScriptedDriver::happy());
    original.orchestrator.launch(setup(Genre::HighFantasy)).await.unwrap().wait().await;
    let state = original.orchestrator.store().snapshot().await;
    let shared = SharedStory::from_pages(state.config(), state.pages());

    let replay = harness(ScriptedDriver::happy());
    replay.orchestrator.enter_replay(shared).await;

    assert!(replay.orchestrator.launch(setup(Genre::Custom)).await.is_ok());
}

#[tokio::test]
async fn test_focus_survives_share_token() {
    let driver = ScriptedDriver::new(|call| match call {
        Call::Beat(2) => Ok(heroes_core::GenerateResponse::text(test_utils::beat_json(
            2, "other", &[],
        ))),
        other => test_utils::happy_response(other),
    });
    let h = harness(driver);
    h.orchestrator.launch(setup(Genre::HighFantasy)).await.unwrap().wait().await;
    let state = h.orchestrator.store().snapshot().await;

    let token = SharedStory::from_pages(state.config(), state.pages()).to_token().unwrap();
    let shared = SharedStory::from_token(&token).unwrap();

    assert_eq!(shared.beat_for(2).unwrap().focus_char, FocusChar::Other);
    assert_eq!(shared.beats.len(), 5);
}
