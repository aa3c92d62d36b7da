use heroes_core::{
    Beat, FocusChar, Genre, ImageData, Page, PageStatus, PageUpdate, Persona, SavedStory,
    StoryConfig, StoryLayout, Tone,
};
use heroes_interface::StoryPersistence;
use heroes_storage::{FileSystemStateStore, InMemoryStateStore, load_portrait};

fn sample_story() -> SavedStory {
    let layout = StoryLayout::default();
    let mut page = Page::placeholder(1, &layout);
    page.apply(
        PageUpdate::default()
            .with_status(PageStatus::Ready)
            .with_image(ImageData::new("image/png", "AAAA"))
            .with_narrative(Beat::new(
                "Rain on neon.",
                "",
                "HERO under a flickering sign",
                FocusChar::Hero,
                vec![],
            )),
    );

    SavedStory::builder()
        .hero(Some(Persona::new(
            "Vega",
            "Detective",
            ImageData::new("image/png", "BBBB"),
        )))
        .config(StoryConfig::new(
            Genre::NeonNoirDetective,
            "en-US",
            Tone::InnerMonologue,
            "",
            false,
        ))
        .pages(vec![Page::placeholder(0, &layout), page])
        .current_sheet(1usize)
        .build()
        .expect("Failed to build saved story")
}

#[tokio::test]
async fn test_filesystem_save_load_clear() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store =
        FileSystemStateStore::new(dir.path().join("state")).expect("Failed to create store");

    assert!(store.load("infinite_heroes_save_v1").await.unwrap().is_none());

    let story = sample_story();
    store.save("infinite_heroes_save_v1", &story).await.unwrap();
    assert!(dir.path().join("state/infinite_heroes_save_v1.json").exists());
    assert!(!dir.path().join("state/infinite_heroes_save_v1.json.tmp").exists());

    let loaded = store.load("infinite_heroes_save_v1").await.unwrap();
    assert_eq!(loaded, Some(story));

    store.clear("infinite_heroes_save_v1").await.unwrap();
    assert!(store.load("infinite_heroes_save_v1").await.unwrap().is_none());
    // Clearing twice is fine
    store.clear("infinite_heroes_save_v1").await.unwrap();
}

#[tokio::test]
async fn test_filesystem_rejects_path_like_keys() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = FileSystemStateStore::new(dir.path()).expect("Failed to create store");

    for key in ["", "../escape", "a/b", ".hidden"] {
        assert!(store.save(key, &sample_story()).await.is_err(), "key {:?}", key);
    }
}

#[tokio::test]
async fn test_filesystem_corrupt_save_is_json_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = FileSystemStateStore::new(dir.path()).expect("Failed to create store");
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let err = store.load("broken").await.unwrap_err();
    assert!(format!("{}", err).contains("JSON Error"));
}

#[tokio::test]
async fn test_in_memory_store_shares_state_between_clones() {
    let store = InMemoryStateStore::new();
    let clone = store.clone();

    store.save("key", &sample_story()).await.unwrap();
    assert_eq!(clone.len(), 1);
    assert_eq!(clone.load("key").await.unwrap(), Some(sample_story()));

    clone.clear("key").await.unwrap();
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_load_portrait_encodes_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("hero.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

    let persona = load_portrait(&path, "Nova", "Silver armor").await.unwrap();
    assert_eq!(persona.name(), "Nova");
    assert_eq!(persona.portrait().mime_type(), "image/png");
    assert_eq!(persona.portrait().to_bytes().unwrap(), vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_load_portrait_rejects_unknown_extension_and_empty_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let text = dir.path().join("hero.txt");
    std::fs::write(&text, "hello").unwrap();
    assert!(load_portrait(&text, "", "").await.is_err());

    let empty = dir.path().join("empty.jpg");
    std::fs::write(&empty, b"").unwrap();
    assert!(load_portrait(&empty, "", "").await.is_err());
}
