use storage::repository::{Preferences, PreferencesRepository};
use storage::sqlite::SqliteStore;
use wordflash_core::VoiceMode;
use wordflash_core::model::ThemeId;

#[tokio::test]
async fn load_before_save_returns_none() {
    let store = SqliteStore::connect("sqlite:file:memdb_prefs_empty?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let loaded = store.load().await.expect("load");
    assert_eq!(loaded, None);
}

#[tokio::test]
async fn preferences_round_trip() {
    let store = SqliteStore::connect("sqlite:file:memdb_prefs_rt?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let prefs = Preferences {
        sound_on: false,
        voice_mode: VoiceMode::Full,
        theme_id: Some(ThemeId::new(2)),
    };
    store.save(&prefs).await.expect("save");

    let loaded = store.load().await.expect("load").expect("some");
    assert_eq!(loaded, prefs);
}

#[tokio::test]
async fn save_overwrites_previous_row() {
    let store = SqliteStore::connect("sqlite:file:memdb_prefs_ow?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    store
        .save(&Preferences::default())
        .await
        .expect("save defaults");
    let changed = Preferences {
        sound_on: true,
        voice_mode: VoiceMode::Full,
        theme_id: None,
    };
    store.save(&changed).await.expect("save changed");

    let loaded = store.load().await.expect("load").expect("some");
    assert_eq!(loaded, changed);
}
