use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use marker_tap::GameConfig;
use marker_tap::display::NullDisplay;
use marker_tap::playtest::{AutoPlayer, play_round};
use marker_tap::round::RandomIndices;
use marker_tap::session::Session;
use marker_tap::store::{JsonFileStore, MemoryStore, ScoreStore};

fn unique_temp_json_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("marker_tap_test_{tag}_{nanos}.json"))
}

#[test]
fn seeded_high_score_holds_until_crossed_then_writes_once_per_increase() {
    let mut store = MemoryStore::new().with_value("highscore", 10);
    let mut session = Session::new(
        GameConfig::default(),
        &mut store,
        RandomIndices::seeded(7),
        NullDisplay,
    )
    .expect("default config is valid");

    let first = play_round(&mut session, AutoPlayer::missing_at(8), 60, 60 * 120);
    assert!(first.ended);
    assert_eq!(first.score, 7);
    assert_eq!(session.high_score(), 10);
    assert!(session.store().writes().is_empty());

    let second = play_round(&mut session, AutoPlayer::missing_at(13), 60, 60 * 240);
    assert!(second.ended);
    assert_eq!(second.score, 12);
    assert_eq!(session.high_score(), 12);
    assert_eq!(second.best, 12);

    drop(session);
    let writes_of_12 = store.writes().iter().filter(|(_, v)| *v == 12).count();
    assert_eq!(writes_of_12, 1);
    assert_eq!(
        store.writes(),
        &[("highscore".to_string(), 11), ("highscore".to_string(), 12)]
    );
    assert_eq!(store.get_int("highscore"), 12);
}

#[test]
fn high_score_survives_a_process_restart_through_the_file_store() {
    let path = unique_temp_json_path("restart");

    {
        let store = JsonFileStore::open(path.clone());
        let mut session = Session::new(
            GameConfig::default(),
            store,
            RandomIndices::seeded(3),
            NullDisplay,
        )
        .expect("default config is valid");
        let report = play_round(&mut session, AutoPlayer::missing_at(6), 60, 60 * 120);
        assert_eq!(report.score, 5);
        session.shutdown();
    }

    let reopened = JsonFileStore::open(path.clone());
    assert_eq!(reopened.get_int("highscore"), 5);

    let session = Session::new(
        GameConfig::default(),
        reopened,
        RandomIndices::seeded(4),
        NullDisplay,
    )
    .expect("default config is valid");
    assert_eq!(session.high_score(), 5);

    let _ = fs::remove_file(path);
}

#[test]
fn custom_key_is_used_for_reads_and_writes() {
    let mut store = MemoryStore::new().with_value("best_5_blocks", 1);
    let config = GameConfig {
        highscore_key: "best_5_blocks".to_string(),
        ..GameConfig::default()
    };
    let mut session =
        Session::new(config, &mut store, RandomIndices::seeded(9), NullDisplay).expect("valid");
    assert_eq!(session.high_score(), 1);
    play_round(&mut session, AutoPlayer::missing_at(3), 60, 60 * 60);
    drop(session);

    assert_eq!(store.get_int("best_5_blocks"), 2);
    assert_eq!(store.get_int("highscore"), 0);
}
