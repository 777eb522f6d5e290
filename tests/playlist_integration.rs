use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_slideshow::error::Error;
use rust_slideshow::playlist::{PlayStatus, PlaylistController, PlaylistOptions};
use rust_slideshow::testkit::{AnyProbe, ListProbe, RecordingPlayback};

fn build(
    sources: &[&str],
    options: PlaylistOptions,
    playback: Arc<RecordingPlayback>,
) -> PlaylistController {
    PlaylistController::build(
        sources.iter().copied(),
        options,
        &AnyProbe,
        playback,
        StdRng::seed_from_u64(11),
    )
    .expect("playlist")
}

#[test]
fn plays_in_order_and_wraps_on_track_end() {
    let playback = Arc::new(RecordingPlayback::default());
    let mut playlist = build(&["t1", "t2"], PlaylistOptions::default(), playback.clone());

    assert_eq!(playlist.play_next(), PlayStatus::Playing);
    assert_eq!(playback.loaded(), vec!["t1"]);
    assert_eq!(playlist.current_track_index(), 1);

    assert_eq!(playlist.on_track_ended(), PlayStatus::Playing);
    assert_eq!(playback.loaded(), vec!["t1", "t2"]);
    assert_eq!(playlist.current_track_index(), 0);

    playlist.on_track_ended();
    assert_eq!(playback.loaded(), vec!["t1", "t2", "t1"]);
}

#[test]
fn unreachable_sources_are_dropped() {
    let probe = ListProbe::new(["b.mp3"]);
    let playlist = PlaylistController::build(
        ["a.mp3", "b.mp3", "c.mp3"],
        PlaylistOptions::default(),
        &probe,
        Arc::new(RecordingPlayback::default()),
        StdRng::seed_from_u64(1),
    )
    .unwrap();
    assert_eq!(playlist.tracks(), ["b.mp3".to_string()]);
}

#[test]
fn all_unreachable_is_empty_playlist() {
    let probe = ListProbe::new(Vec::<String>::new());
    let result = PlaylistController::build(
        ["a.mp3", "b.mp3"],
        PlaylistOptions::default(),
        &probe,
        Arc::new(RecordingPlayback::default()),
        StdRng::seed_from_u64(1),
    );
    assert!(matches!(result, Err(Error::EmptyPlaylist)));
}

#[test]
fn volume_is_clamped() {
    let playback = Arc::new(RecordingPlayback::default());
    let options = PlaylistOptions {
        volume: Some(1.7),
        ..PlaylistOptions::default()
    };
    let mut playlist = build(&["t1"], options, playback.clone());
    playlist.play_next();
    let options = PlaylistOptions {
        volume: Some(-0.5),
        ..PlaylistOptions::default()
    };
    let mut quiet = build(&["t1"], options, playback.clone());
    quiet.play_next();
    assert_eq!(playback.volumes(), vec![1.0, 0.0]);
}

#[test]
fn no_volume_configured_leaves_host_volume() {
    let playback = Arc::new(RecordingPlayback::default());
    let mut playlist = build(&["t1"], PlaylistOptions::default(), playback.clone());
    playlist.play_next();
    assert!(playback.volumes().is_empty());
}

#[test]
fn rejected_playback_is_swallowed_and_not_retried() {
    let playback = Arc::new(RecordingPlayback::default());
    playback.reject_play(true);
    let mut playlist = build(&["t1", "t2"], PlaylistOptions::default(), playback.clone());

    assert_eq!(playlist.play_next(), PlayStatus::Blocked);
    assert_eq!(playback.play_calls(), 1);
    assert_eq!(playlist.now_playing(), Some("t1"));

    playback.reject_play(false);
    assert_eq!(playlist.resume(), PlayStatus::Playing);
    assert_eq!(playback.play_calls(), 2);
    assert_eq!(playback.loaded(), vec!["t1"], "resume must not skip ahead");
}

#[test]
fn unloadable_track_is_skipped() {
    let playback = Arc::new(RecordingPlayback::default());
    playback.fail_load("t1");
    let mut playlist = build(&["t1", "t2"], PlaylistOptions::default(), playback.clone());
    assert_eq!(playlist.play_next(), PlayStatus::Playing);
    assert_eq!(playlist.now_playing(), Some("t2"));
    assert_eq!(playlist.current_track_index(), 0);
}

#[test]
fn nothing_loadable_reports_unavailable() {
    let playback = Arc::new(RecordingPlayback::default());
    playback.fail_load("t1");
    let mut playlist = build(&["t1"], PlaylistOptions::default(), playback.clone());
    assert_eq!(playlist.play_next(), PlayStatus::Unavailable);
    assert_eq!(playlist.now_playing(), None);
}

#[test]
fn toggle_pauses_and_resumes() {
    let playback = Arc::new(RecordingPlayback::default());
    let mut playlist = build(&["t1"], PlaylistOptions::default(), playback.clone());
    playlist.play_next();
    assert!(!playlist.toggle());
    assert!(playlist.toggle());
    assert_eq!(playback.loaded(), vec!["t1"]);
}

#[test]
fn shuffle_and_reshuffle_keep_every_track() {
    let tracks: Vec<String> = (0..10).map(|i| format!("music/{i}.mp3")).collect();
    let playback = Arc::new(RecordingPlayback::default());
    let options = PlaylistOptions {
        shuffle: true,
        reshuffle_on_wrap: true,
        ..PlaylistOptions::default()
    };
    let mut playlist = PlaylistController::build(
        tracks.clone(),
        options,
        &AnyProbe,
        playback.clone(),
        StdRng::seed_from_u64(5),
    )
    .unwrap();
    for _ in 0..30 {
        playlist.play_next();
    }
    let loaded = playback.loaded();
    for lap in loaded.chunks(10) {
        let mut lap = lap.to_vec();
        lap.sort();
        let mut expected = tracks.clone();
        expected.sort();
        assert_eq!(lap, expected, "every lap plays each track once");
    }
}

#[test]
fn now_playing_title_is_decoded_file_stem() {
    let playback = Arc::new(RecordingPlayback::default());
    let mut playlist = build(&["music/Blue%20Train.mp3"], PlaylistOptions::default(), playback);
    playlist.play_next();
    assert_eq!(playlist.now_playing_title().as_deref(), Some("Blue Train"));
}
