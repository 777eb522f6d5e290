use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_slideshow::captions::{CaptionBinder, CaptionDocument, CaptionRecord};
use rust_slideshow::catalog::{ImageCatalog, ImageEntry};
use rust_slideshow::debug_overlay::DebugReporter;
use rust_slideshow::effects::EffectRegistry;
use rust_slideshow::slideshow::{Advance, SlideshowController, SlideshowOptions, SlideshowState};
use rust_slideshow::testkit::{self, CountingEffect, RecordingOverlay, RecordingSurfaces};

async fn step(show: &mut SlideshowController, delta: isize) -> String {
    let Advance::Started(transition) = show.advance(delta) else {
        panic!("expected a transition to start");
    };
    let effect = transition.effect_name().to_string();
    let done = transition.run().await;
    assert!(show.complete(done));
    effect
}

fn filename(show: &SlideshowController) -> String {
    show.current_image().expect("image on screen").filename.clone()
}

#[tokio::test(start_paused = true)]
async fn three_image_loop_wraps_and_reshuffles() {
    let (mut show, surfaces) = testkit::slideshow(&["A", "B", "C"], &["fade"], false);
    show.start().unwrap();
    assert_eq!(filename(&show), "A");

    assert_eq!(step(&mut show, 1).await, "fade");
    assert_eq!(filename(&show), "B");
    assert_eq!(step(&mut show, 1).await, "fade");
    assert_eq!(filename(&show), "C");
    assert_eq!(show.reshuffle_count(), 0);

    step(&mut show, 1).await;
    assert_eq!(show.reshuffle_count(), 1);
    assert_eq!(show.current_index(), 0);
    let first = show.catalog().get(0).unwrap().clone();
    assert_eq!(show.current_image(), Some(&first));
    assert_eq!(surfaces.live(), vec![(first.source.clone(), 1.0)]);
}

#[tokio::test(start_paused = true)]
async fn n_forward_steps_return_to_start_after_one_reshuffle() {
    for n in 1..=6usize {
        let names: Vec<String> = (0..n).map(|i| format!("{i}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (mut show, _) = testkit::slideshow(&refs, &["cut"], false);
        show.start().unwrap();
        let start = show.current_index();
        for _ in 0..n {
            step(&mut show, 1).await;
        }
        assert_eq!(show.current_index(), start, "n = {n}");
        assert_eq!(show.reshuffle_count(), 1, "n = {n}");
        assert_eq!(show.completed_transitions(), n as u64);
    }
}

#[tokio::test(start_paused = true)]
async fn reshuffle_keeps_every_entry() {
    let names: Vec<String> = (0..12).map(|i| format!("{i}.jpg")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (mut show, _) = testkit::slideshow(&refs, &["cut"], false);
    show.start().unwrap();
    let mut before: Vec<ImageEntry> = show.catalog().as_slice().to_vec();
    for _ in 0..12 {
        step(&mut show, 1).await;
    }
    let mut after: Vec<ImageEntry> = show.catalog().as_slice().to_vec();
    before.sort_by_key(|e| e.index);
    after.sort_by_key(|e| e.index);
    assert_eq!(before, after);
}

#[tokio::test(start_paused = true)]
async fn every_transition_completes_exactly_once() {
    let effect = Arc::new(CountingEffect::default());
    let mut effects = EffectRegistry::with_builtins();
    effects.register("counting", effect.clone());
    let surfaces = Arc::new(RecordingSurfaces::default());
    let overlay = Arc::new(RecordingOverlay::default());
    let catalog = ImageCatalog::build(["a.jpg", "b.jpg", "c.jpg"], false).unwrap();
    let mut show = SlideshowController::new(
        catalog,
        effects,
        surfaces.clone(),
        CaptionBinder::new(CaptionDocument::default(), overlay.clone(), true),
        DebugReporter::new(true, overlay.clone()),
        SlideshowOptions {
            transitions: vec!["counting".into()],
            random_transitions: false,
            ..SlideshowOptions::default()
        },
        StdRng::seed_from_u64(3),
    );
    show.start().unwrap();

    for i in 0..10 {
        let delta = if i % 3 == 0 { -1 } else { 1 };
        let Advance::Started(t) = show.advance(delta) else {
            panic!("expected transition");
        };
        assert!(matches!(show.advance(1), Advance::Busy));
        let done = t.run().await;
        assert!(show.complete(done));
        assert_eq!(show.state(), SlideshowState::Showing);
    }
    assert_eq!(effect.applied(), 10);
    assert_eq!(show.completed_transitions(), 10);
    assert_eq!(surfaces.live().len(), 1, "only the visible surface survives");
    assert_eq!(surfaces.destroyed_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn unknown_effect_name_falls_back_silently() {
    let (mut show, surfaces) = testkit::slideshow(&["a.jpg", "b.jpg"], &["glass-distort"], false);
    show.start().unwrap();
    assert_eq!(step(&mut show, 1).await, "glass-distort");
    assert_eq!(surfaces.live(), vec![("images/b.jpg".to_string(), 1.0)]);
}

#[tokio::test(start_paused = true)]
async fn captions_and_debug_follow_completed_transition() {
    let mut doc = CaptionDocument::default();
    doc.insert(
        "b.jpg",
        CaptionRecord {
            title: "Bridge".into(),
            description: "At dusk".into(),
            author: Some("Lee".into()),
            date: None,
        },
    );
    let overlay = Arc::new(RecordingOverlay::default());
    let catalog = ImageCatalog::build(["pics/a.jpg", "pics/b.jpg"], false).unwrap();
    let mut show = SlideshowController::new(
        catalog,
        EffectRegistry::with_builtins(),
        Arc::new(RecordingSurfaces::default()),
        CaptionBinder::new(doc, overlay.clone(), true),
        DebugReporter::new(true, overlay.clone()),
        SlideshowOptions {
            transitions: vec!["cut".into()],
            random_transitions: false,
            ..SlideshowOptions::default()
        },
        StdRng::seed_from_u64(9),
    );
    show.start().unwrap();
    assert_eq!(show.captions().last().title, "");

    step(&mut show, 1).await;
    let (fields, fade_in) = overlay.last_caption().unwrap();
    assert_eq!(fields.title, "Bridge");
    assert_eq!(fields.meta, "Lee");
    assert!(fade_in);
    assert_eq!(
        overlay.last_debug(),
        Some(Some("Index: 1\nFile: b.jpg\nEffect: cut".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn previous_after_wrap_follows_current_order() {
    let (mut show, _) = testkit::slideshow(&["a", "b", "c", "d"], &["cut"], false);
    show.start().unwrap();
    for _ in 0..4 {
        step(&mut show, 1).await;
    }
    assert_eq!(show.current_index(), 0);
    step(&mut show, -1).await;
    let last = show.catalog().get(3).unwrap().clone();
    assert_eq!(show.current_image(), Some(&last));
    assert_eq!(show.reshuffle_count(), 1);
}
