// crates/playback/tests/coordinator_tests.rs
//! Queue coordinator scenarios against the headless player

mod common;

use common::*;
use hymnal_core::RepeatMode;
use hymnal_playback::{
    HeadlessPlayer, LoadTrigger, MediaPlayer, PlaybackContext, PlaybackEvent, PlaybackState,
    PlayerEvent, QueueCoordinator, SingleTrackController,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

type Coordinator = QueueCoordinator<HeadlessPlayer, FakeResolver>;

fn coordinator(context: &PlaybackContext<HeadlessPlayer>) -> Coordinator {
    QueueCoordinator::new(context.clone(), FakeResolver::new(), settings())
        .with_rng(StdRng::seed_from_u64(11))
}

fn current_url(context: &PlaybackContext<HeadlessPlayer>) -> Option<String> {
    context.with_player(|p| p.current_url().map(str::to_string))
}

fn upcoming(context: &PlaybackContext<HeadlessPlayer>) -> Vec<String> {
    context.with_player(|p| p.upcoming_urls().iter().map(|u| u.to_string()).collect())
}

#[tokio::test]
async fn three_entries_next_wraps_to_start() {
    let context = context();
    let mut queue = coordinator(&context);

    queue.play_playlist(&playlist(3), 1, false).await.unwrap();
    assert_eq!(queue.state(), PlaybackState::Playing);
    assert_eq!(queue.cursor(), Some(1));
    assert_eq!(current_url(&context), Some(standard_url(1)));
    assert_eq!(upcoming(&context), vec![standard_url(2)]);

    queue.next_song().await;
    assert_eq!(queue.cursor(), Some(2));
    assert_eq!(current_url(&context), Some(standard_url(2)));

    queue.next_song().await;
    assert_eq!(queue.cursor(), Some(0));
    assert_eq!(current_url(&context), Some(standard_url(0)));
}

#[tokio::test]
async fn previous_wraps_to_last() {
    let context = context();
    let mut queue = coordinator(&context);

    queue.play_playlist(&playlist(4), 0, false).await.unwrap();
    queue.previous_song().await;

    assert_eq!(queue.cursor(), Some(3));
    assert_eq!(current_url(&context), Some(standard_url(3)));
}

#[tokio::test]
async fn n_nexts_return_to_start() {
    let context = context();
    let mut queue = coordinator(&context);

    queue.play_playlist(&playlist(5), 2, true).await.unwrap();
    let first = queue.session().current_entry.unwrap().id;
    for _ in 0..5 {
        queue.next_song().await;
    }
    assert_eq!(queue.session().current_entry.unwrap().id, first);
}

#[tokio::test]
async fn own_start_notification_is_not_an_advance() {
    let context = context();
    let mut queue = coordinator(&context);

    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    let handled = queue.pump_player_events().await;

    assert_eq!(handled, 1);
    assert_eq!(queue.cursor(), Some(0));
    assert_eq!(queue.last_trigger(), Some(LoadTrigger::UserRequested));
}

#[tokio::test]
async fn player_advance_moves_cursor_exactly_once() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    queue.pump_player_events().await;
    let preloaded = queue.preloaded_tag().expect("next entry preloaded");

    let events = context.with_player(|p| p.advance(TRACK_SECS + 1.0));
    assert_eq!(events, vec![PlayerEvent::ItemStarted { tag: preloaded }]);
    for event in events {
        queue.handle_player_event(event).await;
    }
    assert_eq!(queue.cursor(), Some(1));
    assert_eq!(queue.last_trigger(), Some(LoadTrigger::PlayerAdvanced));

    queue
        .handle_player_event(PlayerEvent::ItemStarted { tag: preloaded })
        .await;
    assert_eq!(queue.cursor(), Some(1));
    assert_eq!(upcoming(&context), vec![standard_url(2)]);
}

#[tokio::test]
async fn stale_notifications_are_ignored() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    queue.pump_player_events().await;

    let stale = hymnal_playback::ItemTag::next();
    queue
        .handle_player_event(PlayerEvent::ItemStarted { tag: stale })
        .await;
    queue
        .handle_player_event(PlayerEvent::ReachedEnd { tag: stale })
        .await;

    assert_eq!(queue.cursor(), Some(0));
    assert_eq!(queue.state(), PlaybackState::Playing);
}

#[tokio::test]
async fn end_of_queue_with_repeat_off_goes_idle() {
    let context = context();
    let mut queue = coordinator(&context);
    let mut rx = queue.subscribe();

    queue.play_playlist(&playlist(2), 1, false).await.unwrap();
    assert!(upcoming(&context).is_empty());

    for event in context.with_player(|p| p.advance(TRACK_SECS + 1.0)) {
        queue.handle_player_event(event).await;
    }

    assert_eq!(queue.state(), PlaybackState::Idle);
    assert!(drain(&mut rx).contains(&PlaybackEvent::QueueFinished));
}

#[tokio::test]
async fn repeat_all_preloads_first_entry_at_the_end() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.set_repeat_mode(RepeatMode::All).await;

    queue.play_playlist(&playlist(3), 2, false).await.unwrap();
    assert_eq!(upcoming(&context), vec![standard_url(0)]);

    for event in context.with_player(|p| p.advance(TRACK_SECS + 1.0)) {
        queue.handle_player_event(event).await;
    }
    assert_eq!(queue.cursor(), Some(0));
    assert_eq!(queue.state(), PlaybackState::Playing);
}

#[tokio::test]
async fn repeat_one_preloads_the_same_entry() {
    let context = context();
    let mut queue = coordinator(&context);

    queue.play_playlist(&playlist(3), 1, false).await.unwrap();
    queue.set_repeat_mode(RepeatMode::One).await;

    assert_eq!(upcoming(&context), vec![standard_url(1)]);
    for event in context.with_player(|p| p.advance(TRACK_SECS + 1.0)) {
        queue.handle_player_event(event).await;
    }
    assert_eq!(queue.cursor(), Some(1));
}

#[tokio::test]
async fn failure_under_repeat_one_still_advances() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.set_repeat_mode(RepeatMode::One).await;
    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    queue.pump_player_events().await;

    context.with_player(|p| p.fail_current("decoder error"));
    queue.pump_player_events().await;

    assert_eq!(queue.cursor(), Some(1));
    assert_eq!(queue.state(), PlaybackState::Playing);
    assert_eq!(current_url(&context), Some(standard_url(1)));
}

#[tokio::test]
async fn failure_mid_track_advances_to_next() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    queue.pump_player_events().await;

    context.with_player(|p| p.fail_current("network dropped"));
    queue.pump_player_events().await;

    assert_eq!(queue.cursor(), Some(1));
    assert_eq!(queue.last_trigger(), Some(LoadTrigger::PlayerAdvanced));
}

#[tokio::test]
async fn toggle_shuffle_keeps_current_and_does_not_restart() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.play_playlist(&playlist(10), 4, false).await.unwrap();
    context.with_player(|p| p.advance(12.0));
    let tag_before = context.with_player(|p| p.current_tag());
    let entry_before = queue.session().current_entry.unwrap().id;

    queue.toggle_shuffle().await;

    assert!(queue.is_shuffled());
    assert_eq!(queue.session().current_entry.unwrap().id, entry_before);
    assert_eq!(context.with_player(|p| p.current_tag()), tag_before);
    assert_eq!(context.with_player(|p| p.position_secs()), 12.0);

    let next = queue.queue().unwrap().next_position();
    let next_entry = queue.queue().unwrap().entry_at(next).unwrap();
    assert_eq!(
        upcoming(&context),
        vec![standard_url(next_entry.sequence_index())]
    );

    queue.toggle_shuffle().await;
    assert!(!queue.is_shuffled());
    assert_eq!(queue.cursor(), Some(4));
    assert_eq!(upcoming(&context), vec![standard_url(5)]);
}

#[tokio::test]
async fn shuffled_start_entry_plays_first() {
    let context = context();
    let mut queue = coordinator(&context);

    queue.play_playlist(&playlist(10), 6, true).await.unwrap();

    assert_eq!(queue.cursor(), Some(0));
    assert_eq!(queue.session().current_entry.unwrap().numeric_id, 7);
    assert_eq!(current_url(&context), Some(standard_url(6)));
}

#[tokio::test]
async fn resolution_failure_on_next_keeps_playing_previous() {
    let context = context();
    let resolver = FakeResolver::new();
    resolver.fail_index(1);
    let mut queue = QueueCoordinator::new(context.clone(), resolver, settings());
    let mut rx = queue.subscribe();

    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    assert!(upcoming(&context).is_empty());
    drain(&mut rx);

    queue.next_song().await;

    assert_eq!(queue.state(), PlaybackState::Playing);
    assert_eq!(queue.cursor(), Some(0));
    assert_eq!(current_url(&context), Some(standard_url(0)));
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { .. })));
}

#[tokio::test]
async fn failed_first_load_leaves_coordinator_idle() {
    let context = context();
    let resolver = FakeResolver::new();
    resolver.fail_index(0);
    let mut queue = QueueCoordinator::new(context.clone(), resolver, settings());

    queue.play_playlist(&playlist(3), 0, false).await.unwrap();

    assert_eq!(queue.state(), PlaybackState::Idle);
    assert_eq!(current_url(&context), None);
}

#[tokio::test(start_paused = true)]
async fn hung_resolution_times_out_to_idle() {
    let context = context();
    let mut queue = QueueCoordinator::new(context.clone(), FakeResolver::hanging(), settings());
    let mut rx = queue.subscribe();

    let started = tokio::time::Instant::now();
    queue.play_playlist(&playlist(3), 0, false).await.unwrap();

    assert!(started.elapsed() >= settings().load_timeout);
    assert_eq!(queue.state(), PlaybackState::Idle);
    let events = drain(&mut rx);
    assert!(events.contains(&PlaybackEvent::StateChanged {
        state: PlaybackState::Loading
    }));
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { message } if message.contains("did not finish"))));
}

#[tokio::test]
async fn empty_playlist_is_rejected() {
    let context = context();
    let mut queue = coordinator(&context);
    let result = queue.play_playlist(&playlist(0), 0, false).await;
    assert!(result.is_err());
    assert_eq!(queue.state(), PlaybackState::Idle);
}

#[tokio::test]
async fn pause_and_resume() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.play_playlist(&playlist(2), 0, false).await.unwrap();

    queue.pause();
    assert_eq!(queue.state(), PlaybackState::Paused);
    assert!(!context.with_player(|p| p.is_playing()));

    queue.resume();
    assert_eq!(queue.state(), PlaybackState::Playing);
    assert!(context.with_player(|p| p.is_playing()));

    queue.stop();
    assert_eq!(queue.state(), PlaybackState::Idle);
    assert_eq!(current_url(&context), None);
}

#[tokio::test]
async fn cycle_repeat_mode_order() {
    let context = context();
    let mut queue = coordinator(&context);
    assert_eq!(queue.cycle_repeat_mode().await, RepeatMode::All);
    assert_eq!(queue.cycle_repeat_mode().await, RepeatMode::One);
    assert_eq!(queue.cycle_repeat_mode().await, RepeatMode::Off);
}

#[tokio::test]
async fn session_reflects_queue() {
    let context = context();
    let mut queue = coordinator(&context);
    queue.set_repeat_mode(RepeatMode::All).await;
    queue.play_playlist(&playlist(3), 2, false).await.unwrap();

    let session = queue.session();
    assert!(session.is_playing);
    assert!(session.is_vocal);
    assert!(!session.is_shuffled);
    assert_eq!(session.repeat_mode, RepeatMode::All);
    assert_eq!(session.current_entry.unwrap().numeric_id, 3);
}

#[tokio::test]
async fn losing_the_context_to_another_controller() {
    let context = context();
    let mut queue = coordinator(&context);
    let mut single = SingleTrackController::new(context.clone(), FakeResolver::new(), settings());

    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    let hymn = hymns(9).pop().unwrap();
    single.play(&hymn, false).await.unwrap();

    queue.next_song().await;

    assert_eq!(queue.state(), PlaybackState::Idle);
    assert_eq!(
        current_url(&context),
        Some(url_for(hymn.reference(), false))
    );
    assert_eq!(single.state(), PlaybackState::Playing);
}

#[tokio::test]
async fn session_reports_idle_as_soon_as_context_is_taken() {
    let context = context();
    let mut queue = coordinator(&context);
    let mut single = SingleTrackController::new(context.clone(), FakeResolver::new(), settings());

    queue.play_playlist(&playlist(3), 0, false).await.unwrap();
    assert!(queue.session().is_playing);

    single.play(&hymns(9).pop().unwrap(), true).await.unwrap();

    assert_eq!(queue.state(), PlaybackState::Idle);
    assert!(!queue.session().is_playing);

    queue.play_playlist(&playlist(3), 1, false).await.unwrap();
    assert_eq!(queue.state(), PlaybackState::Playing);
    assert_eq!(single.state(), PlaybackState::Idle);
}
