use std::time::Duration;
use tilawah::asr::{ChannelSource, RecognitionErrorKind, RecognitionEvent, ScriptedSource};
use tilawah::config::Thresholds;
use tilawah::core::normalize_arabic;
use tilawah::error::TilawahError;
use tilawah::matcher::VerseMatcher;
use tilawah::session::{SessionRunner, SessionState, SessionUpdate, StreamingSession};
use tilawah::verifier::Verifier;

mod common;
use common::mock_source::MockSource;

/// First word of the normalized verse, then the full verse as a final result
fn recite(text: &str) -> Vec<RecognitionEvent> {
    let normalized = normalize_arabic(text);
    let first = normalized.split_whitespace().next().unwrap_or_default();
    vec![
        RecognitionEvent::interim(first),
        RecognitionEvent::final_text(text),
    ]
}

#[tokio::test]
async fn test_sequential_session_recites_whole_chapter() {
    let window = common::fatiha();
    let events: Vec<RecognitionEvent> = window.iter().flat_map(|v| recite(&v.text)).collect();
    let mut runner = SessionRunner::new(MockSource::new(events));
    let mut session = StreamingSession::sequential(window, Verifier::default());

    let mut detected = Vec::new();
    for _ in 0..7 {
        let mut pending = 0;
        let update = runner
            .run(&mut session, |u| {
                if matches!(u, SessionUpdate::Pending { .. }) {
                    pending += 1;
                }
            })
            .await
            .expect("session run");
        match update {
            SessionUpdate::Detected(detection) => {
                assert_eq!(detection.result.accuracy, 100.0);
                detected.push(detection.verse.number_in_chapter);
            }
            other => panic!("expected a detection, got {:?}", other),
        }
        // the partial word never reaches the detection threshold
        assert_eq!(pending, 1);
        assert_eq!(session.state(), SessionState::Paused);
    }
    assert_eq!(detected, vec![1, 2, 3, 4, 5, 6, 7]);

    let update = runner.run(&mut session, |_| {}).await.expect("final run");
    assert!(matches!(update, SessionUpdate::Complete));
    assert!(session.is_complete());

    let summary = session.summary();
    assert_eq!(summary.total, 7);
    assert_eq!(summary.detected, 7);
    assert_eq!(summary.completed, 7);
    assert_eq!(summary.average_accuracy, 100.0);

    let attempts = session.attempts();
    assert_eq!(attempts.len(), 7);
    assert!(attempts.iter().all(|a| a.session_id == session.id()));
    assert!(attempts.iter().all(|a| a.chapter == 1));

    // one start/stop pair per detected verse; the completed run never starts
    assert_eq!(runner.source().calls().len(), 14);
    assert_eq!(runner.source().remaining(), 0);
}

#[tokio::test]
async fn test_stream_end_gives_best_effort_evaluation() {
    let window = common::fatiha();
    let mut runner = SessionRunner::new(MockSource::new(vec![RecognitionEvent::interim(
        "بسم الله",
    )]));
    let mut session = StreamingSession::sequential(window, Verifier::default());

    let mut updates = Vec::new();
    let update = runner
        .run(&mut session, |u| updates.push(u.clone()))
        .await
        .expect("session run");

    // evaluated once live and once more when the recognizer ran dry
    assert_eq!(updates.len(), 2);
    assert!(matches!(
        update,
        SessionUpdate::Pending {
            position: 0,
            accuracy
        } if accuracy == 50.0
    ));
    assert_eq!(session.state(), SessionState::Ended);
    assert_eq!(runner.source().calls(), vec!["start", "stop"]);
}

#[tokio::test]
async fn test_transient_errors_keep_listening() {
    let window = common::fatiha();
    let verse = window[0].text.clone();
    let mut runner = SessionRunner::new(MockSource::new(vec![
        RecognitionEvent::interim("بسم"),
        RecognitionEvent::error(RecognitionErrorKind::NoSpeech),
        RecognitionEvent::error(RecognitionErrorKind::Network),
        RecognitionEvent::error(RecognitionErrorKind::AudioCapture),
        RecognitionEvent::final_text(&verse),
    ]));
    let mut session = StreamingSession::sequential(window, Verifier::default());

    let mut updates = Vec::new();
    let update = runner
        .run(&mut session, |u| updates.push(u.clone()))
        .await
        .expect("transient errors are not failures");

    assert!(matches!(update, SessionUpdate::Detected(_)));
    // errors produce no evaluation
    assert_eq!(updates.len(), 2);
}

#[tokio::test]
async fn test_fatal_error_stops_session() {
    let window = common::fatiha();
    let mut runner = SessionRunner::new(MockSource::new(vec![
        RecognitionEvent::interim("بسم الله"),
        RecognitionEvent::Error {
            kind: RecognitionErrorKind::NotAllowed,
            message: "microphone permission denied".to_string(),
        },
        RecognitionEvent::interim("never heard"),
    ]));
    let mut session = StreamingSession::sequential(window, Verifier::default());

    let err = runner
        .run(&mut session, |_| {})
        .await
        .expect_err("permission failure is fatal");

    match err {
        TilawahError::Recognition { kind, message } => {
            assert_eq!(kind, RecognitionErrorKind::NotAllowed);
            assert_eq!(message, "microphone permission denied");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(runner.source().calls(), vec!["start", "stop"]);
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.transcript().is_empty());
    assert_eq!(runner.source().remaining(), 1);
}

#[tokio::test]
async fn test_unsupported_recognizer() {
    let mut runner = SessionRunner::new(MockSource::unsupported());
    let mut session = StreamingSession::sequential(common::fatiha(), Verifier::default());

    let result = runner.run(&mut session, |_| {}).await;
    assert!(matches!(result, Err(TilawahError::Unsupported(_))));
    assert!(runner.source().calls().is_empty());
    assert_eq!(session.state(), SessionState::Listening);
}

#[tokio::test]
async fn test_queued_updates_are_superseded() {
    let window = common::fatiha();
    let verse = window[0].text.clone();
    let mut runner = SessionRunner::new(MockSource::burst(vec![
        RecognitionEvent::interim("بسم"),
        RecognitionEvent::interim("بسم الله"),
        RecognitionEvent::final_text(&verse),
    ]));
    let mut session = StreamingSession::sequential(window, Verifier::default());

    let mut evaluations = 0;
    let update = runner
        .run(&mut session, |_| evaluations += 1)
        .await
        .expect("session run");

    assert_eq!(evaluations, 1);
    assert!(matches!(update, SessionUpdate::Detected(_)));
}

#[tokio::test]
async fn test_best_match_keeps_listening_until_end() {
    let mut runner = SessionRunner::new(MockSource::new(vec![
        RecognitionEvent::final_text("لم يلد ولم يولد"),
    ]));
    let mut session = StreamingSession::best_match(common::ikhlas(), Verifier::default());

    let mut updates = Vec::new();
    let update = runner
        .run(&mut session, |u| updates.push(u.clone()))
        .await
        .expect("session run");

    assert!(matches!(
        updates[0],
        SessionUpdate::Tracking {
            position: 2,
            stored: true,
            ..
        }
    ));
    // the end-of-stream pass scores the same verse again without replacing it
    assert!(matches!(
        update,
        SessionUpdate::Tracking {
            position: 2,
            stored: false,
            ..
        }
    ));
    assert_eq!(session.results().len(), 1);
    assert_eq!(session.attempts().len(), 1);
    assert_eq!(session.state(), SessionState::Ended);
}

#[tokio::test]
async fn test_discovery_identifies_verse() {
    let matcher = VerseMatcher::new(common::sample_corpus(), Thresholds::default());
    let mut runner = SessionRunner::new(MockSource::new(vec![
        RecognitionEvent::interim("الحمد لله"),
        RecognitionEvent::final_text("الحمد لله رب العالمين"),
    ]));
    let mut session = StreamingSession::discovery(matcher, Verifier::default());

    let mut live = 0;
    let update = runner
        .run(&mut session, |u| {
            if matches!(
                u,
                SessionUpdate::Candidates {
                    is_complete: false,
                    ..
                }
            ) {
                live += 1;
            }
        })
        .await
        .expect("session run");

    assert_eq!(live, 2);
    match update {
        SessionUpdate::Candidates {
            candidates,
            is_complete,
        } => {
            assert!(is_complete);
            assert_eq!(candidates[0].verse.reference(), "1:2");
            assert!(candidates.len() <= 3);
        }
        other => panic!("expected candidates, got {:?}", other),
    }
}

#[tokio::test]
async fn test_channel_source_live_recognizer() {
    let window = common::ikhlas();
    let verse = window[0].text.clone();
    let (tx, source) = ChannelSource::pair(8);

    let recognizer = tokio::spawn(async move {
        tx.send(RecognitionEvent::interim("قل هو")).await.ok();
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(RecognitionEvent::final_text(&verse)).await.ok();
    });

    let mut runner = SessionRunner::new(source);
    let mut session = StreamingSession::sequential(window, Verifier::default());
    let mut updates = Vec::new();
    let update = runner
        .run(&mut session, |u| updates.push(u.clone()))
        .await
        .expect("session run");
    recognizer.await.expect("recognizer task");

    assert_eq!(updates.len(), 2);
    assert!(matches!(updates[0], SessionUpdate::Pending { position: 0, .. }));
    assert!(matches!(update, SessionUpdate::Detected(ref d) if d.position == 0));
    assert!(!runner.source().is_listening());
}

#[tokio::test]
async fn test_replay_transcript_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ikhlas.jsonl");
    let lines = [
        r#"{"type":"interim","text":"قل هو"}"#,
        r#"{"type":"final","text":"قل هو الله احد"}"#,
        r#"{"type":"error","kind":"no-speech"}"#,
        r#"{"type":"final","text":"الله الصمد"}"#,
        r#"{"type":"end"}"#,
    ];
    std::fs::write(&path, lines.join("\n")).expect("Failed to write transcript");

    let source = ScriptedSource::load(&path).expect("transcript");
    let mut runner = SessionRunner::new(source);
    let mut session = StreamingSession::sequential(common::ikhlas(), Verifier::default());

    let first = runner.run(&mut session, |_| {}).await.expect("first verse");
    assert!(matches!(first, SessionUpdate::Detected(ref d) if d.position == 0));

    let second = runner.run(&mut session, |_| {}).await.expect("second verse");
    assert!(matches!(second, SessionUpdate::Detected(ref d) if d.position == 1));

    let summary = session.summary();
    assert_eq!(summary.detected, 2);
    assert_eq!(summary.total, 4);
    assert_eq!(runner.source().start_count(), 2);
}
