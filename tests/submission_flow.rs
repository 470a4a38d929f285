use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tab_roi::api::{BackendError, ProcessVideoResponse, TabsBackend};
use tab_roi::roi::{FrameRect, Point};
use tab_roi::session::{RoiSession, VideoSession};
use tab_roi::settings::ValidationPolicy;
use tab_roi::submission::{FormError, ResultView, SubmissionCoordinator, SubmissionForm};

use mock_backend::MockBackend;

const WAIT: Duration = Duration::from_secs(5);

fn session_with_roi(from: (f32, f32), to: (f32, f32)) -> RoiSession {
    let player = FrameRect::new(0.0, 0.0, 560.0, 315.0);
    let mut session = RoiSession::default();
    session.load_video(VideoSession {
        video_id: "abc123".into(),
        video_url: "u".into(),
        thumbnail_url: None,
        thumbnail: None,
        player_rect: player,
    });
    session.begin_selection(&player).expect("select ROI");
    session.pointer_down(Point::new(from.0, from.1));
    session.pointer_move(Point::new(to.0, to.1));
    session.pointer_up(Point::new(to.0, to.1));
    session
}

fn form() -> SubmissionForm {
    SubmissionForm {
        video_url: "u".into(),
        start_buffer: "5".into(),
        end_buffer: "5".into(),
    }
}

fn run(
    backend: Arc<MockBackend>,
    session: &RoiSession,
    form: &SubmissionForm,
    policy: ValidationPolicy,
) -> SubmissionCoordinator {
    let mut coordinator = SubmissionCoordinator::new("/static");
    let dyn_backend: Arc<dyn TabsBackend> = backend;
    coordinator
        .submit(session, form, policy, dyn_backend, Box::new(|| {}))
        .expect("submit accepted");
    assert!(coordinator.wait(WAIT), "request did not finish");
    coordinator
}

#[test]
fn success_renders_message_and_static_download_link() {
    let backend = Arc::new(MockBackend::default());
    let session = session_with_roi((0.0, 0.0), (100.0, 50.0));
    let coordinator = run(backend.clone(), &session, &form(), ValidationPolicy::Strict);

    assert_eq!(
        coordinator.result(),
        Some(&ResultView::Success {
            message: "ok".into(),
            download_path: "/static/out.pdf".into(),
        })
    );
    assert!(!coordinator.is_loading());
    assert!(session.gates().can_submit());

    let sent = backend.process_requests.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        serde_json::to_value(&sent[0]).unwrap(),
        json!({
            "youtube_url": "u",
            "start_buffer": 5,
            "end_buffer": 5,
            "roi": {"x": 0.0, "y": 0.0, "width": 100.0, "height": 50.0},
            "iframe_width": 560,
            "iframe_height": 315
        })
    );
}

#[test]
fn http_error_renders_status_code() {
    let backend = Arc::new(MockBackend::processing(Err(BackendError::Status(500))));
    let session = session_with_roi((0.0, 0.0), (100.0, 50.0));
    let coordinator = run(backend, &session, &form(), ValidationPolicy::Strict);

    let result = coordinator.result().expect("result rendered");
    assert!(matches!(result, ResultView::Failure(_)));
    assert!(result.text().contains("500"));
    assert!(session.gates().can_submit());
}

#[test]
fn transport_error_renders_description_and_reenables_submit() {
    let backend = Arc::new(MockBackend::processing(Err(BackendError::Transport(
        "connection reset by peer".into(),
    ))));
    let session = session_with_roi((0.0, 0.0), (100.0, 50.0));
    let coordinator = run(backend, &session, &form(), ValidationPolicy::Strict);

    let result = coordinator.result().expect("result rendered");
    assert!(result.text().contains("connection reset by peer"));
    assert!(!coordinator.is_loading());
    assert!(session.gates().can_submit());
}

#[test]
fn submit_is_blocked_while_request_is_in_flight() {
    let (backend, release) = MockBackend::gated();
    let backend: Arc<dyn TabsBackend> = Arc::new(backend);
    let session = session_with_roi((0.0, 0.0), (100.0, 50.0));
    let mut coordinator = SubmissionCoordinator::new("/static");

    coordinator
        .submit(&session, &form(), ValidationPolicy::Strict, backend.clone(), Box::new(|| {}))
        .expect("first submit");
    assert!(coordinator.is_loading());
    assert!(!session.gates().can_submit());
    assert_eq!(
        coordinator.submit(&session, &form(), ValidationPolicy::Strict, backend, Box::new(|| {})),
        Err(FormError::NotReady)
    );
    assert!(!coordinator.poll());

    release.send(()).expect("release backend");
    assert!(coordinator.wait(WAIT));
    assert!(!coordinator.is_loading());
    assert!(session.gates().can_submit());
}

#[test]
fn crashed_worker_still_releases_submit() {
    let backend = Arc::new(MockBackend::panicking());
    let session = session_with_roi((0.0, 0.0), (100.0, 50.0));
    let coordinator = run(backend, &session, &form(), ValidationPolicy::Strict);

    let result = coordinator.result().expect("result rendered");
    assert!(result.text().starts_with("Request failed"));
    assert!(session.gates().can_submit());
}

#[test]
fn submit_without_roi_is_refused() {
    let backend: Arc<dyn TabsBackend> = Arc::new(MockBackend::default());
    let player = FrameRect::new(0.0, 0.0, 560.0, 315.0);
    let mut session = RoiSession::default();
    session.load_video(VideoSession {
        video_id: "abc123".into(),
        video_url: "u".into(),
        thumbnail_url: None,
        thumbnail: None,
        player_rect: player,
    });
    let mut coordinator = SubmissionCoordinator::new("/static");

    assert_eq!(
        coordinator.submit(&session, &form(), ValidationPolicy::Strict, backend, Box::new(|| {})),
        Err(FormError::NotReady)
    );
    assert!(!coordinator.is_loading());
}

#[test]
fn strict_policy_rejects_non_numeric_buffer_before_sending() {
    let backend = Arc::new(MockBackend::default());
    let session = session_with_roi((0.0, 0.0), (100.0, 50.0));
    let mut coordinator = SubmissionCoordinator::new("/static");
    let mut bad = form();
    bad.start_buffer = "five".into();

    let dyn_backend: Arc<dyn TabsBackend> = backend.clone();
    let err = coordinator
        .submit(&session, &bad, ValidationPolicy::Strict, dyn_backend, Box::new(|| {}))
        .unwrap_err();

    assert!(matches!(err, FormError::InvalidBuffer { field: "Start buffer", .. }));
    assert!(matches!(coordinator.result(), Some(ResultView::Failure(_))));
    assert!(backend.process_requests.lock().unwrap().is_empty());
    assert!(session.gates().can_submit());
}

#[test]
fn strict_policy_rejects_zero_area_roi() {
    let backend: Arc<dyn TabsBackend> = Arc::new(MockBackend::default());
    let session = session_with_roi((40.0, 40.0), (40.0, 40.0));
    assert!(session.gates().can_submit());

    let mut coordinator = SubmissionCoordinator::new("/static");
    assert_eq!(
        coordinator.submit(&session, &form(), ValidationPolicy::Strict, backend, Box::new(|| {})),
        Err(FormError::EmptyRoi)
    );
}

#[test]
fn pass_through_policy_sends_nan_buffers_as_null() {
    let backend = Arc::new(MockBackend::default());
    let session = session_with_roi((40.0, 40.0), (40.0, 40.0));
    let mut loose = form();
    loose.end_buffer = "abc".into();

    let coordinator = run(backend.clone(), &session, &loose, ValidationPolicy::PassThrough);
    assert!(matches!(coordinator.result(), Some(ResultView::Success { .. })));

    let sent = backend.process_requests.lock().unwrap();
    let body = serde_json::to_value(&sent[0]).unwrap();
    assert_eq!(body["start_buffer"], 5);
    assert!(body["end_buffer"].is_null());
    assert_eq!(body["roi"]["width"], 0.0);
}

#[test]
fn output_path_resolves_against_configured_static_base() {
    let backend = Arc::new(MockBackend::processing(Ok(ProcessVideoResponse {
        message: "PDF ready!".into(),
        output: "output.pdf".into(),
    })));
    let session = session_with_roi((10.0, 10.0), (110.0, 60.0));
    let mut coordinator = SubmissionCoordinator::new("/files/");
    let dyn_backend: Arc<dyn TabsBackend> = backend;
    coordinator
        .submit(&session, &form(), ValidationPolicy::Strict, dyn_backend, Box::new(|| {}))
        .unwrap();
    assert!(coordinator.wait(WAIT));

    match coordinator.result() {
        Some(ResultView::Success { download_path, .. }) => {
            assert_eq!(download_path, "/files/output.pdf")
        }
        other => panic!("unexpected result {other:?}"),
    }
}
