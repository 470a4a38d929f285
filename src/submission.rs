//! Submission of the selected region to the processing backend.
//!
//! The request runs on a worker thread; the UI polls for the outcome every
//! frame. The submit gate is held by an [`InFlightGuard`] that travels with
//! the outcome, so it is released on success, on HTTP failure, on transport
//! failure and when the worker dies without answering.

use chrono::{DateTime, Local};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{call_guarded, BackendError, ProcessVideoRequest, ProcessVideoResponse, TabsBackend};
use crate::roi::InFlightGuard;
use crate::session::RoiSession;
use crate::settings::ValidationPolicy;

pub type Notify = Box<dyn Fn() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Enter a YouTube URL first")]
    MissingUrl,
    #[error("Select a region of interest first")]
    MissingRoi,
    #[error("The selected region is empty; drag to select an area")]
    EmptyRoi,
    #[error("{field} must be a whole number of seconds, got '{value}'")]
    InvalidBuffer { field: &'static str, value: String },
    #[error("A request is already in progress")]
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub video_url: String,
    pub start_buffer: String,
    pub end_buffer: String,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self {
            video_url: String::new(),
            start_buffer: "5".into(),
            end_buffer: "5".into(),
        }
    }
}

/// What the result area shows after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Success {
        message: String,
        download_path: String,
    },
    Failure(String),
}

impl ResultView {
    pub fn text(&self) -> &str {
        match self {
            ResultView::Success { message, .. } => message,
            ResultView::Failure(text) => text,
        }
    }

    fn from_outcome(
        outcome: Result<ProcessVideoResponse, BackendError>,
        static_base: &str,
    ) -> Self {
        match outcome {
            Ok(resp) => ResultView::Success {
                download_path: download_path(static_base, &resp.output),
                message: resp.message,
            },
            Err(err) => ResultView::Failure(err.to_string()),
        }
    }
}

fn download_path(static_base: &str, output: &str) -> String {
    format!(
        "{}/{}",
        static_base.trim_end_matches('/'),
        output.trim_start_matches('/')
    )
}

/// Integer prefix of `raw`, the way a browser's `parseInt` reads it,
/// including the `0x` hex prefix. `None` stands in for `NaN`.
///
/// Digit runs that overflow `i64` also yield `None`, where a browser would
/// return an imprecise float.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, rest),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

fn parse_buffer(
    field: &'static str,
    raw: &str,
    policy: ValidationPolicy,
) -> Result<Option<i64>, FormError> {
    match policy {
        ValidationPolicy::PassThrough => Ok(parse_int_prefix(raw)),
        ValidationPolicy::Strict => match raw.trim().parse::<i64>() {
            Ok(v) if v >= 0 => Ok(Some(v)),
            _ => Err(FormError::InvalidBuffer {
                field,
                value: raw.to_string(),
            }),
        },
    }
}

/// Build the `process_video` body from the session and the form fields.
pub fn compose_payload(
    session: &RoiSession,
    form: &SubmissionForm,
    policy: ValidationPolicy,
) -> Result<ProcessVideoRequest, FormError> {
    let youtube_url = form.video_url.trim();
    if youtube_url.is_empty() {
        return Err(FormError::MissingUrl);
    }
    let roi = session.selected_roi().ok_or(FormError::MissingRoi)?;
    let size = session.player_size().ok_or(FormError::MissingRoi)?;
    let start_buffer = parse_buffer("Start buffer", &form.start_buffer, policy)?;
    let end_buffer = parse_buffer("End buffer", &form.end_buffer, policy)?;
    if policy == ValidationPolicy::Strict && roi.is_empty() {
        return Err(FormError::EmptyRoi);
    }

    Ok(ProcessVideoRequest {
        youtube_url: youtube_url.to_string(),
        start_buffer,
        end_buffer,
        roi,
        iframe_width: size.width.round().max(0.0) as u32,
        iframe_height: size.height.round().max(0.0) as u32,
    })
}

type Delivery = (Result<ProcessVideoResponse, BackendError>, InFlightGuard);

struct Pending {
    rx: Receiver<Delivery>,
    started: DateTime<Local>,
}

pub struct SubmissionCoordinator {
    static_base: String,
    pending: Option<Pending>,
    result: Option<ResultView>,
}

impl SubmissionCoordinator {
    pub fn new(static_base: impl Into<String>) -> Self {
        Self {
            static_base: static_base.into(),
            pending: None,
            result: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn result(&self) -> Option<&ResultView> {
        self.result.as_ref()
    }

    /// Time since the in-flight request started.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.pending
            .as_ref()
            .map(|p| Local::now().signed_duration_since(p.started))
    }

    /// Validate the form, take the submit gate and start the request.
    ///
    /// Validation failures are rendered into the result area and returned;
    /// they never take the gate, so submit stays available.
    pub fn submit(
        &mut self,
        session: &RoiSession,
        form: &SubmissionForm,
        policy: ValidationPolicy,
        backend: Arc<dyn TabsBackend>,
        notify: Notify,
    ) -> Result<(), FormError> {
        if self.pending.is_some() || !session.gates().can_submit() {
            return Err(FormError::NotReady);
        }
        let payload = match compose_payload(session, form, policy) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("submission rejected: {}", e);
                self.result = Some(ResultView::Failure(e.to_string()));
                return Err(e);
            }
        };
        let guard = session.gates().begin_submit().ok_or(FormError::NotReady)?;

        tracing::info!(
            url = %payload.youtube_url,
            iframe_width = payload.iframe_width,
            iframe_height = payload.iframe_height,
            "submitting ROI"
        );
        let (tx, rx) = channel();
        std::thread::spawn(move || {
            let outcome = call_guarded(|| backend.process_video(&payload));
            let _ = tx.send((outcome, guard));
            notify();
        });
        self.pending = Some(Pending {
            rx,
            started: Local::now(),
        });
        Ok(())
    }

    /// Drain a finished request, if any. Returns `true` when the result
    /// area changed.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        match pending.rx.try_recv() {
            Ok(delivery) => {
                self.finish(Some(delivery));
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.finish(None);
                true
            }
        }
    }

    /// Block until the in-flight request finishes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        match pending.rx.recv_timeout(timeout) {
            Ok(delivery) => {
                self.finish(Some(delivery));
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.finish(None);
                true
            }
        }
    }

    fn finish(&mut self, delivery: Option<Delivery>) {
        self.pending = None;
        let view = match delivery {
            Some((outcome, guard)) => {
                drop(guard);
                ResultView::from_outcome(outcome, &self.static_base)
            }
            None => ResultView::Failure(
                BackendError::Transport("worker stopped before responding".into()).to_string(),
            ),
        };
        match &view {
            ResultView::Success { download_path, .. } => {
                tracing::info!(%download_path, "processing finished")
            }
            ResultView::Failure(text) => tracing::warn!("processing failed: {}", text),
        }
        self.result = Some(view);
    }
}
