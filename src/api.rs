//! Wire contract with the tabs backend.
//!
//! Two endpoints are consumed as black boxes: `fetch_video_info` turns a
//! YouTube URL into an embeddable video id, and `process_video` crops the
//! requested region out of the video and renders the tab PDF.

use anyhow::Context;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use url::Url;

use crate::roi::Rect;

pub const FETCH_VIDEO_INFO_PATH: &str = "/tabs/fetch_video_info";
pub const PROCESS_VIDEO_PATH: &str = "/tabs/process_video";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchVideoInfoRequest {
    pub youtube_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    pub video_id: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Body of `POST /tabs/process_video`.
///
/// `roi` is expressed in rendered-player pixels, not in the video's native
/// resolution. `iframe_width`/`iframe_height` carry the rendered player size
/// so the backend can map the ROI onto decoded frames with
/// [`Rect::rescale`]: `native = roi * (video_size / iframe_size)` per axis.
///
/// A buffer of `None` serializes as JSON `null`; it is only produced under
/// the pass-through validation policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessVideoRequest {
    pub youtube_url: String,
    pub start_buffer: Option<i64>,
    pub end_buffer: Option<i64>,
    pub roi: Rect,
    pub iframe_width: u32,
    pub iframe_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcessVideoResponse {
    pub message: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status. The body is not inspected.
    #[error("Error: {0}")]
    Status(u16),
    /// No usable response was received.
    #[error("Request failed: {0}")]
    Transport(String),
}

pub trait TabsBackend: Send + Sync {
    fn fetch_video_info(&self, request: &FetchVideoInfoRequest) -> Result<VideoInfo, BackendError>;

    fn process_video(
        &self,
        request: &ProcessVideoRequest,
    ) -> Result<ProcessVideoResponse, BackendError>;

    /// Raw bytes of the still image at `url`.
    fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, BackendError>;
}

/// Run a backend call, turning a panic inside it into a transport failure
/// so the caller always gets an outcome to render.
pub(crate) fn call_guarded<T, F>(call: F) -> Result<T, BackendError>
where
    F: FnOnce() -> Result<T, BackendError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let panic_message = if let Some(message) = payload.downcast_ref::<&str>() {
                (*message).to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic".to_string()
            };
            tracing::error!(%panic_message, "backend call panicked");
            Err(BackendError::Transport(format!(
                "backend call panicked: {panic_message}"
            )))
        }
    }
}

pub struct HttpTabsClient {
    client: Client,
    base: Url,
}

impl HttpTabsClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid backend url '{base_url}'"))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("tab-roi client")
            .build()?;
        Ok(Self { client, base })
    }

    fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        tracing::debug!(%url, "POST");
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path, "backend returned error status");
            return Err(BackendError::Status(status.as_u16()));
        }
        resp.json::<R>()
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

impl TabsBackend for HttpTabsClient {
    fn fetch_video_info(&self, request: &FetchVideoInfoRequest) -> Result<VideoInfo, BackendError> {
        self.post_json(FETCH_VIDEO_INFO_PATH, request)
    }

    fn process_video(
        &self,
        request: &ProcessVideoRequest,
    ) -> Result<ProcessVideoResponse, BackendError> {
        self.post_json(PROCESS_VIDEO_PATH, request)
    }

    fn fetch_thumbnail(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(url, "GET thumbnail");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}
