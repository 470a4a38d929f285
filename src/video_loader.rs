use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{call_guarded, BackendError, FetchVideoInfoRequest, TabsBackend, VideoInfo};
use crate::roi::model::{FrameRect, SurfaceSize};
use crate::roi::InFlightGuard;
use crate::session::{RoiSession, VideoSession};
use crate::submission::{FormError, Notify};
use crate::thumbnail::Thumbnail;
use crate::youtube;

type Delivery = (
    Result<(VideoInfo, Option<Thumbnail>), BackendError>,
    InFlightGuard,
);

struct Pending {
    url: String,
    rx: Receiver<Delivery>,
}

/// Resolves a pasted URL into a playable video through the backend.
pub struct VideoLoader {
    player_size: SurfaceSize,
    pending: Option<Pending>,
    error: Option<String>,
}

impl VideoLoader {
    pub fn new(player_size: SurfaceSize) -> Self {
        Self {
            player_size,
            pending: None,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reset the session for the new URL and start the video-info fetch.
    pub fn load(
        &mut self,
        session: &mut RoiSession,
        url: &str,
        backend: Arc<dyn TabsBackend>,
        notify: Notify,
    ) -> Result<(), FormError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FormError::MissingUrl);
        }
        let guard = session
            .gates()
            .begin_video_load()
            .ok_or(FormError::NotReady)?;

        session.reset_for_new_url();
        self.error = None;
        if youtube::video_id_from_url(url).is_none() {
            tracing::debug!(url, "URL does not look like a YouTube link; asking backend anyway");
        }

        let request = FetchVideoInfoRequest {
            youtube_url: url.to_string(),
        };
        let (tx, rx) = channel();
        std::thread::spawn(move || {
            let outcome = call_guarded(|| {
                let info = backend.fetch_video_info(&request)?;
                let thumbnail = load_thumbnail(backend.as_ref(), &info);
                Ok((info, thumbnail))
            });
            let _ = tx.send((outcome, guard));
            notify();
        });
        self.pending = Some(Pending {
            url: url.to_string(),
            rx,
        });
        Ok(())
    }

    /// Apply a finished fetch to the session. Returns `true` when something
    /// changed.
    pub fn poll(&mut self, session: &mut RoiSession) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        match pending.rx.try_recv() {
            Ok(delivery) => {
                self.finish(session, Some(delivery));
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.finish(session, None);
                true
            }
        }
    }

    pub fn wait(&mut self, session: &mut RoiSession, timeout: Duration) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        match pending.rx.recv_timeout(timeout) {
            Ok(delivery) => {
                self.finish(session, Some(delivery));
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.finish(session, None);
                true
            }
        }
    }

    fn finish(&mut self, session: &mut RoiSession, delivery: Option<Delivery>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let outcome = match delivery {
            Some((outcome, guard)) => {
                drop(guard);
                outcome
            }
            None => Err(BackendError::Transport(
                "worker stopped before responding".into(),
            )),
        };
        match outcome {
            Ok((info, thumbnail)) => {
                let thumbnail_url = Some(thumbnail_source(&info));
                session.load_video(VideoSession {
                    video_id: info.video_id,
                    video_url: pending.url,
                    thumbnail_url,
                    thumbnail,
                    player_rect: FrameRect::new(
                        0.0,
                        0.0,
                        self.player_size.width,
                        self.player_size.height,
                    ),
                });
            }
            Err(err) => {
                tracing::warn!(url = %pending.url, "video info fetch failed: {}", err);
                self.error = Some(err.to_string());
            }
        }
    }
}

fn thumbnail_source(info: &VideoInfo) -> String {
    info.thumbnail_url
        .clone()
        .unwrap_or_else(|| youtube::thumbnail_url(&info.video_id))
}

// A missing still only costs the backdrop; the video itself is still usable.
fn load_thumbnail(backend: &dyn TabsBackend, info: &VideoInfo) -> Option<Thumbnail> {
    let url = thumbnail_source(info);
    let bytes = match backend.fetch_thumbnail(&url) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(%url, "thumbnail fetch failed: {}", e);
            return None;
        }
    };
    match Thumbnail::decode(&bytes) {
        Ok(thumb) => {
            tracing::debug!(width = thumb.width(), height = thumb.height(), "thumbnail decoded");
            Some(thumb)
        }
        Err(e) => {
            tracing::warn!(%url, "thumbnail decode failed: {}", e);
            None
        }
    }
}
