use crate::roi::gesture::{GestureEvent, GestureMachine};
use crate::roi::model::{FrameRect, OverlayStyle, Point, Rect, SurfaceSize};
use crate::roi::surface::{OverlayScene, OverlaySurface};
use crate::roi::{ControlGates, RoiError};
use crate::thumbnail::Thumbnail;
use crate::youtube;

/// A loaded video and where its player is currently rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSession {
    pub video_id: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    /// Decoded still painted under the overlay; `None` when it could not be
    /// fetched.
    pub thumbnail: Option<Thumbnail>,
    pub player_rect: FrameRect,
}

impl VideoSession {
    pub fn embed_url(&self) -> String {
        youtube::embed_url(&self.video_id)
    }
}

/// Everything the ROI workflow knows about the current page session.
///
/// Gesture handlers mutate it and the submission coordinator reads it; there
/// is no ambient state elsewhere.
#[derive(Debug, Clone, Default)]
pub struct RoiSession {
    video: Option<VideoSession>,
    surface: OverlaySurface,
    gesture: GestureMachine,
    selected_roi: Option<Rect>,
    gates: ControlGates,
}

impl RoiSession {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            surface: OverlaySurface::new(style),
            ..Self::default()
        }
    }

    pub fn video(&self) -> Option<&VideoSession> {
        self.video.as_ref()
    }

    pub fn selected_roi(&self) -> Option<Rect> {
        self.selected_roi
    }

    pub fn gates(&self) -> &ControlGates {
        &self.gates
    }

    pub fn surface(&self) -> &OverlaySurface {
        &self.surface
    }

    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    /// Forget the previous video and everything selected on it. Called as
    /// soon as a new URL is submitted, before the fetch completes.
    pub fn reset_for_new_url(&mut self) {
        self.video = None;
        self.selected_roi = None;
        self.gesture.reset();
        self.surface.deactivate();
        self.gates.reset_session();
    }

    pub fn load_video(&mut self, video: VideoSession) {
        self.reset_for_new_url();
        tracing::info!(video_id = %video.video_id, "video loaded");
        self.video = Some(video);
        self.gates.mark_video_loaded();
    }

    /// Track where the player is laid out this frame. The overlay keeps the
    /// geometry it captured at activation.
    pub fn set_player_rect(&mut self, rect: FrameRect) {
        if let Some(video) = self.video.as_mut() {
            video.player_rect = rect;
        }
    }

    /// Rendered player size, as sent alongside the ROI.
    pub fn player_size(&self) -> Option<SurfaceSize> {
        self.video.as_ref().map(|v| v.player_rect.size())
    }

    /// Show the overlay over the player and start a fresh gesture.
    pub fn begin_selection(&mut self, container: &FrameRect) -> Result<(), RoiError> {
        if !self.gates.can_select_roi() {
            tracing::warn!("select ROI invoked before a video was loaded");
            return Err(RoiError::NoVideoLoaded);
        }
        let player = self.video.as_ref().map(|v| v.player_rect);
        self.surface.activate(player.as_ref(), container)?;
        self.gesture.reset();
        Ok(())
    }

    pub fn pointer_down(&mut self, page: Point) -> Option<GestureEvent> {
        if !self.surface.contains_page_point(page) {
            return None;
        }
        let local = self.local_point(page);
        Some(self.gesture.handle_pointer_down(local))
    }

    pub fn pointer_move(&mut self, page: Point) -> Option<GestureEvent> {
        if !self.surface.is_visible() {
            return None;
        }
        let local = self.local_point(page);
        self.gesture.handle_pointer_move(local)
    }

    pub fn pointer_up(&mut self, page: Point) -> Option<GestureEvent> {
        if !self.surface.is_visible() {
            return None;
        }
        let local = self.local_point(page);
        let event = self.gesture.handle_pointer_up(local)?;
        if let GestureEvent::Committed(rect) = event {
            tracing::info!(
                x = rect.x,
                y = rect.y,
                width = rect.width,
                height = rect.height,
                "ROI selected"
            );
            self.selected_roi = Some(rect);
            self.surface.deactivate();
            self.gates.mark_roi_committed();
        }
        Some(event)
    }

    pub fn scene(&self) -> Option<OverlayScene> {
        self.surface.scene(self.gesture.preview())
    }

    // Pointer positions outside the surface are pinned to its edge so the
    // committed rect never leaves the player.
    fn local_point(&self, page: Point) -> Point {
        let local = self.surface.to_local(page);
        let size = self.surface.size();
        Point::new(
            local.x.clamp(0.0, size.width.max(0.0)),
            local.y.clamp(0.0, size.height.max(0.0)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::gesture::GestureState;

    fn container() -> FrameRect {
        FrameRect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn video() -> VideoSession {
        VideoSession {
            video_id: "abc".into(),
            video_url: "https://www.youtube.com/watch?v=abc".into(),
            thumbnail_url: None,
            thumbnail: None,
            player_rect: FrameRect::new(100.0, 50.0, 560.0, 315.0),
        }
    }

    #[test]
    fn select_before_video_leaves_state_untouched() {
        let mut session = RoiSession::default();
        assert_eq!(
            session.begin_selection(&container()),
            Err(RoiError::NoVideoLoaded)
        );
        assert_eq!(session.gesture().state(), GestureState::Idle);
        assert_eq!(session.selected_roi(), None);
        assert!(!session.surface().is_visible());
        assert_eq!(session.pointer_down(Point::new(150.0, 100.0)), None);
        assert_eq!(session.gesture().state(), GestureState::Idle);
    }

    #[test]
    fn drag_in_page_space_commits_local_rect() {
        let mut session = RoiSession::default();
        session.load_video(video());
        session.begin_selection(&container()).unwrap();
        assert!(!session.surface().player_interactive());

        session.pointer_down(Point::new(150.0, 110.0));
        session.pointer_move(Point::new(250.0, 200.0));
        assert!(session.scene().unwrap().preview.is_some());
        session.pointer_up(Point::new(300.0, 230.0));

        assert_eq!(
            session.selected_roi(),
            Some(Rect {
                x: 50.0,
                y: 60.0,
                width: 150.0,
                height: 120.0
            })
        );
        assert!(!session.surface().is_visible());
        assert!(session.surface().player_interactive());
        assert!(session.gates().can_submit());
    }

    #[test]
    fn pointer_outside_player_is_clamped() {
        let mut session = RoiSession::default();
        session.load_video(video());
        session.begin_selection(&container()).unwrap();

        session.pointer_down(Point::new(600.0, 300.0));
        session.pointer_up(Point::new(900.0, 500.0));

        let roi = session.selected_roi().unwrap();
        assert_eq!(roi.x + roi.width, 560.0);
        assert_eq!(roi.y + roi.height, 315.0);
    }

    #[test]
    fn loading_new_video_clears_selection() {
        let mut session = RoiSession::default();
        session.load_video(video());
        session.begin_selection(&container()).unwrap();
        session.pointer_down(Point::new(150.0, 100.0));
        session.pointer_up(Point::new(200.0, 150.0));
        assert!(session.selected_roi().is_some());

        session.reset_for_new_url();
        assert_eq!(session.selected_roi(), None);
        assert!(session.video().is_none());
        assert!(!session.gates().can_select_roi());
        assert!(!session.gates().can_submit());

        session.load_video(video());
        assert_eq!(session.selected_roi(), None);
        assert!(session.gates().can_select_roi());
    }

    #[test]
    fn reactivation_returns_gesture_to_idle_but_keeps_roi() {
        let mut session = RoiSession::default();
        session.load_video(video());
        session.begin_selection(&container()).unwrap();
        session.pointer_down(Point::new(150.0, 100.0));
        session.pointer_up(Point::new(200.0, 150.0));
        let roi = session.selected_roi();

        session.begin_selection(&container()).unwrap();
        assert_eq!(session.gesture().state(), GestureState::Idle);
        assert_eq!(session.selected_roi(), roi);
    }

    #[test]
    fn player_size_follows_layout() {
        let mut session = RoiSession::default();
        assert_eq!(session.player_size(), None);
        session.load_video(video());
        session.set_player_rect(FrameRect::new(0.0, 0.0, 640.0, 360.0));
        assert_eq!(session.player_size(), Some(SurfaceSize::new(640.0, 360.0)));
    }
}
