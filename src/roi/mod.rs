pub mod gating;
pub mod gesture;
pub mod model;
pub mod surface;

pub use gating::{ControlGates, InFlightGuard};
pub use gesture::{GestureEvent, GestureMachine, GestureState};
pub use model::{FrameRect, Point, Rect, SurfaceSize};
pub use surface::{OverlayScene, OverlaySurface};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoiError {
    #[error("Please load a YouTube video first!")]
    NoVideoLoaded,
    #[error("ROI overlay is not active")]
    SurfaceInactive,
    #[error("surface has zero width or height")]
    ZeroSurface,
}
