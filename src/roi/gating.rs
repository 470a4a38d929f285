use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Prerequisite flags behind the load / select / submit actions.
///
/// The in-flight flags are shared with worker threads through
/// [`InFlightGuard`], which clears them on drop whatever the outcome.
#[derive(Debug, Clone, Default)]
pub struct ControlGates {
    video_loaded: bool,
    roi_committed: bool,
    loading_video: Arc<AtomicBool>,
    submitting: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ControlGates {
    pub fn can_load_video(&self) -> bool {
        !self.loading_video.load(Ordering::Acquire)
    }

    pub fn can_select_roi(&self) -> bool {
        self.video_loaded
    }

    pub fn can_submit(&self) -> bool {
        self.roi_committed && !self.is_submitting()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn mark_video_loaded(&mut self) {
        self.video_loaded = true;
    }

    pub fn mark_roi_committed(&mut self) {
        self.roi_committed = true;
    }

    /// Drop every prerequisite that belonged to the previous video.
    pub fn reset_session(&mut self) {
        self.video_loaded = false;
        self.roi_committed = false;
    }

    pub fn begin_video_load(&self) -> Option<InFlightGuard> {
        InFlightGuard::acquire(&self.loading_video)
    }

    /// Disable submit until the returned guard is dropped. Returns `None`
    /// when submit is not currently allowed.
    pub fn begin_submit(&self) -> Option<InFlightGuard> {
        if !self.roi_committed {
            return None;
        }
        InFlightGuard::acquire(&self.submitting)
    }
}
