use crate::roi::model::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Selecting {
        anchor: Point,
        current: Point,
    },
    Committed(Rect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Selecting,
    Committed,
}

impl GestureState {
    pub fn phase(&self) -> GesturePhase {
        match self {
            Self::Idle => GesturePhase::Idle,
            Self::Selecting { .. } => GesturePhase::Selecting,
            Self::Committed(_) => GesturePhase::Committed,
        }
    }
}

pub fn can_transition(from: GesturePhase, to: GesturePhase) -> bool {
    matches!(
        (from, to),
        (GesturePhase::Idle, GesturePhase::Selecting)
            | (GesturePhase::Committed, GesturePhase::Selecting)
            | (GesturePhase::Selecting, GesturePhase::Committed)
            | (GesturePhase::Committed, GesturePhase::Idle)
    ) || from == to
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Started { anchor: Point },
    Preview(Rect),
    Committed(Rect),
}

/// Turns pointer down/move/up into a single committed rectangle.
///
/// Points are expected in surface-local coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn phase(&self) -> GesturePhase {
        self.state.phase()
    }

    /// Rectangle spanning anchor to pointer while a drag is in progress.
    pub fn preview(&self) -> Option<Rect> {
        match self.state {
            GestureState::Selecting { anchor, current } => Some(Rect::from_corners(anchor, current)),
            _ => None,
        }
    }

    pub fn committed(&self) -> Option<Rect> {
        match self.state {
            GestureState::Committed(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn handle_pointer_down(&mut self, point: Point) -> GestureEvent {
        self.transition(GestureState::Selecting {
            anchor: point,
            current: point,
        });
        GestureEvent::Started { anchor: point }
    }

    pub fn handle_pointer_move(&mut self, point: Point) -> Option<GestureEvent> {
        match &mut self.state {
            GestureState::Selecting { anchor, current } => {
                *current = point;
                Some(GestureEvent::Preview(Rect::from_corners(*anchor, point)))
            }
            _ => None,
        }
    }

    pub fn handle_pointer_up(&mut self, point: Point) -> Option<GestureEvent> {
        let GestureState::Selecting { anchor, .. } = self.state else {
            return None;
        };
        let rect = Rect::from_corners(anchor, point);
        self.transition(GestureState::Committed(rect));
        Some(GestureEvent::Committed(rect))
    }

    /// Return to `Idle`, dropping any drag in progress or prior commit.
    pub fn reset(&mut self) {
        self.transition(GestureState::Idle);
    }

    fn transition(&mut self, next: GestureState) {
        let (from, to) = (self.state.phase(), next.phase());
        if !can_transition(from, to) {
            tracing::debug!(?from, ?to, "gesture transition outside the normal flow");
        }
        self.state = next;
    }
}
