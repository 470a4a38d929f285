use crate::roi::model::{Color, FrameRect, OverlayStyle, Point, Rect, StrokeStyle, SurfaceSize};
use crate::roi::RoiError;

/// Drawing layer stacked on top of the video player.
///
/// Geometry is captured once per [`OverlaySurface::activate`] call; reloading
/// the player makes it stale, so callers must activate again afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySurface {
    page_origin: Point,
    offset: Point,
    size: SurfaceSize,
    visible: bool,
    player_interactive: bool,
    style: OverlayStyle,
}

/// Shapes to paint for the current frame, in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayScene {
    pub bounds: FrameRect,
    pub mask: Color,
    pub preview: Option<(FrameRect, StrokeStyle)>,
}

impl Default for OverlaySurface {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

impl OverlaySurface {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            page_origin: Point::default(),
            offset: Point::default(),
            size: SurfaceSize::default(),
            visible: false,
            player_interactive: true,
            style,
        }
    }

    /// Lock the overlay onto the player's rendered rectangle and show the mask.
    ///
    /// `container` is the box the player is laid out in; the overlay offset is
    /// recorded relative to it.
    pub fn activate(
        &mut self,
        player: Option<&FrameRect>,
        container: &FrameRect,
    ) -> Result<(), RoiError> {
        let Some(player) = player else {
            tracing::warn!("ROI selection requested with no video loaded");
            return Err(RoiError::NoVideoLoaded);
        };

        self.page_origin = player.origin();
        self.offset = Point::new(player.left - container.left, player.top - container.top);
        self.size = player.size();
        self.visible = true;
        self.player_interactive = false;
        tracing::debug!(
            offset_x = self.offset.x,
            offset_y = self.offset.y,
            width = self.size.width,
            height = self.size.height,
            "overlay activated"
        );
        Ok(())
    }

    /// Hide the mask and hand pointer input back to the player.
    pub fn deactivate(&mut self) {
        self.visible = false;
        self.player_interactive = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn player_interactive(&self) -> bool {
        self.player_interactive
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Convert a window-space pointer position to surface-local coordinates.
    pub fn to_local(&self, page: Point) -> Point {
        Point::new(page.x - self.page_origin.x, page.y - self.page_origin.y)
    }

    pub fn contains_page_point(&self, page: Point) -> bool {
        self.visible && self.bounds().contains(page)
    }

    fn bounds(&self) -> FrameRect {
        FrameRect::new(
            self.page_origin.x,
            self.page_origin.y,
            self.size.width,
            self.size.height,
        )
    }

    /// Mask over the full surface plus, when a drag is in progress, the
    /// stroked preview rectangle. Returns `None` while hidden.
    pub fn scene(&self, preview: Option<Rect>) -> Option<OverlayScene> {
        if !self.visible {
            return None;
        }
        let preview = preview.map(|rect| {
            (
                FrameRect::new(
                    self.page_origin.x + rect.x,
                    self.page_origin.y + rect.y,
                    rect.width,
                    rect.height,
                ),
                self.style.stroke,
            )
        });
        Some(OverlayScene {
            bounds: self.bounds(),
            mask: self.style.mask,
            preview,
        })
    }
}
