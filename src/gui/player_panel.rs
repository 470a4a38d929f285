use eframe::egui::{self, Color32, Pos2, Sense, Stroke};

use crate::roi::model::{Color, FrameRect, Point};
use crate::session::{RoiSession, VideoSession};
use crate::youtube;

pub fn to_frame(rect: egui::Rect) -> FrameRect {
    FrameRect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

fn to_egui(rect: FrameRect) -> egui::Rect {
    egui::Rect::from_min_size(
        Pos2::new(rect.left, rect.top),
        egui::vec2(rect.width, rect.height),
    )
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x, pos.y)
}

fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// The player area: the video still as backdrop, with the ROI overlay on top.
#[derive(Default)]
pub struct PlayerPanel {
    texture: Option<(String, egui::TextureHandle)>,
}

impl PlayerPanel {
    /// Upload the thumbnail of `video` once per video id.
    fn sync_texture(&mut self, ctx: &egui::Context, video: Option<&VideoSession>) {
        let Some((video, thumb)) = video.and_then(|v| v.thumbnail.as_ref().map(|t| (v, t))) else {
            self.texture = None;
            return;
        };
        if matches!(&self.texture, Some((id, _)) if *id == video.video_id) {
            return;
        }
        let tex = ctx.load_texture(
            format!("thumbnail-{}", video.video_id),
            egui::ColorImage::from_rgba_unmultiplied(thumb.size, thumb.rgba.as_slice()),
            egui::TextureOptions::LINEAR,
        );
        self.texture = Some((video.video_id.clone(), tex));
    }

    /// Lay out the player area, route pointer input to the overlay while it
    /// is active and paint the mask and preview on top.
    ///
    /// Returns the container rect the player was placed in.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        session: &mut RoiSession,
        size: egui::Vec2,
    ) -> egui::Rect {
        let container = ui.available_rect_before_wrap();
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        session.set_player_rect(to_frame(rect));
        self.sync_texture(ui.ctx(), session.video());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 4.0, Color32::from_gray(24));
        match (session.video(), &self.texture) {
            (Some(video), Some((_, tex))) => {
                painter.image(
                    tex.id(),
                    rect,
                    egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
                if session.surface().player_interactive() && response.clicked() {
                    open_watch_page(ui.ctx(), video);
                }
            }
            (Some(video), None) => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    format!("\u{25B6} {}", video.video_id),
                    egui::FontId::proportional(22.0),
                    Color32::WHITE,
                );
                if session.surface().player_interactive() && response.clicked() {
                    open_watch_page(ui.ctx(), video);
                }
            }
            (None, _) => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Load a video to begin",
                    egui::FontId::proportional(16.0),
                    Color32::GRAY,
                );
            }
        }

        if session.surface().is_visible() {
            route_pointer(ui.ctx(), session);
        }
        if let Some(scene) = session.scene() {
            painter.rect_filled(to_egui(scene.bounds), 0.0, to_color32(scene.mask));
            if let Some((preview, stroke)) = scene.preview {
                painter.rect_stroke(
                    to_egui(preview),
                    0.0,
                    Stroke::new(stroke.width, to_color32(stroke.color)),
                );
            }
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }

        container
    }
}

fn open_watch_page(ctx: &egui::Context, video: &VideoSession) {
    ctx.open_url(egui::OpenUrl::new_tab(youtube::watch_url(&video.video_id)));
}

/// Replay this frame's pointer events in arrival order, so a press and a
/// release landing in the same frame still form a gesture.
fn route_pointer(ctx: &egui::Context, session: &mut RoiSession) {
    let events = ctx.input(|i| i.events.clone());
    for event in events {
        match event {
            egui::Event::PointerMoved(pos) => {
                session.pointer_move(to_point(pos));
            }
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => {
                if pressed {
                    session.pointer_down(to_point(pos));
                } else {
                    session.pointer_up(to_point(pos));
                }
            }
            _ => {}
        }
    }
}
