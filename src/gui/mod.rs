mod alert_dialog;
mod player_panel;

pub use alert_dialog::AlertDialog;
pub use player_panel::PlayerPanel;

use crate::api::TabsBackend;
use crate::roi::model::SurfaceSize;
use crate::session::RoiSession;
use crate::settings::Settings;
use crate::submission::{Notify, ResultView, SubmissionCoordinator, SubmissionForm};
use crate::video_loader::VideoLoader;
use eframe::egui;
use std::sync::Arc;
use std::time::Duration;

pub struct TabRoiApp {
    settings: Settings,
    backend: Arc<dyn TabsBackend>,
    session: RoiSession,
    loader: VideoLoader,
    coordinator: SubmissionCoordinator,
    form: SubmissionForm,
    alert: AlertDialog,
    player: PlayerPanel,
    player_container: egui::Rect,
}

impl TabRoiApp {
    pub fn new(settings: Settings, backend: Arc<dyn TabsBackend>) -> Self {
        let player_size = SurfaceSize::new(settings.player_width, settings.player_height);
        Self {
            session: RoiSession::new(settings.overlay_style()),
            loader: VideoLoader::new(player_size),
            coordinator: SubmissionCoordinator::new(settings.static_base.clone()),
            form: SubmissionForm::default(),
            alert: AlertDialog::default(),
            player: PlayerPanel::default(),
            player_container: egui::Rect::NOTHING,
            settings,
            backend,
        }
    }

    fn repaint_notifier(ctx: &egui::Context) -> Notify {
        let ctx = ctx.clone();
        Box::new(move || ctx.request_repaint())
    }

    fn url_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.label("YouTube URL");
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.form.video_url)
                    .desired_width(420.0)
                    .hint_text("https://www.youtube.com/watch?v=..."),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let load = ui.add_enabled(
                self.session.gates().can_load_video(),
                egui::Button::new("Load Video"),
            );
            if (load.clicked() || submitted) && self.session.gates().can_load_video() {
                self.request_load(ctx);
            }
            if self.loader.is_loading() {
                ui.spinner();
            }
        });
        if let Some(err) = self.loader.error() {
            ui.colored_label(egui::Color32::RED, err);
        }
    }

    fn request_load(&mut self, ctx: &egui::Context) {
        let notify = Self::repaint_notifier(ctx);
        if let Err(e) = self.loader.load(
            &mut self.session,
            &self.form.video_url,
            self.backend.clone(),
            notify,
        ) {
            self.alert.open_message(e.to_string());
        }
    }

    fn request_selection(&mut self) {
        let container = player_panel::to_frame(self.player_container);
        if let Err(e) = self.session.begin_selection(&container) {
            self.alert.open_message(e.to_string());
        }
    }

    fn request_submit(&mut self, ctx: &egui::Context) {
        let notify = Self::repaint_notifier(ctx);
        if let Err(e) = self.coordinator.submit(
            &self.session,
            &self.form,
            self.settings.validation,
            self.backend.clone(),
            notify,
        ) {
            tracing::debug!("submit not started: {}", e);
        }
    }

    fn roi_row(&mut self, ui: &mut egui::Ui) {
        if let Some(video) = self.session.video() {
            ui.horizontal(|ui| {
                ui.hyperlink_to(
                    format!("Video {}", video.video_id),
                    crate::youtube::watch_url(&video.video_id),
                );
                ui.hyperlink_to("Embed", video.embed_url());
                if let Some(thumb) = &video.thumbnail_url {
                    ui.hyperlink_to("Thumbnail", thumb);
                }
            });
        }
        ui.horizontal(|ui| {
            let select = ui.add_enabled(
                self.session.gates().can_select_roi(),
                egui::Button::new("Select ROI"),
            );
            if select.clicked() {
                self.request_selection();
            }
            if self.session.surface().is_visible() {
                ui.label("Drag over the video to mark the tab area");
            } else if let Some(roi) = self.session.selected_roi() {
                ui.label(format!(
                    "ROI: x={:.0} y={:.0} {:.0}\u{00D7}{:.0}",
                    roi.x, roi.y, roi.width, roi.height
                ));
            }
        });
    }

    fn submit_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.label("Start buffer (s)");
            ui.add(egui::TextEdit::singleline(&mut self.form.start_buffer).desired_width(48.0));
            ui.label("End buffer (s)");
            ui.add(egui::TextEdit::singleline(&mut self.form.end_buffer).desired_width(48.0));
            let submit = ui.add_enabled(
                self.session.gates().can_submit() && !self.coordinator.is_loading(),
                egui::Button::new("Generate Tabs"),
            );
            if submit.clicked() {
                self.request_submit(ctx);
            }
        });

        if self.coordinator.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                let secs = self
                    .coordinator
                    .elapsed()
                    .map(|d| d.num_seconds())
                    .unwrap_or(0);
                ui.label(format!("Processing video\u{2026} {secs}s"));
            });
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        match self.coordinator.result() {
            Some(ResultView::Success {
                message,
                download_path,
            }) => {
                ui.label(message);
                ui.hyperlink_to("Download PDF", self.settings.resolve_url(download_path));
            }
            Some(ResultView::Failure(text)) => {
                ui.colored_label(egui::Color32::RED, text);
            }
            None => {}
        }
    }
}

impl TabRoiApp {
    /// Draw one frame. Finished background work is applied first.
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.loader.poll(&mut self.session);
        self.coordinator.poll();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Guitar Tabs Generator");
            ui.add_space(6.0);
            self.url_row(ui, ctx);
            ui.add_space(6.0);

            let size = egui::vec2(self.settings.player_width, self.settings.player_height);
            self.player_container = self.player.show(ui, &mut self.session, size);
            ui.add_space(6.0);

            self.roi_row(ui);
            ui.separator();
            self.submit_row(ui, ctx);
        });

        self.alert.ui(ctx);
    }
}

impl eframe::App for TabRoiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}
