use eframe::egui;

/// Blocking notice shown when an action's precondition is not met.
#[derive(Default)]
pub struct AlertDialog {
    pub open: bool,
    msg: String,
}

impl AlertDialog {
    pub fn open_message(&mut self, msg: impl Into<String>) {
        self.msg = msg.into();
        self.open = true;
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }
        let mut open_val = self.open;
        let mut close = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .open(&mut open_val)
            .show(ctx, |ui| {
                ui.label(&self.msg);
                if ui.button("OK").clicked() {
                    close = true;
                }
            });
        if close {
            open_val = false;
        }
        self.open = open_val;
    }
}
