use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::roi::model::{Color, OverlayStyle, StrokeStyle};

/// How submission treats input the backend may not be able to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Reject non-integer buffers and zero-area regions before sending.
    #[default]
    Strict,
    /// Send whatever the form holds; unparsable buffers become `null`.
    PassThrough,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the tabs backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Path prefix under which the backend serves generated files.
    #[serde(default = "default_static_base")]
    pub static_base: String,
    #[serde(default = "default_player_width")]
    pub player_width: f32,
    #[serde(default = "default_player_height")]
    pub player_height: f32,
    /// Timeout for backend calls. Processing downloads and scans the whole
    /// video, so this is generous.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub validation: ValidationPolicy,
    /// Opacity of the black mask drawn over the player while selecting.
    #[serde(default = "default_mask_alpha")]
    pub mask_alpha: f32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_static_base() -> String {
    "/static".into()
}

fn default_player_width() -> f32 {
    crate::youtube::DEFAULT_PLAYER_WIDTH
}

fn default_player_height() -> f32 {
    crate::youtube::DEFAULT_PLAYER_HEIGHT
}

fn default_request_timeout() -> u64 {
    600
}

fn default_mask_alpha() -> f32 {
    0.2
}

fn default_stroke_width() -> f32 {
    2.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            static_base: default_static_base(),
            player_width: default_player_width(),
            player_height: default_player_height(),
            request_timeout_secs: default_request_timeout(),
            validation: ValidationPolicy::default(),
            mask_alpha: default_mask_alpha(),
            stroke_width: default_stroke_width(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            mask: Color::black_with_opacity(self.mask_alpha),
            stroke: StrokeStyle {
                width: self.stroke_width,
                ..StrokeStyle::default()
            },
        }
    }

    /// Absolute URL for a backend-relative path, falling back to the path
    /// itself when the base URL is malformed.
    pub fn resolve_url(&self, path: &str) -> String {
        match Url::parse(&self.backend_url).and_then(|base| base.join(path)) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!("cannot resolve '{}' against '{}': {}", path, self.backend_url, e);
                path.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_validation_is_the_default() {
        assert_eq!(ValidationPolicy::default(), ValidationPolicy::Strict);
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.validation, ValidationPolicy::Strict);
    }

    #[test]
    fn resolve_url_uses_backend_origin() {
        let settings = Settings {
            backend_url: "http://tabs.local:9000/app/".into(),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolve_url("/static/out.pdf"),
            "http://tabs.local:9000/static/out.pdf"
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"validation":"pass_through","mask_alpha":0.5}"#).unwrap();
        assert_eq!(settings.validation, ValidationPolicy::PassThrough);
        assert_eq!(settings.mask_alpha, 0.5);
        assert_eq!(settings.static_base, "/static");
        assert_eq!(settings.player_width, 560.0);
    }

    #[test]
    fn overlay_style_uses_mask_alpha() {
        let settings = Settings::default();
        let style = settings.overlay_style();
        assert_eq!(style.mask.a, 51);
        assert_eq!(style.stroke.width, 2.0);
    }
}
