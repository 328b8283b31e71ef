use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::http::UploadEndpoint;
use crate::{CAPTION_INTERVAL_MS, DEFAULT_ENDPOINT, MAX_UPLOAD_BYTES, PACING_DELAY_MS};

/// Render styles the conversion server accepts. The identifier string is the
/// wire value of the `style` form field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SketchStyle {
    #[default]
    Classic,
    Colored,
}

impl SketchStyle {
    pub const ALL: [SketchStyle; 2] = [SketchStyle::Classic, SketchStyle::Colored];

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "pencil" => Some(Self::Classic),
            "colored" | "coloured" | "color" => Some(Self::Colored),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Colored => "colored",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Classic => "Classic Pencil",
            Self::Colored => "Colored Pencil",
        }
    }
}

impl fmt::Display for SketchStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the flow currently is. Linear with one error branch:
/// `Idle → StyleChosen → Uploading → {Results | Idle}`, and `Results → Idle`
/// via reset. There is no terminal state; the page session ends externally.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    #[default]
    Idle,
    StyleChosen,
    Uploading,
    Results,
}

impl FlowPhase {
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Uploading)
    }
}

/// A validated image held between acceptance and upload. Constructed only by
/// `media::validate_upload`, so holding one implies the whitelist and size
/// checks already passed.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PendingImage {
    file_name: String,
    mime: String,
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
}

impl PendingImage {
    pub(crate) fn new(file_name: String, mime: String, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

// Redact debug output: user-provided image content must not hit logs.
impl fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// The two image references returned by a successful conversion. Both are
/// opaque to the core (URLs or data references, the shell renders them).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SketchResult {
    pub original: String,
    pub sketch: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Validation,
    UploadFailure,
    Info,
}

/// A blocking user-facing message. At most one at a time; further
/// interaction is expected to wait until the shell reports dismissal.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Validation,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn upload_failure(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::UploadFailure,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            message: message.into(),
        }
    }
}

/// Tunables for the flow. The pacing delay is a UX decision, not a
/// correctness requirement, so it lives here rather than in a constant the
/// shell cannot reach.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FlowConfig {
    pub endpoint: UploadEndpoint,
    pub pacing_delay_ms: u64,
    pub caption_interval_ms: u64,
    pub max_upload_bytes: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            endpoint: UploadEndpoint::new(DEFAULT_ENDPOINT)
                .expect("default endpoint constant must be valid"),
            pacing_delay_ms: PACING_DELAY_MS,
            caption_interval_ms: CAPTION_INTERVAL_MS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// All state owned by the core. Process-local to one page session; nothing
/// here persists across reloads.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Model {
    pub phase: FlowPhase,
    pub selected_style: SketchStyle,

    /// Held between acceptance and the upload response. `Some` exactly in
    /// `StyleChosen` and `Uploading`.
    pub pending: Option<PendingImage>,

    /// `Some` exactly in `Results`.
    pub result: Option<SketchResult>,

    pub drag_active: bool,
    pub caption_index: usize,

    /// Generation counter for in-flight async work (pacing timer, caption
    /// timer, upload response). Bumped on every transition that invalidates
    /// them; completions carrying an older value are discarded.
    pub flow_token: u64,

    pub active_alert: Option<Alert>,

    pub config: FlowConfig,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: FlowConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Advance the generation counter, invalidating every outstanding timer
    /// and response, and return the new value.
    pub fn next_token(&mut self) -> u64 {
        self.flow_token = self.flow_token.wrapping_add(1);
        self.flow_token
    }

    pub fn set_alert(&mut self, alert: Alert) {
        self.active_alert = Some(alert);
    }

    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_classic() {
        assert_eq!(SketchStyle::default(), SketchStyle::Classic);
        assert_eq!(Model::new().selected_style, SketchStyle::Classic);
    }

    #[test]
    fn style_round_trips_through_identifier() {
        for style in SketchStyle::ALL {
            assert_eq!(SketchStyle::from_str(style.as_str()), Some(style));
        }
        assert_eq!(SketchStyle::from_str("COLORED"), Some(SketchStyle::Colored));
        assert_eq!(SketchStyle::from_str("charcoal"), None);
        assert_eq!(SketchStyle::from_str(""), None);
    }

    #[test]
    fn initial_phase_is_idle() {
        let model = Model::new();
        assert_eq!(model.phase, FlowPhase::Idle);
        assert!(model.pending.is_none());
        assert!(model.result.is_none());
        assert!(!model.phase.is_busy());
    }

    #[test]
    fn token_strictly_advances() {
        let mut model = Model::new();
        let a = model.next_token();
        let b = model.next_token();
        assert!(b > a);
    }

    #[test]
    fn pending_image_debug_is_redacted() {
        let pending = PendingImage::new("cat.png".into(), "image/png".into(), vec![1, 2, 3]);
        let debug = format!("{pending:?}");
        assert!(debug.contains("cat.png"));
        assert!(debug.contains("size_bytes"));
        assert!(!debug.contains("[1, 2, 3]"));
    }

    #[test]
    fn default_config_uses_flow_constants() {
        let config = FlowConfig::default();
        assert_eq!(config.pacing_delay_ms, PACING_DELAY_MS);
        assert_eq!(config.caption_interval_ms, CAPTION_INTERVAL_MS);
        assert_eq!(config.max_upload_bytes, MAX_UPLOAD_BYTES);
    }
}
