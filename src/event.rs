use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::http::TransportResult;
use crate::model::SketchStyle;

/// A file as handed over by the shell (picker change event or drag-drop).
/// Carries the browser-declared MIME type; `media::validate_upload` decides
/// whether to trust it.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    pub mime: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

// Redact debug output: raw user image bytes must not hit logs.
impl fmt::Debug for IncomingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Everything the shell (or a capability completion) can tell the core.
/// Large payloads are boxed to keep the enum small.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Style picker
    StyleSelected {
        style: SketchStyle,
    },

    // File intake
    FilePicked {
        file: Box<IncomingFile>,
    },
    FilesDropped {
        files: Vec<IncomingFile>,
    },
    DragEntered,
    DragLeft,

    // Upload pipeline (capability completions carry the generation token
    // they were armed with; stale ones are discarded)
    PacingElapsed {
        token: u64,
    },
    UploadCompleted {
        token: u64,
        result: Box<TransportResult>,
    },
    CaptionTick {
        token: u64,
    },

    // Results
    DownloadRequested,
    ResetRequested,
    EnhanceRequested,

    // Ambient UI
    AnchorClicked {
        href: String,
    },
    AlertDismissed,
}

impl Event {
    /// Short stable name for tracing.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StyleSelected { .. } => "style_selected",
            Self::FilePicked { .. } => "file_picked",
            Self::FilesDropped { .. } => "files_dropped",
            Self::DragEntered => "drag_entered",
            Self::DragLeft => "drag_left",
            Self::PacingElapsed { .. } => "pacing_elapsed",
            Self::UploadCompleted { .. } => "upload_completed",
            Self::CaptionTick { .. } => "caption_tick",
            Self::DownloadRequested => "download_requested",
            Self::ResetRequested => "reset_requested",
            Self::EnhanceRequested => "enhance_requested",
            Self::AnchorClicked { .. } => "anchor_clicked",
            Self::AlertDismissed => "alert_dismissed",
        }
    }
}
