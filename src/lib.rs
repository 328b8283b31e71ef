#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod event;
pub mod media;
pub mod model;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::{Event, IncomingFile};
pub use model::{
    Alert, AlertKind, FlowConfig, FlowPhase, Model, PendingImage, SketchResult, SketchStyle,
};

/// Upload size cap; must match the server's `MAX_CONTENT_LENGTH`.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Pause between revealing the style picker and dispatching the upload, so
/// the user registers that styles exist. UX pacing, not correctness.
pub const PACING_DELAY_MS: u64 = 500;

/// Loading caption rotation period.
pub const CAPTION_INTERVAL_MS: u64 = 2_000;

/// Dev server of the conversion backend.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

pub const DOWNLOAD_PREFIX: &str = "sketch-";
pub const DOWNLOAD_EXTENSION: &str = ".png";

pub const LOADING_MESSAGES: [&str; 5] = [
    "Creating your masterpiece...",
    "Applying artistic touches...",
    "Converting to sketch...",
    "Adding pencil strokes...",
    "Almost there...",
];

pub const MSG_INVALID_TYPE: &str =
    "Please upload a valid image file (JPG, PNG, BMP, TIFF, WEBP)";
pub const MSG_FILE_TOO_LARGE: &str = "File size must be less than 16MB";
pub const MSG_PROCESSING_FAILED: &str = "Failed to process image";
pub const MSG_ENHANCE_PLACEHOLDER: &str = "Enhancement features coming soon!\n\nFuture options:\n- Adjust sketch intensity\n- Add custom filters\n- Multiple style combinations\n- Advanced enhancements";

/// Prefix for surfaced upload failures.
pub const ERROR_PREFIX: &str = "Error: ";

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Name for the synthesized download, e.g. `sketch-1722950400000.png`.
#[must_use]
pub fn download_file_name(now_ms: u64) -> String {
    format!("{DOWNLOAD_PREFIX}{now_ms}{DOWNLOAD_EXTENSION}")
}

/// Which of the four panels the shell should show. Derived from the flow
/// phase, so the "one primary panel" convention is structural rather than a
/// set of independently toggled flags.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelVisibility {
    pub upload: bool,
    pub style_picker: bool,
    pub loading: bool,
    pub results: bool,
}

impl PanelVisibility {
    #[must_use]
    pub const fn for_phase(phase: FlowPhase) -> Self {
        Self {
            upload: matches!(phase, FlowPhase::Idle | FlowPhase::StyleChosen),
            style_picker: matches!(phase, FlowPhase::StyleChosen),
            loading: matches!(phase, FlowPhase::Uploading),
            results: matches!(phase, FlowPhase::Results),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleOptionView {
    pub id: String,
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultsView {
    pub original: String,
    pub sketch: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertView {
    pub kind: AlertKind,
    pub message: String,
}

impl From<&Alert> for AlertView {
    fn from(alert: &Alert) -> Self {
        Self {
            kind: alert.kind,
            message: alert.message.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub visibility: PanelVisibility,
    pub styles: Vec<StyleOptionView>,
    pub selected_style: SketchStyle,
    pub drag_active: bool,
    pub pending_file_name: Option<String>,
    pub loading_caption: Option<String>,
    pub results: Option<ResultsView>,
    pub alert: Option<AlertView>,
}

pub mod app {
    use tracing::{debug, warn};

    use crate::capabilities::http::{into_transport_result, UploadResponse, FIELD_IMAGE, FIELD_STYLE};
    use crate::capabilities::{Capabilities, MultipartForm, ScrollAlign, ScrollTarget, TransportResponse};
    use crate::event::{Event, IncomingFile};
    use crate::media::{self, MediaError};
    use crate::model::{Alert, FlowPhase, Model, SketchResult};
    use crate::{
        download_file_name, get_current_time_ms, AlertView, PanelVisibility, ResultsView,
        StyleOptionView, ViewModel, ERROR_PREFIX, LOADING_MESSAGES, MSG_FILE_TOO_LARGE,
        MSG_INVALID_TYPE, MSG_PROCESSING_FAILED, MSG_ENHANCE_PLACEHOLDER,
    };

    #[derive(Default)]
    pub struct App;

    impl App {
        /// File intake from either the picker or the drop zone. Rejection
        /// leaves every flow field untouched; acceptance reveals the style
        /// picker and arms the pacing delay.
        fn intake(file: IncomingFile, model: &mut Model, caps: &Capabilities) {
            if model.phase.is_busy() {
                // Single-flight: the upload control is only visually hidden
                // in the shell, so the guard lives here.
                warn!(name = %file.name, "upload in flight, ignoring file intake");
                caps.render.render();
                return;
            }

            match media::validate_upload(file, model.config.max_upload_bytes) {
                Ok(pending) => {
                    debug!(name = %pending.file_name(), size = pending.size_bytes(), "file accepted");
                    model.pending = Some(pending);
                    model.phase = FlowPhase::StyleChosen;
                    let token = model.next_token();
                    caps.timer
                        .delay(model.config.pacing_delay_ms, Event::PacingElapsed { token });
                }
                Err(e) => {
                    model.set_alert(Alert::validation(Self::intake_error_message(&e)));
                }
            }

            caps.render.render();
        }

        fn intake_error_message(error: &MediaError) -> &'static str {
            match error {
                MediaError::TooLarge { .. } => MSG_FILE_TOO_LARGE,
                MediaError::UnsupportedType { .. }
                | MediaError::Empty
                | MediaError::UnrecognizedContent => MSG_INVALID_TYPE,
            }
        }

        /// Switch to the loading view and dispatch `POST /upload`. Every
        /// async completion armed here carries the fresh token, so a reset
        /// or failure in the meantime orphans them all at once.
        fn begin_upload(model: &mut Model, caps: &Capabilities) {
            let (file_name, mime, bytes) = match &model.pending {
                Some(pending) => (
                    pending.file_name().to_string(),
                    pending.mime().to_string(),
                    pending.bytes().to_vec(),
                ),
                None => {
                    warn!("no pending file at upload time, returning to idle");
                    model.phase = FlowPhase::Idle;
                    caps.render.render();
                    return;
                }
            };

            model.phase = FlowPhase::Uploading;
            model.caption_index = 0;
            let token = model.next_token();

            let form = MultipartForm::new()
                .file(FIELD_IMAGE, &file_name, &mime, &bytes)
                .text(FIELD_STYLE, model.selected_style.as_str());
            let content_type = form.content_type();
            let url = model.config.endpoint.upload_url();

            debug!(%url, style = %model.selected_style, size = bytes.len(), "dispatching upload");

            caps.http
                .post(&url)
                .header("content-type", content_type.as_str())
                .body_bytes(form.finish())
                .send(move |result| Event::UploadCompleted {
                    token,
                    result: Box::new(into_transport_result(result)),
                });

            caps.timer.delay(
                model.config.caption_interval_ms,
                Event::CaptionTick { token },
            );

            caps.render.render();
        }

        fn settle_upload(response: &TransportResponse, model: &mut Model, caps: &Capabilities) {
            debug!(status = response.status, "upload settled");

            match UploadResponse::parse(&response.body) {
                Ok(parsed) if parsed.success => match (parsed.original, parsed.sketch) {
                    (Some(original), Some(sketch)) => {
                        Self::apply_result(SketchResult { original, sketch }, model, caps);
                    }
                    _ => Self::fail_upload(MSG_PROCESSING_FAILED.to_string(), model, caps),
                },
                Ok(parsed) => {
                    let message = parsed
                        .error
                        .unwrap_or_else(|| MSG_PROCESSING_FAILED.to_string());
                    Self::fail_upload(message, model, caps);
                }
                Err(e) => Self::fail_upload(e.to_string(), model, caps),
            }
        }

        fn apply_result(result: SketchResult, model: &mut Model, caps: &Capabilities) {
            model.result = Some(result);
            model.pending = None;
            model.phase = FlowPhase::Results;
            model.next_token();

            caps.scroll
                .scroll_to(ScrollTarget::Results, ScrollAlign::Center);
            caps.render.render();
        }

        /// Uniform failure path for transport errors, malformed bodies and
        /// `success:false`: back to the start, message surfaced verbatim
        /// behind the prefix. No retry.
        fn fail_upload(message: String, model: &mut Model, caps: &Capabilities) {
            warn!(%message, "upload failed");

            model.phase = FlowPhase::Idle;
            model.pending = None;
            model.caption_index = 0;
            model.next_token();
            model.set_alert(Alert::upload_failure(format!("{ERROR_PREFIX}{message}")));

            caps.render.render();
        }

        fn is_current(token: u64, expected_phase: FlowPhase, model: &Model) -> bool {
            token == model.flow_token && model.phase == expected_phase
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), "handling event");

            match event {
                Event::StyleSelected { style } => {
                    debug!(%style, "style selected");
                    model.selected_style = style;
                    caps.render.render();
                }

                Event::FilePicked { file } => {
                    Self::intake(*file, model, caps);
                }

                Event::FilesDropped { files } => {
                    model.drag_active = false;

                    let mut files = files.into_iter();
                    match files.next() {
                        Some(file) => {
                            let extra = files.len();
                            if extra > 0 {
                                warn!(extra, "multiple files dropped, taking the first");
                            }
                            Self::intake(file, model, caps);
                        }
                        None => caps.render.render(),
                    }
                }

                Event::DragEntered => {
                    model.drag_active = true;
                    caps.render.render();
                }

                Event::DragLeft => {
                    model.drag_active = false;
                    caps.render.render();
                }

                Event::PacingElapsed { token } => {
                    if !Self::is_current(token, FlowPhase::StyleChosen, model) {
                        debug!(token, "discarding stale pacing timer");
                        return;
                    }
                    Self::begin_upload(model, caps);
                }

                Event::UploadCompleted { token, result } => {
                    if !Self::is_current(token, FlowPhase::Uploading, model) {
                        // A reset or failure already moved the flow on; a
                        // late response must not resurrect it.
                        debug!(token, "discarding stale upload completion");
                        return;
                    }

                    match *result {
                        Ok(response) => Self::settle_upload(&response, model, caps),
                        Err(e) => Self::fail_upload(e.to_string(), model, caps),
                    }
                }

                Event::CaptionTick { token } => {
                    if !Self::is_current(token, FlowPhase::Uploading, model) {
                        debug!(token, "discarding stale caption tick");
                        return;
                    }

                    model.caption_index = (model.caption_index + 1) % LOADING_MESSAGES.len();
                    caps.timer.delay(
                        model.config.caption_interval_ms,
                        Event::CaptionTick { token },
                    );
                    caps.render.render();
                }

                Event::DownloadRequested => match &model.result {
                    Some(result) => {
                        let file_name = download_file_name(get_current_time_ms());
                        debug!(%file_name, "saving sketch");
                        caps.file_saver.save(file_name, result.sketch.clone());
                    }
                    None => {
                        debug!("download requested with no result, ignoring");
                    }
                },

                Event::ResetRequested => {
                    model.result = None;
                    model.pending = None;
                    model.phase = FlowPhase::Idle;
                    model.drag_active = false;
                    model.caption_index = 0;
                    model.next_token();

                    caps.scroll
                        .scroll_to(ScrollTarget::UploadArea, ScrollAlign::Center);
                    caps.render.render();
                }

                Event::EnhanceRequested => {
                    model.set_alert(Alert::info(MSG_ENHANCE_PLACEHOLDER));
                    caps.render.render();
                }

                Event::AnchorClicked { href } => match href.strip_prefix('#') {
                    Some(id) if !id.is_empty() => {
                        caps.scroll
                            .scroll_to(ScrollTarget::Anchor(id.to_string()), ScrollAlign::Nearest);
                    }
                    _ => {
                        debug!(%href, "ignoring non-anchor navigation");
                    }
                },

                Event::AlertDismissed => {
                    model.active_alert = None;
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let styles = crate::SketchStyle::ALL
                .iter()
                .map(|style| StyleOptionView {
                    id: style.as_str().to_string(),
                    label: style.display_name().to_string(),
                    active: *style == model.selected_style,
                })
                .collect();

            let loading_caption = (model.phase == FlowPhase::Uploading)
                .then(|| LOADING_MESSAGES[model.caption_index % LOADING_MESSAGES.len()].to_string());

            ViewModel {
                visibility: PanelVisibility::for_phase(model.phase),
                styles,
                selected_style: model.selected_style,
                drag_active: model.drag_active,
                pending_file_name: model.pending.as_ref().map(|p| p.file_name().to_string()),
                loading_caption,
                results: model.result.as_ref().map(|r| ResultsView {
                    original: r.original.clone(),
                    sketch: r.sketch.clone(),
                }),
                alert: model.active_alert.as_ref().map(AlertView::from),
            }
        }
    }
}
