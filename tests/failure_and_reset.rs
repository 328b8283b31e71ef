use crux_core::testing::AppTester;
use crux_core::App as _;

use pencilart_core::capabilities::{TransportError, TransportResponse};
use pencilart_core::{
    AlertKind, App, Effect, Event, FlowPhase, IncomingFile, Model, PanelVisibility,
};

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

fn png_file(name: &str) -> IncomingFile {
    IncomingFile::new(name, "image/png", PNG_MAGIC.to_vec())
}

/// Drive the flow to `Uploading` and return the in-flight token.
fn drive_to_uploading(app: &AppTester<App, Effect>, model: &mut Model) -> u64 {
    app.update(
        Event::FilePicked {
            file: Box::new(png_file("cat.png")),
        },
        model,
    );
    app.update(
        Event::PacingElapsed {
            token: model.flow_token,
        },
        model,
    );
    assert_eq!(model.phase, FlowPhase::Uploading);
    model.flow_token
}

#[test]
fn rejected_type_surfaces_alert_without_view_change() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let before = PanelVisibility::for_phase(model.phase);

    app.update(
        Event::FilePicked {
            file: Box::new(IncomingFile::new(
                "doc.pdf",
                "application/pdf",
                PNG_MAGIC.to_vec(),
            )),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(model.pending.is_none());
    let alert = model.active_alert.as_ref().expect("validation alert");
    assert_eq!(alert.kind, AlertKind::Validation);
    assert!(alert.message.contains("valid image file"));
    assert_eq!(PanelVisibility::for_phase(model.phase), before);
}

#[test]
fn oversize_file_surfaces_alert_without_view_change() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let cap = model.config.max_upload_bytes;

    let mut bytes = PNG_MAGIC.to_vec();
    bytes.resize(cap + 1, 0);
    app.update(
        Event::FilePicked {
            file: Box::new(IncomingFile::new("huge.png", "image/png", bytes)),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(model.pending.is_none());
    let alert = model.active_alert.as_ref().expect("validation alert");
    assert!(alert.message.contains("less than 16MB"));
}

#[test]
fn application_failure_returns_to_upload_view_with_verbatim_message() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    let response = TransportResponse {
        status: 400,
        body: br#"{"success": false, "error": "bad image"}"#.to_vec(),
    };
    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(model.result.is_none());
    assert!(model.pending.is_none());

    let alert = model.active_alert.as_ref().expect("failure alert");
    assert_eq!(alert.kind, AlertKind::UploadFailure);
    assert!(alert.message.starts_with("Error: "));
    assert!(alert.message.contains("bad image"));

    let view = App::default().view(&model);
    assert!(view.visibility.upload);
    assert!(!view.visibility.loading);
    assert!(!view.visibility.results);
}

#[test]
fn transport_failure_takes_the_same_path() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Err(TransportError::Failed {
                message: "connection refused".into(),
            })),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle);
    let alert = model.active_alert.as_ref().expect("failure alert");
    assert!(alert.message.contains("connection refused"));
}

#[test]
fn malformed_body_takes_the_same_path() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    let response = TransportResponse {
        status: 502,
        body: b"<html>Bad Gateway</html>".to_vec(),
    };
    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(model.result.is_none());
    let alert = model.active_alert.as_ref().expect("failure alert");
    assert!(alert.message.starts_with("Error: "));
}

#[test]
fn success_without_image_references_is_a_failure() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    let response = TransportResponse {
        status: 200,
        body: br#"{"success": true}"#.to_vec(),
    };
    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(model.result.is_none());
}

#[test]
fn late_response_after_reset_is_discarded() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    app.update(Event::ResetRequested, &mut model);
    assert_eq!(model.phase, FlowPhase::Idle);

    let response = TransportResponse {
        status: 200,
        body: br#"{"success": true, "original": "data:o", "sketch": "data:s"}"#.to_vec(),
    };
    let update = app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert_eq!(model.phase, FlowPhase::Idle, "late response must not resurrect the flow");
    assert!(model.result.is_none());
    assert!(update.effects.is_empty());
}

#[test]
fn stale_caption_tick_after_settle_is_discarded() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Err(TransportError::Failed {
                message: "timeout".into(),
            })),
        },
        &mut model,
    );

    let update = app.update(Event::CaptionTick { token }, &mut model);
    assert_eq!(model.caption_index, 0);
    assert!(update.effects.is_empty());
}

#[test]
fn reset_clears_result_and_scrolls_back() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let token = drive_to_uploading(&app, &mut model);

    let response = TransportResponse {
        status: 200,
        body: br#"{"success": true, "original": "data:o", "sketch": "data:s"}"#.to_vec(),
    };
    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );
    assert!(model.result.is_some());

    let update = app.update(Event::ResetRequested, &mut model);
    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(model.result.is_none());
    assert!(model.pending.is_none());
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Scroll(_))));

    // Idempotent: a second reset is a no-op apart from the scroll.
    let update = app.update(Event::ResetRequested, &mut model);
    assert_eq!(model.phase, FlowPhase::Idle);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn download_saves_only_when_a_result_exists() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // No result yet: no-op.
    let update = app.update(Event::DownloadRequested, &mut model);
    assert!(
        !update.effects.iter().any(|e| matches!(e, Effect::FileSaver(_))),
        "download without a result must be a no-op"
    );

    let token = drive_to_uploading(&app, &mut model);
    let response = TransportResponse {
        status: 200,
        body: br#"{"success": true, "original": "data:o", "sketch": "data:s"}"#.to_vec(),
    };
    app.update(
        Event::UploadCompleted {
            token,
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    let update = app.update(Event::DownloadRequested, &mut model);
    let save = update
        .effects
        .iter()
        .find_map(|e| match e {
            Effect::FileSaver(req) => Some(&req.operation),
            _ => None,
        })
        .expect("save requested");
    assert_eq!(save.source, "data:s");
    assert!(save.file_name.starts_with("sketch-"));
    assert!(save.file_name.ends_with(".png"));
    let digits = &save.file_name["sketch-".len()..save.file_name.len() - ".png".len()];
    assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()));

    // After reset the stored result is gone, so download is a no-op again.
    app.update(Event::ResetRequested, &mut model);
    let update = app.update(Event::DownloadRequested, &mut model);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::FileSaver(_))));
}

#[test]
fn ambient_affordances() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // Same-page anchors scroll; anything else is ignored.
    let update = app.update(
        Event::AnchorClicked {
            href: "#how-it-works".into(),
        },
        &mut model,
    );
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Scroll(_))));

    let update = app.update(
        Event::AnchorClicked {
            href: "https://elsewhere.example".into(),
        },
        &mut model,
    );
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Scroll(_))));

    // Enhance is a placeholder alert; dismissal clears it.
    app.update(Event::EnhanceRequested, &mut model);
    let alert = model.active_alert.as_ref().expect("info alert");
    assert_eq!(alert.kind, AlertKind::Info);
    assert!(alert.message.contains("coming soon"));

    app.update(Event::AlertDismissed, &mut model);
    assert!(model.active_alert.is_none());
}
