//! End-to-end orchestration over mocked transport and publisher: refresh
//! populates the snapshot, intents drive an edit session, save publishes.

use gallery_sync::contract::{
    BitmapState, HttpResponse, MockHttpTransport, MockImagePublisher, PublishError, UploadReceipt,
};
use gallery_sync::gallery::{GalleryError, GalleryOrchestrator};

const GALLERY_ENDPOINT: &str = "https://gallery.example.com/image";
const GOOD_URL: &str = "https://img/good.png";
const BAD_URL: &str = "https://img/bad.png";

fn gallery_index() -> Vec<u8> {
    format!(
        r#"[
            {{"url": "{GOOD_URL}", "created": "Jun 11, 2023 3:04:05 PM", "updated": "Jun 11, 2023 3:04:05 PM"}},
            {{"url": "{BAD_URL}", "created": "Jun 12, 2023 1:00:00 PM", "updated": "Jun 12, 2023 1:00:00 PM"}}
        ]"#
    )
    .into_bytes()
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(60, 40, image::Rgba([90, 140, 190, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Transport where one of two assets 404s; used by most tests here.
fn partial_gallery_transport() -> MockHttpTransport {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_get()
        .withf(|url| url == GALLERY_ENDPOINT)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 200,
                body: gallery_index(),
            })
        });
    transport
        .expect_get()
        .withf(|url| url == GOOD_URL)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 200,
                body: png_bytes(),
            })
        });
    transport
        .expect_get()
        .withf(|url| url == BAD_URL)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 404,
                body: b"gone".to_vec(),
            })
        });
    transport
}

#[tokio::test]
async fn refresh_populates_two_entries_one_selectable() {
    let mut orchestrator = GalleryOrchestrator::new(
        partial_gallery_transport(),
        MockImagePublisher::new(),
        GALLERY_ENDPOINT,
    );
    orchestrator.refresh().await.unwrap();

    assert_eq!(orchestrator.entries().len(), 2);
    assert_eq!(orchestrator.selectable_entries().count(), 1);
    assert!(orchestrator.entries()[0].is_selectable());
    assert!(matches!(
        orchestrator.entries()[1].bitmap,
        BitmapState::Unavailable
    ));
}

#[tokio::test]
async fn selecting_an_unavailable_entry_is_refused() {
    let mut orchestrator = GalleryOrchestrator::new(
        partial_gallery_transport(),
        MockImagePublisher::new(),
        GALLERY_ENDPOINT,
    );
    orchestrator.refresh().await.unwrap();

    let unavailable_id = orchestrator.entries()[1].id;
    let err = orchestrator.select(unavailable_id).unwrap_err();
    assert!(matches!(err, GalleryError::NotSelectable(id) if id == unavailable_id));
    assert!(orchestrator.session().is_none());

    let unknown = uuid::Uuid::new_v4();
    assert!(matches!(
        orchestrator.select(unknown),
        Err(GalleryError::UnknownEntry(_))
    ));
}

#[tokio::test]
async fn save_composes_the_session_and_reports_the_receipt() {
    let mut publisher = MockImagePublisher::new();
    publisher
        .expect_publish()
        .withf(|artifact, original| {
            // Artifact keeps the source dimensions; original URL rides along.
            artifact.width() == 60 && artifact.height() == 40 && original == GOOD_URL
        })
        .times(1)
        .returning(|_, _| {
            Ok(UploadReceipt {
                status: 200,
                body: r#"{"ok": true}"#.to_string(),
            })
        });

    let mut orchestrator =
        GalleryOrchestrator::new(partial_gallery_transport(), publisher, GALLERY_ENDPOINT);
    orchestrator.refresh().await.unwrap();

    let good_id = orchestrator.entries()[0].id;
    orchestrator.select(good_id).unwrap();
    orchestrator.apply_filter().unwrap();
    orchestrator.set_overlay_text("hello").unwrap();
    orchestrator.toggle_overlay(true).unwrap();
    assert!(orchestrator.session().unwrap().has_filter());

    let receipt = orchestrator.save().await.unwrap();
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, r#"{"ok": true}"#);
}

#[tokio::test]
async fn remove_filter_reverts_to_the_base_image() {
    let mut orchestrator = GalleryOrchestrator::new(
        partial_gallery_transport(),
        MockImagePublisher::new(),
        GALLERY_ENDPOINT,
    );
    orchestrator.refresh().await.unwrap();
    let good_id = orchestrator.entries()[0].id;
    orchestrator.select(good_id).unwrap();

    orchestrator.apply_filter().unwrap();
    assert!(orchestrator.session().unwrap().has_filter());
    orchestrator.remove_filter().unwrap();
    assert!(!orchestrator.session().unwrap().has_filter());
}

#[tokio::test]
async fn intents_without_a_session_are_refused() {
    let mut orchestrator = GalleryOrchestrator::new(
        MockHttpTransport::new(),
        MockImagePublisher::new(),
        GALLERY_ENDPOINT,
    );
    assert!(matches!(
        orchestrator.apply_filter(),
        Err(GalleryError::NoActiveSession)
    ));
    assert!(matches!(
        orchestrator.set_overlay_text("x"),
        Err(GalleryError::NoActiveSession)
    ));
    assert!(matches!(
        orchestrator.save().await,
        Err(GalleryError::NoActiveSession)
    ));
}

#[tokio::test]
async fn failed_refresh_keeps_the_last_known_good_snapshot() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_get()
        .withf(|url| url == GALLERY_ENDPOINT)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 200,
                body: gallery_index(),
            })
        });
    transport
        .expect_get()
        .withf(|url| url == GOOD_URL)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 200,
                body: png_bytes(),
            })
        });
    transport
        .expect_get()
        .withf(|url| url == BAD_URL)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 404,
                body: Vec::new(),
            })
        });
    // Second refresh: the metadata endpoint itself fails.
    transport
        .expect_get()
        .withf(|url| url == GALLERY_ENDPOINT)
        .times(1)
        .returning(|_| {
            Ok(HttpResponse {
                status: 500,
                body: b"boom".to_vec(),
            })
        });

    let mut orchestrator =
        GalleryOrchestrator::new(transport, MockImagePublisher::new(), GALLERY_ENDPOINT);
    orchestrator.refresh().await.unwrap();
    let ids: Vec<_> = orchestrator.entries().iter().map(|e| e.id).collect();

    let err = orchestrator.refresh().await.unwrap_err();
    assert!(matches!(err, GalleryError::Fetch(_)));
    let after: Vec<_> = orchestrator.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, after, "snapshot must survive a failed refresh");
}

#[tokio::test]
async fn publish_failure_is_reported_verbatim_and_session_survives() {
    let mut publisher = MockImagePublisher::new();
    publisher.expect_publish().times(1).returning(|_, _| {
        Err(PublishError::UploadRejected {
            status: 403,
            body: "denied".to_string(),
        })
    });

    let mut orchestrator =
        GalleryOrchestrator::new(partial_gallery_transport(), publisher, GALLERY_ENDPOINT);
    orchestrator.refresh().await.unwrap();
    let good_id = orchestrator.entries()[0].id;
    orchestrator.select(good_id).unwrap();

    let err = orchestrator.save().await.unwrap_err();
    match err {
        GalleryError::Publish(PublishError::UploadRejected { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "denied");
        }
        other => panic!("expected UploadRejected, got {other:?}"),
    }
    assert!(orchestrator.session().is_some(), "session stays open");
}

#[tokio::test]
async fn dismiss_discards_unsaved_state() {
    let mut orchestrator = GalleryOrchestrator::new(
        partial_gallery_transport(),
        MockImagePublisher::new(),
        GALLERY_ENDPOINT,
    );
    orchestrator.refresh().await.unwrap();
    let good_id = orchestrator.entries()[0].id;
    orchestrator.select(good_id).unwrap();
    orchestrator.set_overlay_text("draft").unwrap();

    orchestrator.dismiss();
    assert!(orchestrator.session().is_none());

    // Re-selecting starts from a clean session.
    orchestrator.select(good_id).unwrap();
    assert_eq!(orchestrator.session().unwrap().overlay_text(), "");
    assert!(!orchestrator.session().unwrap().overlay_enabled());
}
