//! Loading, classification, pagination, zoom and the render pipeline.

mod common;

use billview::{
    DocumentHandle, DocumentKind, FileSource, MemorySource, PageRenderer, SupportedTypes,
    UnsupportedReason, ViewerError, ViewerOptions, render_pdf_page,
};
use common::{BILL_URL, bill_pdf, bill_source, build_pdf};

async fn loaded(options: ViewerOptions) -> PageRenderer {
    let mut renderer = PageRenderer::new(options);
    let kind = renderer
        .load(&bill_source(), BILL_URL, "application/pdf", Some("pdf"))
        .await
        .unwrap();
    assert_eq!(kind, DocumentKind::Pdf);
    renderer
}

#[tokio::test]
async fn pdf_load_renders_first_page() {
    let renderer = loaded(ViewerOptions::default()).await;
    assert_eq!(renderer.page_count(), 2);
    assert_eq!(renderer.page_number(), 1);

    let page = renderer.current().unwrap();
    assert_eq!(page.index, 0);
    assert_eq!((page.surface.width(), page.surface.height()), (612, 792));
    let texts: Vec<&str> = page.layer.glyphs().iter().map(|g| g.text.as_str()).collect();
    assert_eq!(texts, ["line one text", "line two text"]);
    assert_eq!(renderer.viewport().unwrap().scale, 1.0);
}

#[tokio::test]
async fn pagination_boundaries_do_not_render() {
    let mut renderer = loaded(ViewerOptions::default()).await;
    let generation = renderer.generation();

    assert!(!renderer.previous().unwrap());
    assert!(!renderer.first().unwrap());
    assert!(!renderer.go_to(0).unwrap());
    assert!(!renderer.go_to(3).unwrap());
    assert_eq!(renderer.generation(), generation);

    assert!(renderer.last().unwrap());
    assert_eq!(renderer.page_number(), 2);
    assert_eq!(renderer.current().unwrap().index, 1);
    let generation = renderer.generation();
    assert!(!renderer.next().unwrap());
    assert!(!renderer.last().unwrap());
    assert_eq!(renderer.generation(), generation);

    assert!(renderer.previous().unwrap());
    assert_eq!(renderer.page_number(), 1);
}

#[tokio::test]
async fn zoom_clamps_and_rerenders() {
    let mut renderer = loaded(ViewerOptions::default()).await;

    assert!(renderer.set_zoom(10.0).unwrap());
    assert_eq!(renderer.zoom(), 3.0);
    assert_eq!(renderer.current().unwrap().surface.width(), 1836);
    assert!(!renderer.zoom_in().unwrap());

    assert!(renderer.set_zoom(0.01).unwrap());
    assert_eq!(renderer.zoom(), 0.5);
    assert_eq!(renderer.viewport().unwrap().height, 396.0);
    assert!(!renderer.zoom_out().unwrap());

    assert!(renderer.zoom_in().unwrap());
    assert_eq!(renderer.zoom(), 0.6);

    // Glyph boxes follow the new viewport.
    let layer = renderer.glyph_layer().unwrap();
    let (_, bbox) = layer.screen_boxes().next().unwrap();
    assert!((bbox.x0 - 72.0 * 0.6).abs() < 1e-9);
}

#[tokio::test]
async fn fit_width_tiers() {
    let cases = [(500.0, 0.5), (1000.0, 0.5), (1280.0, 0.937), (3000.0, 2.195), (6000.0, 3.0)];
    for (width, expected) in cases {
        let options = ViewerOptions {
            container_width: Some(width),
            ..ViewerOptions::default()
        };
        let mut renderer = loaded(options).await;
        assert_eq!(renderer.zoom(), expected, "container width {width}");

        renderer.set_zoom(1.0).unwrap();
        renderer.reset_zoom().unwrap();
        assert_eq!(renderer.zoom(), expected, "reset at width {width}");
    }
}

#[tokio::test]
async fn stale_render_is_discarded() {
    let mut renderer = loaded(ViewerOptions::default()).await;

    // A render for page 2 is issued, then superseded by a zoom change
    // before it completes.
    renderer.last().unwrap();
    let stale = renderer.begin_render();
    renderer.set_zoom(2.0).unwrap();
    let stale_outcome = renderer.render(&stale);
    assert!(stale_outcome.is_ok());

    assert!(!renderer.complete(stale, stale_outcome).unwrap());
    let page = renderer.current().unwrap();
    assert_eq!(page.viewport().scale, 2.0);
}

#[tokio::test]
async fn out_of_order_completion_keeps_newest() {
    let mut renderer = loaded(ViewerOptions::default()).await;
    let older = renderer.begin_render();
    let newer = renderer.begin_render();
    let newer_outcome = renderer.render(&newer);
    let older_outcome = renderer.render(&older);

    assert!(renderer.complete(newer, newer_outcome).unwrap());
    assert!(!renderer.complete(older, older_outcome).unwrap());
    assert_eq!(renderer.generation(), newer.generation);
}

#[tokio::test]
async fn render_failure_clears_current_page() {
    let options = ViewerOptions {
        raster: billview::RasterOptions {
            max_dimension: 1000,
            ..Default::default()
        },
        ..ViewerOptions::default()
    };
    let mut renderer = loaded(options).await;
    assert!(renderer.current().is_some());

    let err = renderer.set_zoom(2.0).unwrap_err();
    assert!(matches!(err, ViewerError::PageRender { page: 1, .. }));
    assert!(renderer.current().is_none());

    // Navigating back to a renderable zoom recovers.
    assert!(renderer.set_zoom(1.0).unwrap());
    assert!(renderer.current().is_some());
}

#[test]
fn page_load_failure_is_typed() {
    let pdf = billview::Pdf::open(&bill_pdf(), None).unwrap();
    let err = render_pdf_page(&pdf, 5, 1.0, &ViewerOptions::default()).unwrap_err();
    assert!(matches!(err, ViewerError::PageLoad { page: 6, .. }));
}

#[tokio::test]
async fn broken_pdf_is_a_load_failure() {
    let source = MemorySource::new().with("mem://broken.pdf", b"not a pdf".to_vec());
    let mut renderer = PageRenderer::default();
    let err = renderer
        .load(&source, "mem://broken.pdf", "application/pdf", Some("pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::DocumentLoad(_)));
    assert!(renderer.document().is_none());
}

#[tokio::test]
async fn missing_document_is_a_load_failure() {
    let mut renderer = PageRenderer::default();
    let err = renderer
        .load(&MemorySource::new(), "mem://gone.pdf", "application/pdf", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::DocumentLoad(_)));
}

#[tokio::test]
async fn allow_list_gate() {
    let source = MemorySource::new()
        .with("mem://scan.png", b"\x89PNG\r\n\x1a\n".to_vec())
        .with("mem://bill.pdf", bill_pdf());
    let options = ViewerOptions {
        supported_types: SupportedTypes::new(["application/pdf"]),
        ..ViewerOptions::default()
    };
    let mut renderer = PageRenderer::new(options);

    let kind = renderer
        .load(&source, "mem://scan.png", "image/png", Some("png"))
        .await
        .unwrap();
    assert_eq!(kind, DocumentKind::Unsupported(UnsupportedReason::NotAllowed));
    assert!(renderer.current().is_none());

    // An unknown MIME type passes when the extension matches a listed subtype.
    let kind = renderer
        .load(&source, "mem://bill.pdf", "binary/unknown", Some("pdf"))
        .await
        .unwrap();
    assert_eq!(kind, DocumentKind::Pdf);

    // Listing octet-stream admits everything.
    let options = ViewerOptions {
        supported_types: SupportedTypes::new(["application/octet-stream"]),
        ..ViewerOptions::default()
    };
    let mut renderer = PageRenderer::new(options);
    let kind = renderer
        .load(&source, "mem://scan.png", "image/png", Some("png"))
        .await
        .unwrap();
    assert_eq!(kind, DocumentKind::Image);
    assert!(matches!(
        renderer.document(),
        Some(DocumentHandle::Image { mime_type, bytes }) if mime_type == "image/png" && bytes.len() == 8
    ));
}

#[tokio::test]
async fn unknown_types_degrade_to_unsupported() {
    let mut renderer = PageRenderer::default();
    let kind = renderer
        .load(&MemorySource::new(), "mem://x", "application/octet-stream", Some("bin"))
        .await
        .unwrap();
    assert_eq!(kind, DocumentKind::Unsupported(UnsupportedReason::Unrecognized));
}

#[tokio::test]
async fn json_documents_are_pretty_printed() {
    let source = MemorySource::new()
        .with("mem://ocr.json", br#"{"lines":[{"text":"Total"}]}"#.to_vec())
        .with("mem://bad.json", br#"{"lines": ["#.to_vec());
    let mut renderer = PageRenderer::default();

    renderer
        .load(&source, "mem://ocr.json", "application/json", Some("json"))
        .await
        .unwrap();
    let Some(DocumentHandle::Text { content }) = renderer.document() else {
        panic!("expected text");
    };
    assert_eq!(
        content,
        "{\n  \"lines\": [\n    {\n      \"text\": \"Total\"\n    }\n  ]\n}"
    );

    renderer
        .load(&source, "mem://bad.json", "application/json", Some("json"))
        .await
        .unwrap();
    let Some(DocumentHandle::Text { content }) = renderer.document() else {
        panic!("expected text");
    };
    assert_eq!(content, r#"{"lines": ["#);
}

#[tokio::test]
async fn file_source_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("bill.pdf"), bill_pdf())
        .await
        .unwrap();
    let mut renderer = PageRenderer::default();
    let kind = renderer
        .load(&FileSource::with_root(dir.path()), "bill.pdf", "application/pdf", Some("pdf"))
        .await
        .unwrap();
    assert_eq!(kind, DocumentKind::Pdf);
    assert_eq!(renderer.page_count(), 2);
}

#[tokio::test]
async fn invisible_ocr_text_is_selectable() {
    // Scanned bills carry their OCR text in render mode 3 over the image.
    let pdf = build_pdf(&[b"BT 3 Tr /F1 10 Tf 100 500 Td (INV-0042) Tj ET"]);
    let source = MemorySource::new().with("mem://scan.pdf", pdf);
    let mut renderer = PageRenderer::default();
    renderer
        .load(&source, "mem://scan.pdf", "application/pdf", Some("pdf"))
        .await
        .unwrap();

    let page = renderer.current().unwrap();
    let glyph = &page.layer.glyphs()[0];
    assert_eq!(glyph.text, "INV-0042");
    assert!(!glyph.visible);
    // Nothing was painted where the run sits.
    assert_eq!(page.surface.pixel(120, 288), Some([255, 255, 255, 255]));
}
