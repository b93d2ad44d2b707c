//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use billview::{FieldKind, MemoryForm, MemorySource};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

pub const BILL_URL: &str = "mem://bill.pdf";

/// Build a PDF with one US Letter page per content stream, sharing a
/// Helvetica font as `/F1`.
pub fn build_pdf(contents: &[&[u8]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => contents.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Two-page bill. Page 1 holds two 12pt lines at y = 700 and y = 680; page 2
/// holds the date `31.12.2024` at y = 700. Helvetica runs without widths
/// advance 6pt per character at 12pt.
pub fn bill_pdf() -> Vec<u8> {
    build_pdf(&[
        b"BT /F1 12 Tf 72 700 Td (line one text) Tj ET\n\
          BT /F1 12 Tf 72 680 Td (line two text) Tj ET",
        b"0.9 g 60 640 200 80 re f\n\
          BT /F1 12 Tf 72 700 Td (31.12.2024) Tj ET",
    ])
}

pub fn bill_source() -> MemorySource {
    MemorySource::new().with(BILL_URL, bill_pdf())
}

pub fn bill_form() -> MemoryForm {
    MemoryForm::new()
        .with_field("trandate", FieldKind::Date)
        .with_field("tranid", FieldKind::Text)
        .with_field("usertotal", FieldKind::Currency)
        .with_field("memo", FieldKind::LongText)
        .with_grid("expense", 2, None)
        .with_grid("item", 2, None)
}
