//! Benchmarks for the interactive path: interpreting and rendering a dense
//! bill page, and selecting text on it.

use billview::{
    Glyph, GlyphLayer, Granularity, Pdf, SearchOptions, Viewport, ViewerOptions, render_pdf_page,
};
use billview_core::{BBox, search_glyphs, select_rect};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lopdf::{Object, Stream, dictionary};

/// One page with `rows` invoice lines of four columns each.
fn dense_bill(rows: usize) -> Vec<u8> {
    let mut content = String::from("BT /F1 9 Tf\n");
    for row in 0..rows {
        let y = 760 - (row * 11) as i64;
        content.push_str(&format!(
            "1 0 0 1 40 {y} Tm (Item {row:03} description) Tj\n\
             1 0 0 1 300 {y} Tm ({row}) Tj\n\
             1 0 0 1 380 {y} Tm ($1,{row:03}.00) Tj\n\
             1 0 0 1 480 {y} Tm (31.12.2024) Tj\n"
        ));
    }
    content.push_str("ET\n");

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save benchmark PDF");
    buf
}

fn synthetic_layer(rows: usize) -> GlyphLayer {
    let glyphs = (0..rows)
        .flat_map(|row| {
            let y = 760.0 - row as f64 * 11.0;
            [
                Glyph::at(format!("Item {row:03} description"), 40.0, y, 108.0, 9.0),
                Glyph::at(format!("$1,{row:03}.00"), 380.0, y, 40.0, 9.0),
            ]
        })
        .collect();
    GlyphLayer::new(Viewport::for_page(612.0, 792.0, 1.5), glyphs)
}

fn bench_render(c: &mut Criterion) {
    let bytes = dense_bill(60);
    let pdf = Pdf::open(&bytes, None).expect("benchmark PDF opens");
    let options = ViewerOptions::default();
    let mut group = c.benchmark_group("render");
    group.bench_function("dense_page_zoom_1", |b| {
        b.iter(|| render_pdf_page(black_box(&pdf), 0, 1.0, &options))
    });
    group.bench_function("dense_page_zoom_2", |b| {
        b.iter(|| render_pdf_page(black_box(&pdf), 0, 2.0, &options))
    });
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let layer = synthetic_layer(60);
    let rect = BBox::new(50.0, 100.0, 700.0, 900.0);
    let mut group = c.benchmark_group("select");
    group.bench_function("rect_character", |b| {
        b.iter(|| select_rect(black_box(&layer), rect, Granularity::Character))
    });
    group.bench_function("rect_glyph", |b| {
        b.iter(|| select_rect(black_box(&layer), rect, Granularity::Glyph))
    });
    group.bench_function("search_literal", |b| {
        b.iter(|| search_glyphs(black_box(&layer), "description", &SearchOptions::default()))
    });
    group.finish();
}

criterion_group!(benches, bench_render, bench_select);
criterion_main!(benches);
