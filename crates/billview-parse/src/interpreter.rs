//! Content stream interpreter.
//!
//! Walks tokenized operators, maintaining graphics and text state, and
//! reports text runs and painted shapes to a [`ContentHandler`]. Form
//! XObjects are interpreted recursively through `Do`.

use std::collections::HashMap;

use billview_core::{Color, Ctm, FillRule, Glyph, PathSegment, Point, Shape};

use crate::error::BackendError;
use crate::fonts::Font;
use crate::handler::ContentHandler;
use crate::interpreter_state::InterpreterState;
use crate::lopdf_backend::{decode_stream, object_to_f64, resolve_ref};
use crate::text_state::TextState;
use crate::tokenizer::{Operand, Operator, tokenize};

/// `TJ` adjustments at least this large (in thousandths of an em) read as
/// a word gap and put a space into the run's text.
pub const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Fill used for the footprint of image XObjects, which are not decoded.
pub const IMAGE_PLACEHOLDER: Color = Color {
    r: 0.9,
    g: 0.9,
    b: 0.9,
};

/// Resource limits for interpretation.
#[derive(Debug, Clone)]
pub struct InterpretOptions {
    /// Maximum nesting of Form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum number of text runs reported per page (default: 100,000).
    pub max_glyphs_per_page: usize,
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_glyphs_per_page: 100_000,
        }
    }
}

/// Mutable interpretation context shared across nested Form XObjects.
pub(crate) struct Interpreter<'a> {
    doc: &'a lopdf::Document,
    handler: &'a mut dyn ContentHandler,
    options: &'a InterpretOptions,
    gstate: InterpreterState,
    tstate: TextState,
    glyph_count: usize,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        doc: &'a lopdf::Document,
        handler: &'a mut dyn ContentHandler,
        options: &'a InterpretOptions,
        initial_ctm: Ctm,
    ) -> Self {
        Self {
            doc,
            handler,
            options,
            gstate: InterpreterState::with_ctm(initial_ctm),
            tstate: TextState::new(),
            glyph_count: 0,
        }
    }

    /// Interpret one content stream against `resources`.
    pub(crate) fn run(
        &mut self,
        stream_bytes: &[u8],
        resources: &lopdf::Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        self.run_with_font(stream_bytes, resources, depth, None)
    }

    /// Interpret a stream that starts with `inherited` as its selected font,
    /// until the stream's own `Tf` replaces it.
    fn run_with_font(
        &mut self,
        stream_bytes: &[u8],
        resources: &lopdf::Dictionary,
        depth: usize,
        mut inherited: Option<&Font>,
    ) -> Result<(), BackendError> {
        if depth > self.options.max_recursion_depth {
            return Err(BackendError::Interpreter(format!(
                "Form XObject recursion depth {} exceeds limit {}",
                depth, self.options.max_recursion_depth
            )));
        }

        let operators = tokenize(stream_bytes)?;
        let mut fonts: HashMap<String, Font> = HashMap::new();
        let mut path = PathBuilder::default();

        for op in &operators {
            let font = fonts.get(&self.tstate.params.font_name).or(inherited);
            match op.name.as_str() {
                // Graphics state
                "q" => self.gstate.save(&self.tstate.params),
                "Q" => {
                    if let Some(params) = self.gstate.restore() {
                        self.tstate.params = params;
                    }
                }
                "cm" if op.operands.len() >= 6 => {
                    self.gstate.concat_matrix(matrix_from(op));
                }
                "w" => self.gstate.set_line_width(op.num(0)),

                // Color
                "G" | "RG" | "K" | "SC" | "SCN" => {
                    self.gstate.set_color(true, &numbers(&op.operands));
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    self.gstate.set_color(false, &numbers(&op.operands));
                }

                // Text state
                "BT" => self.tstate.begin_text(),
                "ET" => self.tstate.end_text(),
                "Tf" => {
                    let name = op
                        .operands
                        .first()
                        .and_then(Operand::as_name)
                        .unwrap_or_default()
                        .to_string();
                    inherited = None;
                    if !fonts.contains_key(&name) {
                        let font = self.load_font(resources, &name);
                        fonts.insert(name.clone(), font);
                    }
                    self.tstate.set_font(name, op.num(1));
                }
                "Tm" if op.operands.len() >= 6 => {
                    self.tstate.set_text_matrix(matrix_from(op));
                }
                "Td" => self.tstate.move_text_position(op.num(0), op.num(1)),
                "TD" => self
                    .tstate
                    .move_text_position_and_set_leading(op.num(0), op.num(1)),
                "T*" => self.tstate.move_to_next_line(),
                "Tc" => self.tstate.params.char_spacing = op.num(0),
                "Tw" => self.tstate.params.word_spacing = op.num(0),
                "Tz" => self.tstate.params.h_scaling = op.num(0),
                "TL" => self.tstate.params.leading = op.num(0),
                "Tr" => self.tstate.params.render_mode = op.num(0) as i64,
                "Ts" => self.tstate.params.rise = op.num(0),

                // Text showing
                "Tj" => self.show(font, &op.operands[..op.operands.len().min(1)]),
                "TJ" => {
                    if let Some(items) = op.operands.first().and_then(Operand::as_array) {
                        self.show(font, items);
                    }
                }
                "'" => {
                    self.tstate.move_to_next_line();
                    self.show(font, &op.operands[..op.operands.len().min(1)]);
                }
                "\"" if op.operands.len() >= 3 => {
                    self.tstate.params.word_spacing = op.num(0);
                    self.tstate.params.char_spacing = op.num(1);
                    self.tstate.move_to_next_line();
                    self.show(font, &op.operands[2..3]);
                }

                // XObjects
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                        self.invoke_xobject(resources, name, depth, font)?;
                    }
                }

                // Path construction
                "m" => path.move_to(self.gstate.ctm(), op.num(0), op.num(1)),
                "l" => path.line_to(self.gstate.ctm(), op.num(0), op.num(1)),
                "c" => path.curve_to(
                    self.gstate.ctm(),
                    [op.num(0), op.num(1)],
                    [op.num(2), op.num(3)],
                    [op.num(4), op.num(5)],
                ),
                "v" => {
                    if let Some(cp1) = path.current {
                        let cp2 = self.gstate.ctm().transform_point(Point::new(op.num(0), op.num(1)));
                        let end = self.gstate.ctm().transform_point(Point::new(op.num(2), op.num(3)));
                        path.push_curve(cp1, cp2, end);
                    }
                }
                "y" => {
                    let ctm = self.gstate.ctm();
                    let cp1 = ctm.transform_point(Point::new(op.num(0), op.num(1)));
                    let end = ctm.transform_point(Point::new(op.num(2), op.num(3)));
                    path.push_curve(cp1, end, end);
                }
                "re" => path.rectangle(self.gstate.ctm(), op.num(0), op.num(1), op.num(2), op.num(3)),
                "h" => path.close(),

                // Path painting
                "S" => self.paint(&mut path, false, false, true, FillRule::NonZeroWinding),
                "s" => self.paint(&mut path, true, false, true, FillRule::NonZeroWinding),
                "f" | "F" => self.paint(&mut path, false, true, false, FillRule::NonZeroWinding),
                "f*" => self.paint(&mut path, false, true, false, FillRule::EvenOdd),
                "B" => self.paint(&mut path, false, true, true, FillRule::NonZeroWinding),
                "B*" => self.paint(&mut path, false, true, true, FillRule::EvenOdd),
                "b" => self.paint(&mut path, true, true, true, FillRule::NonZeroWinding),
                "b*" => self.paint(&mut path, true, true, true, FillRule::EvenOdd),
                "n" => path.clear(),

                // Clipping, marked content, inline images and anything else
                // does not affect the text layer.
                _ => {}
            }
        }
        Ok(())
    }

    fn load_font(&mut self, resources: &lopdf::Dictionary, name: &str) -> Font {
        let dict = resources
            .get(b"Font")
            .ok()
            .map(|o| resolve_ref(self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|fonts| fonts.get(name.as_bytes()).ok())
            .map(|o| resolve_ref(self.doc, o))
            .and_then(|o| o.as_dict().ok());
        match dict {
            Some(dict) => Font::from_dict(self.doc, dict),
            None => {
                self.handler
                    .on_warning(format!("font /{name} not found in resources, using defaults"));
                Font::fallback(name)
            }
        }
    }

    /// Show strings (and `TJ` adjustments) as a single run.
    fn show(&mut self, font: Option<&Font>, items: &[Operand]) {
        let fallback;
        let font = match font {
            Some(font) => font,
            None => {
                fallback = Font::fallback(&self.tstate.params.font_name);
                &fallback
            }
        };
        let font_size = self.tstate.params.font_size;
        let h_scale = self.tstate.h_scale();
        let start = self.tstate.rendering_matrix(self.gstate.ctm());
        let user = self.tstate.text_matrix().concat(self.gstate.ctm());

        let mut text = String::new();
        let mut advance = 0.0;
        let mut inked_advance = 0.0;
        for item in items {
            match item {
                Operand::Str(bytes) => {
                    for code in font.codes(bytes) {
                        text.push_str(&font.text_for(code));
                        let mut tx = font.width(code) / 1000.0 * font_size
                            + self.tstate.params.char_spacing;
                        if font.is_word_space(code) {
                            tx += self.tstate.params.word_spacing;
                        }
                        tx *= h_scale;
                        advance += tx;
                        self.tstate.advance(tx);
                    }
                    inked_advance = advance;
                }
                Operand::Number(adjust) => {
                    if *adjust <= -TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    let tx = -adjust / 1000.0 * font_size * h_scale;
                    advance += tx;
                    self.tstate.advance(tx);
                }
                _ => {}
            }
        }

        let text = text.trim_end().to_string();
        if text.is_empty() {
            return;
        }
        if self.glyph_count >= self.options.max_glyphs_per_page {
            return;
        }
        self.glyph_count += 1;

        let width = inked_advance * user.a.hypot(user.b);
        let height = font_size * user.c.hypot(user.d);
        let mut glyph = Glyph::new(text, start, width, height).with_font(font.base_font());
        if self.tstate.is_invisible() {
            glyph = glyph.invisible();
        }
        self.handler.on_glyph(glyph);
    }

    fn paint(
        &mut self,
        path: &mut PathBuilder,
        close: bool,
        fill: bool,
        stroke: bool,
        fill_rule: FillRule,
    ) {
        if close {
            path.close();
        }
        let segments = path.take();
        if segments.is_empty() {
            return;
        }
        let gs = self.gstate.graphics_state();
        let ctm = &gs.ctm;
        let scale = ((ctm.a * ctm.d - ctm.b * ctm.c).abs()).sqrt();
        self.handler.on_shape(Shape {
            segments,
            fill: fill.then_some(gs.fill_color),
            fill_rule,
            stroke: stroke.then_some(gs.stroke_color),
            line_width: gs.line_width * scale,
        });
    }

    fn invoke_xobject(
        &mut self,
        resources: &lopdf::Dictionary,
        name: &str,
        depth: usize,
        font: Option<&Font>,
    ) -> Result<(), BackendError> {
        let doc = self.doc;
        let stream = resources
            .get(b"XObject")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|x| x.get(name.as_bytes()).ok())
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_stream().ok());
        let Some(stream) = stream else {
            self.handler
                .on_warning(format!("XObject /{name} not found in resources"));
            return Ok(());
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");
        match subtype {
            b"Form" => self.run_form(stream, resources, depth, font),
            b"Image" => {
                self.paint_image_placeholder();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn run_form(
        &mut self,
        stream: &lopdf::Stream,
        parent_resources: &lopdf::Dictionary,
        depth: usize,
        font: Option<&Font>,
    ) -> Result<(), BackendError> {
        let doc = self.doc;
        self.gstate.save(&self.tstate.params);

        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| o.as_array().ok())
            .filter(|arr| arr.len() == 6)
            .and_then(|arr| {
                arr.iter()
                    .map(|o| object_to_f64(o).ok())
                    .collect::<Option<Vec<f64>>>()
            });
        if let Some(m) = matrix {
            self.gstate
                .concat_matrix(Ctm::new(m[0], m[1], m[2], m[3], m[4], m[5]));
        }

        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_dict().ok())
            .unwrap_or(parent_resources);

        let result = decode_stream(stream)
            .and_then(|bytes| self.run_with_font(&bytes, resources, depth + 1, font));
        if let Some(params) = self.gstate.restore() {
            self.tstate.params = params;
        }
        result
    }

    /// Images occupy the unit square under the CTM.
    fn paint_image_placeholder(&mut self) {
        let mut path = PathBuilder::default();
        path.rectangle(self.gstate.ctm(), 0.0, 0.0, 1.0, 1.0);
        self.handler.on_shape(Shape {
            segments: path.take(),
            fill: Some(IMAGE_PLACEHOLDER),
            fill_rule: FillRule::NonZeroWinding,
            stroke: None,
            line_width: 0.0,
        });
    }
}

/// Accumulates path segments in page space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<PathSegment>,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl PathBuilder {
    fn move_to(&mut self, ctm: &Ctm, x: f64, y: f64) {
        let p = ctm.transform_point(Point::new(x, y));
        self.segments.push(PathSegment::MoveTo(p));
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    fn line_to(&mut self, ctm: &Ctm, x: f64, y: f64) {
        let p = ctm.transform_point(Point::new(x, y));
        self.segments.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    fn curve_to(&mut self, ctm: &Ctm, cp1: [f64; 2], cp2: [f64; 2], end: [f64; 2]) {
        let cp1 = ctm.transform_point(Point::new(cp1[0], cp1[1]));
        let cp2 = ctm.transform_point(Point::new(cp2[0], cp2[1]));
        let end = ctm.transform_point(Point::new(end[0], end[1]));
        self.push_curve(cp1, cp2, end);
    }

    fn push_curve(&mut self, cp1: Point, cp2: Point, end: Point) {
        self.segments.push(PathSegment::CurveTo { cp1, cp2, end });
        self.current = Some(end);
    }

    fn rectangle(&mut self, ctm: &Ctm, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(ctm, x, y);
        self.line_to(ctm, x + w, y);
        self.line_to(ctm, x + w, y + h);
        self.line_to(ctm, x, y + h);
        self.close();
    }

    fn close(&mut self) {
        if self.segments.is_empty() {
            return;
        }
        self.segments.push(PathSegment::ClosePath);
        self.current = self.subpath_start;
    }

    fn take(&mut self) -> Vec<PathSegment> {
        self.current = None;
        self.subpath_start = None;
        std::mem::take(&mut self.segments)
    }

    fn clear(&mut self) {
        self.take();
    }
}

fn numbers(operands: &[Operand]) -> Vec<f64> {
    operands.iter().filter_map(Operand::as_f64).collect()
}

fn matrix_from(op: &Operator) -> Ctm {
    Ctm::new(
        op.num(0),
        op.num(1),
        op.num(2),
        op.num(3),
        op.num(4),
        op.num(5),
    )
}
