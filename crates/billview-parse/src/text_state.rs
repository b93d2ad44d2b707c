//! Text state machine for the content stream interpreter.
//!
//! Tracks text objects (BT/ET), font selection (Tf), the text and line
//! matrices, and the positioning operators (Td, TD, T*, Tm).

use billview_core::Ctm;

/// Text rendering mode 3: glyphs are neither filled nor stroked. Scanned
/// invoices carry their OCR text layer this way.
pub const RENDER_MODE_INVISIBLE: i64 = 3;

/// Text parameters saved and restored by `q`/`Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// Horizontal scaling in percent (`Tz`).
    pub h_scaling: f64,
    pub leading: f64,
    pub font_name: String,
    pub font_size: f64,
    pub render_mode: i64,
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            render_mode: 0,
            rise: 0.0,
        }
    }
}

/// Text state of the interpreter.
#[derive(Debug, Clone, Default)]
pub struct TextState {
    pub params: TextParams,
    in_text_object: bool,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Ctm {
        &self.line_matrix
    }

    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn h_scale(&self) -> f64 {
        self.params.h_scaling / 100.0
    }

    pub fn is_invisible(&self) -> bool {
        self.params.render_mode == RENDER_MODE_INVISIBLE
    }

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
        self.in_text_object = true;
    }

    /// `ET`.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tf`.
    pub fn set_font(&mut self, font_name: String, font_size: f64) {
        self.params.font_name = font_name;
        self.params.font_size = font_size;
    }

    /// `Tm`: replace both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: offset the start of the next line from the start of this one.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty);
        self.line_matrix = translation.concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: like `Td`, also setting the leading to `-ty`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`: move to the next line using the current leading.
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Advance the text matrix by `tx` text-space units after showing glyphs.
    pub fn advance(&mut self, tx: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0);
        self.text_matrix = translation.concat(&self.text_matrix);
    }

    /// Text rendering matrix for the current position under `ctm`.
    pub fn rendering_matrix(&self, ctm: &Ctm) -> Ctm {
        let p = &self.params;
        let size = Ctm::new(
            p.font_size * self.h_scale(),
            0.0,
            0.0,
            p.font_size,
            0.0,
            p.rise,
        );
        size.concat(&self.text_matrix).concat(ctm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn defaults() {
        let ts = TextState::new();
        assert!(!ts.in_text_object());
        assert_eq!(ts.params.h_scaling, 100.0);
        assert_eq!(*ts.text_matrix(), Ctm::identity());
    }

    #[test]
    fn begin_text_resets_matrices() {
        let mut ts = TextState::new();
        ts.set_text_matrix(Ctm::new(1.0, 0.0, 0.0, 1.0, 50.0, 60.0));
        ts.begin_text();
        assert!(ts.in_text_object());
        assert_eq!(*ts.text_matrix(), Ctm::identity());
        assert_eq!(*ts.line_matrix(), Ctm::identity());
        ts.end_text();
        assert!(!ts.in_text_object());
    }

    #[test]
    fn td_accumulates_from_line_start() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position(72.0, 700.0);
        ts.advance(30.0);
        ts.move_text_position(0.0, -14.0);
        assert_approx(ts.text_matrix().e, 72.0);
        assert_approx(ts.text_matrix().f, 686.0);
    }

    #[test]
    fn td_respects_scaled_line_matrix() {
        let mut ts = TextState::new();
        ts.set_text_matrix(Ctm::new(2.0, 0.0, 0.0, 2.0, 100.0, 100.0));
        ts.move_text_position(10.0, 5.0);
        assert_approx(ts.text_matrix().e, 120.0);
        assert_approx(ts.text_matrix().f, 110.0);
    }

    #[test]
    fn capital_td_sets_leading() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.move_text_position_and_set_leading(0.0, -12.0);
        assert_eq!(ts.params.leading, 12.0);
        ts.move_to_next_line();
        assert_approx(ts.text_matrix().f, -24.0);
    }

    #[test]
    fn rendering_matrix_combines_font_size_and_ctm() {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_font("F1".into(), 10.0);
        ts.params.h_scaling = 50.0;
        ts.move_text_position(20.0, 30.0);
        let ctm = Ctm::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let trm = ts.rendering_matrix(&ctm);
        assert_approx(trm.a, 10.0);
        assert_approx(trm.d, 20.0);
        assert_approx(trm.e, 40.0);
        assert_approx(trm.f, 60.0);
    }

    #[test]
    fn invisible_render_mode() {
        let mut ts = TextState::new();
        assert!(!ts.is_invisible());
        ts.params.render_mode = RENDER_MODE_INVISIBLE;
        assert!(ts.is_invisible());
    }
}
