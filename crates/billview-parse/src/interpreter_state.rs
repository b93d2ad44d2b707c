//! Graphics state stack for the content stream interpreter.
//!
//! Tracks the CTM, line width and the two painting colors. `q` pushes the
//! graphics state together with the text parameters; `Q` pops both.

use billview_core::{Color, Ctm};

use crate::text_state::TextParams;

/// Graphics parameters needed to paint shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub ctm: Ctm,
    pub line_width: f64,
    pub stroke_color: Color,
    pub fill_color: Color,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Ctm::identity(),
            line_width: 1.0,
            stroke_color: Color::black(),
            fill_color: Color::black(),
        }
    }
}

/// Interpreter state: current graphics state plus the `q`/`Q` stack.
#[derive(Debug, Clone, Default)]
pub struct InterpreterState {
    current: GraphicsState,
    stack: Vec<(GraphicsState, TextParams)>,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose CTM starts at `ctm` rather than identity.
    pub fn with_ctm(ctm: Ctm) -> Self {
        let mut state = Self::default();
        state.current.ctm = ctm;
        state
    }

    pub fn ctm(&self) -> &Ctm {
        &self.current.ctm
    }

    pub fn graphics_state(&self) -> &GraphicsState {
        &self.current
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`.
    pub fn save(&mut self, text: &TextParams) {
        self.stack.push((self.current.clone(), text.clone()));
    }

    /// `Q`. Returns the saved text parameters, or `None` on an unbalanced
    /// restore (which leaves the state untouched).
    pub fn restore(&mut self) -> Option<TextParams> {
        let (graphics, text) = self.stack.pop()?;
        self.current = graphics;
        Some(text)
    }

    /// `cm`: the new matrix applies before the current CTM.
    pub fn concat_matrix(&mut self, m: Ctm) {
        self.current.ctm = m.concat(&self.current.ctm);
    }

    /// `w`.
    pub fn set_line_width(&mut self, width: f64) {
        self.current.line_width = width;
    }

    /// Set a painting color from raw components: one for gray, three for
    /// RGB, four for CMYK. Other counts (patterns, indexed spaces) leave
    /// the color unchanged.
    pub fn set_color(&mut self, stroking: bool, components: &[f64]) {
        let color = match *components {
            [g] => Color::gray(g),
            [r, g, b] => Color::new(r, g, b),
            [c, m, y, k] => Color::from_cmyk(c, m, y, k),
            _ => return,
        };
        if stroking {
            self.current.stroke_color = color;
        } else {
            self.current.fill_color = color;
        }
    }
}
