//! billview-parse: PDF parsing backend and content stream interpreter.
//!
//! Opens PDF documents through a pluggable [`PdfBackend`] and interprets page
//! content into [`billview_core::PageContent`]: positioned text runs for the
//! selectable text layer and painted shapes for the rasterizer.

pub mod backend;
pub mod error;
pub mod fonts;
pub mod handler;
pub mod interpreter;
pub mod interpreter_state;
pub mod lopdf_backend;
pub mod text_state;
pub mod to_unicode;
pub mod tokenizer;

pub use backend::{MediaBox, PdfBackend};
pub use billview_core;
pub use error::BackendError;
pub use fonts::Font;
pub use handler::ContentHandler;
pub use interpreter::InterpretOptions;
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use to_unicode::ToUnicodeMap;
