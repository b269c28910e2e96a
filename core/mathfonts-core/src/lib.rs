//! mathfonts-core: KaTeX `@font-face` stylesheet rendering and style injection
//!
//! KaTeX ships a stylesheet whose font URLs all start with the relative
//! prefix `fonts/`. Hosts that serve the font files from somewhere else
//! (a dictionary viewer, an ebook reader, a CDN) need the same stylesheet
//! with that prefix swapped for their own base path, dropped into the page
//! as a `<style>` element.
//!
//! ## Pieces
//!
//! - [`template`]: the embedded stylesheet and the literal, single-pass
//!   `fonts/` rewrite
//! - [`face`]: a typed view of the `@font-face` rules, parsed from the
//!   template and rendered back byte-for-byte
//! - [`inject`]: the [`StyleTarget`] seam and the [`StyleInjector`]
//! - [`document`]: two ready-made targets, an in-memory head and HTML text
//! - [`output`]: CSS / JSON / NDJSON writers
//!
//! ## Example
//!
//! ```rust
//! use mathfonts_core::document::Document;
//! use mathfonts_core::inject::inject;
//!
//! let mut doc = Document::new();
//! inject("/static/katex/", &mut doc)?;
//!
//! let style = doc.styles().next().unwrap();
//! assert!(style.text.contains("url(/static/katex/KaTeX_Main-Regular.woff2)"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Injection never deduplicates: every call appends a fresh element.

pub mod document;
pub mod face;
pub mod inject;
pub mod output;
pub mod template;

pub use document::{Document, HeadNode, HtmlDocument, StyleNode};
pub use face::{
    font_faces, parse_font_faces, render_font_faces, FontFaceFilter, FontFaceRule, FontSource,
};
pub use inject::{inject, StyleInjector, StyleTarget};
pub use template::{
    count_font_faces, render_font_css, rewrite_base_path, KATEX_FONT_FACES, PATH_TOKEN,
};
