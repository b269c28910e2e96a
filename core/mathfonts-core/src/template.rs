//! Embedded KaTeX stylesheet template and base-path rewriting

/// The `@font-face` stylesheet for the KaTeX math fonts, exactly as shipped.
///
/// Every font URL starts with [`PATH_TOKEN`]; hosts swap it for the location
/// the font files are actually served from.
pub const KATEX_FONT_FACES: &str = include_str!("../assets/katex-fonts.css");

/// Relative prefix used by every URL in the template.
pub const PATH_TOKEN: &str = "fonts/";

/// Replace every occurrence of [`PATH_TOKEN`] in `css` with `base_path`.
///
/// The replacement is literal and happens in one pass over the original
/// text: `$`, backslashes and regex metacharacters in `base_path` are copied
/// verbatim, and a `fonts/` that the base path itself contains is never
/// rewritten again.
pub fn rewrite_base_path(css: &str, base_path: &str) -> String {
    css.replace(PATH_TOKEN, base_path)
}

/// Render the KaTeX stylesheet with its font URLs rooted at `base_path`.
pub fn render_font_css(base_path: &str) -> String {
    rewrite_base_path(KATEX_FONT_FACES, base_path)
}

/// Count the `@font-face` blocks in a stylesheet.
pub fn count_font_faces(css: &str) -> usize {
    css.matches("@font-face").count()
}
