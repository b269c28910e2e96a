//! Style injection (rewrite the template, hand it to a document head)

use std::borrow::Cow;

use anyhow::Result;
use log::debug;

use crate::template::{count_font_faces, rewrite_base_path, KATEX_FONT_FACES};

/// Something that owns a document head and can take a new `<style>` child.
///
/// Implementations append; they never look at or replace styles added
/// earlier. A target that has nowhere to put the style (no head) returns an
/// error and the injector passes it straight up.
pub trait StyleTarget {
    fn append_style(&mut self, css_text: &str) -> Result<()>;
}

impl<T: StyleTarget + ?Sized> StyleTarget for &mut T {
    fn append_style(&mut self, css_text: &str) -> Result<()> {
        (**self).append_style(css_text)
    }
}

/// Collects each injected stylesheet as a separate string.
impl StyleTarget for Vec<String> {
    fn append_style(&mut self, css_text: &str) -> Result<()> {
        self.push(css_text.to_string());
        Ok(())
    }
}

/// Renders a font-face template for a base path and appends it to a target.
#[derive(Debug, Clone)]
pub struct StyleInjector {
    template: Cow<'static, str>,
}

impl Default for StyleInjector {
    fn default() -> Self {
        Self {
            template: Cow::Borrowed(KATEX_FONT_FACES),
        }
    }
}

impl StyleInjector {
    /// Injector for the embedded KaTeX template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injector for a caller-provided template using the same `fonts/` token.
    pub fn with_template(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The template with every `fonts/` replaced by `base_path`.
    pub fn render(&self, base_path: &str) -> String {
        rewrite_base_path(&self.template, base_path)
    }

    /// Append one style element holding the rewritten template to `target`.
    ///
    /// Calling this twice appends two elements.
    pub fn inject<T: StyleTarget + ?Sized>(&self, base_path: &str, target: &mut T) -> Result<()> {
        let css = self.render(base_path);
        debug!(
            "injecting {} @font-face rules ({} bytes) with base path {:?}",
            count_font_faces(&css),
            css.len(),
            base_path
        );
        target.append_style(&css)
    }
}

/// Inject the KaTeX font faces into `target`, rooted at `base_path`.
pub fn inject<T: StyleTarget + ?Sized>(base_path: &str, target: &mut T) -> Result<()> {
    StyleInjector::new().inject(base_path, target)
}
