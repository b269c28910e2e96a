//! Typed view over `@font-face` rules
//!
//! The template is a minified stylesheet: blocks of the form
//! `@font-face{font-family:..;src:..;src:..;font-weight:..;font-style:..}`
//! with no whitespace between them. [`parse_font_faces`] reads exactly that
//! dialect and [`FontFaceRule::to_css`] writes it back byte-for-byte, so the
//! model can be used to inspect or filter the template without drifting from
//! the text that actually gets injected.

use std::sync::OnceLock;

use anyhow::{anyhow, bail, Result};
use log::trace;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::template::{rewrite_base_path, KATEX_FONT_FACES};

/// One `url(...)` entry of a `src` descriptor, with its optional format hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl FontSource {
    pub fn new(url: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            url: url.into(),
            format: format.map(str::to_string),
        }
    }

    /// File name the URL points at, without directories or `#fragment`.
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['#', '?']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or(path)
    }

    fn write_css(&self, out: &mut String) {
        out.push_str("url(");
        out.push_str(&self.url);
        out.push(')');
        if let Some(format) = &self.format {
            out.push_str(" format('");
            out.push_str(format);
            out.push_str("')");
        }
    }
}

/// A single `@font-face` block.
///
/// `src` keeps every `src` descriptor in declaration order. The KaTeX
/// template carries two: a bare EOT URL for old IE, then the full
/// format-hinted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFaceRule {
    pub family: String,
    pub src: Vec<Vec<FontSource>>,
    pub weight: String,
    pub style: String,
}

impl FontFaceRule {
    /// Render the rule in the template's minified syntax.
    pub fn to_css(&self) -> String {
        let mut out = String::with_capacity(384);
        self.write_css(&mut out);
        out
    }

    fn write_css(&self, out: &mut String) {
        out.push_str("@font-face{font-family:");
        out.push_str(&self.family);
        out.push(';');
        for list in &self.src {
            out.push_str("src:");
            for (i, source) in list.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                source.write_css(out);
            }
            out.push(';');
        }
        out.push_str("font-weight:");
        out.push_str(&self.weight);
        out.push_str(";font-style:");
        out.push_str(&self.style);
        out.push('}');
    }

    /// Copy of the rule with every source URL rebased onto `base_path`.
    pub fn with_base_path(&self, base_path: &str) -> Self {
        let src = self
            .src
            .iter()
            .map(|list| {
                list.iter()
                    .map(|s| FontSource {
                        url: rewrite_base_path(&s.url, base_path),
                        format: s.format.clone(),
                    })
                    .collect()
            })
            .collect();

        Self {
            family: self.family.clone(),
            src,
            weight: self.weight.clone(),
            style: self.style.clone(),
        }
    }

    /// Iterate over every source across all `src` descriptors.
    pub fn sources(&self) -> impl Iterator<Item = &FontSource> {
        self.src.iter().flatten()
    }

    /// Distinct font file names referenced by this rule, in first-seen order.
    pub fn file_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for source in self.sources() {
            let name = source.file_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Format labels declared for this rule (`woff2`, `truetype`, ...).
    pub fn formats(&self) -> Vec<&str> {
        self.sources()
            .filter_map(|s| s.format.as_deref())
            .collect()
    }
}

/// Render a list of rules back into one stylesheet string.
pub fn render_font_faces(rules: &[FontFaceRule]) -> String {
    let mut out = String::with_capacity(rules.len() * 384);
    for rule in rules {
        rule.write_css(&mut out);
    }
    out
}

/// The rules of the embedded KaTeX template.
pub fn font_faces() -> Result<Vec<FontFaceRule>> {
    parse_font_faces(KATEX_FONT_FACES)
}

/// Parse a minified `@font-face` stylesheet.
///
/// Only whitespace may appear between blocks. Each block must declare
/// `font-family`, at least one `src`, `font-weight` and `font-style`, and
/// nothing else.
pub fn parse_font_faces(css: &str) -> Result<Vec<FontFaceRule>> {
    let mut rules = Vec::new();
    let mut cursor = 0;

    for caps in block_re().captures_iter(css) {
        let whole = caps.get(0).ok_or_else(|| anyhow!("empty match"))?;
        let between = &css[cursor..whole.start()];
        if !between.trim().is_empty() {
            bail!("unexpected text before @font-face at byte {cursor}: {between:?}");
        }
        cursor = whole.end();

        let rule = parse_block(&caps[1])?;
        trace!("parsed @font-face {} ({}/{})", rule.family, rule.weight, rule.style);
        rules.push(rule);
    }

    let trailing = &css[cursor..];
    if !trailing.trim().is_empty() {
        bail!("unexpected trailing text at byte {cursor}: {trailing:?}");
    }

    Ok(rules)
}

fn parse_block(body: &str) -> Result<FontFaceRule> {
    let mut family = None;
    let mut src = Vec::new();
    let mut weight = None;
    let mut style = None;

    for decl in body.split(';').filter(|d| !d.trim().is_empty()) {
        let (name, value) = decl
            .split_once(':')
            .ok_or_else(|| anyhow!("malformed declaration: {decl}"))?;

        match name {
            "font-family" => family = Some(value.to_string()),
            "src" => src.push(parse_src(value)?),
            "font-weight" => weight = Some(value.to_string()),
            "font-style" => style = Some(value.to_string()),
            other => bail!("unsupported @font-face descriptor: {other}"),
        }
    }

    let family = family.ok_or_else(|| anyhow!("@font-face without font-family: {body}"))?;
    if src.is_empty() {
        bail!("@font-face {family} has no src");
    }

    Ok(FontFaceRule {
        weight: weight.ok_or_else(|| anyhow!("@font-face {family} has no font-weight"))?,
        style: style.ok_or_else(|| anyhow!("@font-face {family} has no font-style"))?,
        family,
        src,
    })
}

fn parse_src(value: &str) -> Result<Vec<FontSource>> {
    let mut sources = Vec::new();
    let mut cursor = 0;

    for caps in source_re().captures_iter(value) {
        let whole = caps.get(0).ok_or_else(|| anyhow!("empty match"))?;
        let sep = &value[cursor..whole.start()];
        let expected = if sources.is_empty() { "" } else { "," };
        if sep != expected {
            bail!("malformed src list: {value}");
        }
        cursor = whole.end();

        sources.push(FontSource::new(
            &caps[1],
            caps.get(2).map(|m| m.as_str()),
        ));
    }

    if sources.is_empty() || cursor != value.len() {
        bail!("malformed src list: {value}");
    }

    Ok(sources)
}

fn block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@font-face\{([^}]*)\}").expect("valid block regex"))
}

fn source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"url\(([^)]*)\)(?: format\('([^']*)'\))?").expect("valid source regex")
    })
}

/// Builder-style filter over font-face rules.
#[derive(Debug, Clone, Default)]
pub struct FontFaceFilter {
    family_patterns: Vec<Regex>,
    weight: Option<String>,
    style: Option<String>,
}

impl FontFaceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family_patterns(mut self, patterns: Vec<Regex>) -> Self {
        self.family_patterns = patterns;
        self
    }

    pub fn with_weight(mut self, weight: Option<String>) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    /// Check whether a rule satisfies every configured constraint.
    pub fn matches(&self, rule: &FontFaceRule) -> bool {
        if let Some(weight) = &self.weight {
            if !weight_matches(weight, &rule.weight) {
                return false;
            }
        }

        if let Some(style) = &self.style {
            if !style.eq_ignore_ascii_case(&rule.style) {
                return false;
            }
        }

        if !self.family_patterns.is_empty()
            && !self.family_patterns.iter().any(|re| re.is_match(&rule.family))
        {
            return false;
        }

        true
    }

    pub fn apply(&self, rules: &[FontFaceRule]) -> Vec<FontFaceRule> {
        rules.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Compare weight tokens, treating the CSS keywords as their numeric values.
fn weight_matches(wanted: &str, actual: &str) -> bool {
    fn normalize(token: &str) -> &str {
        match token.trim() {
            t if t.eq_ignore_ascii_case("normal") => "400",
            t if t.eq_ignore_ascii_case("bold") => "700",
            t => t,
        }
    }
    normalize(wanted) == normalize(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: &str = "@font-face{font-family:KaTeX_Main;src:url(fonts/KaTeX_Main-Bold.eot);src:url(fonts/KaTeX_Main-Bold.eot#iefix) format('embedded-opentype'),url(fonts/KaTeX_Main-Bold.woff2) format('woff2');font-weight:700;font-style:normal}";

    #[test]
    fn parses_single_block() {
        let rules = parse_font_faces(ONE).expect("parse");
        assert_eq!(rules.len(), 1);

        let rule = &rules[0];
        assert_eq!(rule.family, "KaTeX_Main");
        assert_eq!(rule.weight, "700");
        assert_eq!(rule.style, "normal");
        assert_eq!(rule.src.len(), 2);
        assert_eq!(rule.src[0], vec![FontSource::new("fonts/KaTeX_Main-Bold.eot", None)]);
        assert_eq!(rule.formats(), vec!["embedded-opentype", "woff2"]);
        assert_eq!(rule.to_css(), ONE);
    }

    #[test]
    fn file_names_drop_directories_and_fragments() {
        let rule = &parse_font_faces(ONE).expect("parse")[0];
        assert_eq!(
            rule.file_names(),
            vec!["KaTeX_Main-Bold.eot", "KaTeX_Main-Bold.woff2"]
        );
    }

    #[test]
    fn rejects_unknown_descriptor() {
        let css = "@font-face{font-family:A;src:url(a.woff);font-display:swap;font-weight:400;font-style:normal}";
        let err = parse_font_faces(css).unwrap_err();
        assert!(err.to_string().contains("font-display"), "{err}");
    }

    #[test]
    fn rejects_missing_src() {
        let css = "@font-face{font-family:A;font-weight:400;font-style:normal}";
        assert!(parse_font_faces(css).is_err());
    }

    #[test]
    fn rejects_text_between_blocks() {
        let css = format!("{ONE}body{{margin:0}}{ONE}");
        assert!(parse_font_faces(&css).is_err());
    }

    #[test]
    fn weight_keywords_match_numbers() {
        assert!(weight_matches("bold", "700"));
        assert!(weight_matches("400", "normal"));
        assert!(!weight_matches("bold", "400"));
    }

    #[test]
    fn filter_by_family_and_style() {
        let rules = font_faces().expect("template parses");
        let filter = FontFaceFilter::new()
            .with_family_patterns(vec![Regex::new("^KaTeX_Main$").unwrap()])
            .with_style(Some("italic".into()));

        let hits = filter.apply(&rules);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].family, "KaTeX_Main");
        assert_eq!(hits[0].style, "italic");
    }
}
