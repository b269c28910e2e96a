//! Injection targets: an in-memory document head and raw HTML text

use std::sync::OnceLock;

use anyhow::{anyhow, bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::inject::StyleTarget;

/// A `<style>` element and its text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleNode {
    pub text: String,
}

/// A child of `<head>`. Anything that is not a style is kept as opaque markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HeadNode {
    Style(StyleNode),
    Other { markup: String },
}

/// Minimal document model: an optional head holding an ordered child list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    head: Option<Vec<HeadNode>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with an empty head.
    pub fn new() -> Self {
        Self {
            head: Some(Vec::new()),
        }
    }

    /// A document without a head element; injecting into it fails.
    pub fn headless() -> Self {
        Self { head: None }
    }

    pub fn with_head_node(mut self, node: HeadNode) -> Self {
        self.head.get_or_insert_with(Vec::new).push(node);
        self
    }

    pub fn head(&self) -> Option<&[HeadNode]> {
        self.head.as_deref()
    }

    /// Style nodes in head order.
    pub fn styles(&self) -> impl Iterator<Item = &StyleNode> {
        self.head.iter().flatten().filter_map(|node| match node {
            HeadNode::Style(style) => Some(style),
            HeadNode::Other { .. } => None,
        })
    }

    pub fn style_count(&self) -> usize {
        self.styles().count()
    }
}

impl StyleTarget for Document {
    fn append_style(&mut self, css_text: &str) -> Result<()> {
        let head = self
            .head
            .as_mut()
            .ok_or_else(|| anyhow!("document has no head element"))?;
        head.push(HeadNode::Style(StyleNode {
            text: css_text.to_string(),
        }));
        Ok(())
    }
}

/// An HTML page held as text. Styles go right before `</head>`, which makes
/// them the last children of the head.
///
/// Style text is raw text inside the element, so CSS containing `</style`
/// is refused: it would end the element early and leak the rest as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    html: String,
}

impl HtmlDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    pub fn has_head(&self) -> bool {
        head_close_re().is_match(&self.html)
    }
}

impl StyleTarget for HtmlDocument {
    fn append_style(&mut self, css_text: &str) -> Result<()> {
        if style_close_re().is_match(css_text) {
            bail!("style text contains </style and cannot be embedded in HTML");
        }

        let close = head_close_re()
            .find(&self.html)
            .ok_or_else(|| anyhow!("document has no </head> to inject into"))?;

        let element = format!("<style>{css_text}</style>");
        self.html.insert_str(close.start(), &element);
        Ok(())
    }
}

fn style_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</style").expect("valid style regex"))
}

fn head_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</head\s*>").expect("valid head regex"))
}
