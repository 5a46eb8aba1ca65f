// Documentation comment markup
//
// Stores hand comments over as loosely typed nodes; they are converted into
// the closed `Markup` set before rendering, and an unrecognised kind is an
// error rather than a silent fallback.

use crate::error::{Error, Result};
use crate::render::escape::escape;
use serde::{Deserialize, Serialize};

/// A comment node as serialized by a documentation store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<CommentNode>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub numbered: bool,
}

impl CommentNode {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("paragraph", text)
    }
}

/// Comment markup node kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Rule,
    Heading(String),
    Paragraph(String),
    Verbatim(String),
    ListItem(String),
    List { numbered: bool, items: Vec<Markup> },
}

impl TryFrom<&CommentNode> for Markup {
    type Error = Error;

    fn try_from(node: &CommentNode) -> Result<Self> {
        let markup = match node.kind.to_ascii_lowercase().as_str() {
            "rule" => Markup::Rule,
            "heading" | "h" => Markup::Heading(node.text.clone()),
            "paragraph" | "p" => Markup::Paragraph(node.text.clone()),
            "verbatim" | "verb" => Markup::Verbatim(node.text.clone()),
            "list_item" | "li" => Markup::ListItem(node.text.clone()),
            "list" => Markup::List {
                numbered: node.numbered,
                items: convert(&node.items)?,
            },
            _ => return Err(Error::UnknownMarkup(node.kind.clone())),
        };
        Ok(markup)
    }
}

/// Convert a store comment into typed markup
pub fn convert(nodes: &[CommentNode]) -> Result<Vec<Markup>> {
    nodes.iter().map(Markup::try_from).collect()
}

impl Markup {
    /// Render this node as escaped HTML
    pub fn to_html(&self) -> String {
        match self {
            Markup::Rule => String::new(),
            Markup::Heading(text) => format!("<h2>{}</h2>", escape(text)),
            Markup::Paragraph(text) => format!("<p>{}</p>", escape(text)),
            Markup::Verbatim(text) => format!("<pre>{}</pre>", escape(strip_leading_blank(text))),
            Markup::ListItem(text) => format!("<li>{}</li>", escape(text)),
            Markup::List { numbered, items } => {
                let (open, close) = if *numbered {
                    ("<ol>", "</ol>")
                } else {
                    ("<ul>", "</ul>")
                };
                let body: Vec<String> = items.iter().map(Markup::to_html).collect();
                format!("{}{}{}", open, body.join("\n"), close)
            }
        }
    }
}

/// Render a whole comment; empty when there is nothing to show
pub fn render_comment(comment: &[Markup]) -> String {
    comment
        .iter()
        .map(Markup::to_html)
        .filter(|html| !html.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// The dictionary compiler keeps whitespace between <pre> and the first line.
fn strip_leading_blank(text: &str) -> &str {
    let lead = text.len() - text.trim_start().len();
    match text[..lead].rfind('\n') {
        Some(pos) => &text[pos + 1..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_known_kinds() {
        let nodes = vec![
            CommentNode::new("rule", ""),
            CommentNode::new("H", "Usage"),
            CommentNode::paragraph("Iterates."),
            CommentNode::new("verbatim", "a.each { }"),
        ];
        let markup = convert(&nodes).unwrap();
        assert_eq!(markup[0], Markup::Rule);
        assert_eq!(markup[1], Markup::Heading("Usage".to_string()));
        assert_eq!(markup[2], Markup::Paragraph("Iterates.".to_string()));
        assert_eq!(markup[3], Markup::Verbatim("a.each { }".to_string()));
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let nodes = vec![CommentNode::new("blockquote", "nope")];
        let err = convert(&nodes).unwrap_err();
        assert!(matches!(err, Error::UnknownMarkup(kind) if kind == "blockquote"));
    }

    #[test]
    fn test_unknown_kind_inside_list_is_error() {
        let list = CommentNode {
            kind: "list".to_string(),
            items: vec![CommentNode::new("table", "")],
            ..Default::default()
        };
        assert!(convert(&[list]).is_err());
    }

    #[test]
    fn test_rule_renders_nothing() {
        assert_eq!(render_comment(&[Markup::Rule]), "");
    }

    #[test]
    fn test_paragraph_is_escaped() {
        let html = Markup::Paragraph("a < b & c".to_string()).to_html();
        assert_eq!(html, "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_list_rendering() {
        let list = Markup::List {
            numbered: true,
            items: vec![
                Markup::ListItem("one".to_string()),
                Markup::ListItem("two".to_string()),
            ],
        };
        assert_eq!(list.to_html(), "<ol><li>one</li>\n<li>two</li></ol>");

        let bullets = Markup::List {
            numbered: false,
            items: vec![Markup::ListItem("x".to_string())],
        };
        assert_eq!(bullets.to_html(), "<ul><li>x</li></ul>");
    }

    #[test]
    fn test_verbatim_drops_leading_blank_lines() {
        let html = Markup::Verbatim("\n  \n  x = 1".to_string()).to_html();
        assert_eq!(html, "<pre>  x = 1</pre>");
    }

    #[test]
    fn test_render_comment_joins_nodes() {
        let comment = vec![
            Markup::Paragraph("first".to_string()),
            Markup::Rule,
            Markup::Paragraph("second".to_string()),
        ];
        assert_eq!(render_comment(&comment), "<p>first</p>\n<p>second</p>");
    }
}
