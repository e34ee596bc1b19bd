pub mod cleanup;

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ContentNode, NodeKind};
use crate::odt::StyleCatalog;

pub const LINE_END: &str = "\r\n";
pub const FOOTNOTE_OPEN: &str = "\\f + ";
pub const FOOTNOTE_CLOSE: &str = "\\f*";
pub const TAB: &str = "<tab>";
pub const UNKNOWN_PREFIX: &str = "UNKNOWN_";

static CHAPTER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([0-9]+)(.*)$").expect("chapter prefix regex"));

/// Recoverable problems found while serializing. Logged and returned to the
/// caller; they never stop the walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A node names a style that no stylesheet defined.
    StyleNotCataloged(String),
    /// A drop-cap paragraph does not start with a chapter number.
    UnexpectedDropCapShape { style: String, text: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::StyleNotCataloged(name) => write!(f, "style {name:?} is not cataloged"),
            Diagnostic::UnexpectedDropCapShape { style, text } => write!(
                f,
                "drop cap paragraph ({style}) does not begin with a number: {text:?}"
            ),
        }
    }
}

struct Serializer<'c, 'o> {
    catalog: &'c StyleCatalog,
    out: &'o mut String,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> Serializer<'c, '_> {
    fn marker_for(&mut self, node: &ContentNode) -> (Cow<'c, str>, bool) {
        let catalog = self.catalog;
        let Some(name) = node.style_name.as_deref().filter(|n| !n.is_empty()) else {
            return (Cow::Borrowed(""), false);
        };
        match catalog.get(name) {
            Some(style) => (Cow::Borrowed(style.marker.as_str()), style.is_drop_cap),
            None => {
                let diagnostic = Diagnostic::StyleNotCataloged(name.to_string());
                log::warn!("{diagnostic}");
                self.diagnostics.push(diagnostic);
                (Cow::Owned(format!("{UNKNOWN_PREFIX}{name}")), false)
            }
        }
    }

    /// Move a leading chapter number out of a drop-cap paragraph into a
    /// `\c` line. The text comes from the node itself, else from its first
    /// child, and is rewritten where it was found.
    fn split_chapter_number(&mut self, node: &mut ContentNode) {
        let style = node.style_name.clone().unwrap_or_default();
        let slot = if node.text.is_some() {
            Some(&mut node.text)
        } else {
            node.children.first_mut().map(|first| &mut first.text)
        };
        let text = slot.as_ref().and_then(|s| s.as_deref()).unwrap_or("");

        let Some(caps) = CHAPTER_PREFIX.captures(text) else {
            let diagnostic = Diagnostic::UnexpectedDropCapShape {
                style,
                text: text.to_string(),
            };
            log::warn!("{diagnostic}");
            self.diagnostics.push(diagnostic);
            return;
        };
        let number = caps[1].to_string();
        let rest = caps[2].to_string();

        self.out.push_str(LINE_END);
        self.out.push_str("\\c ");
        self.out.push_str(&number);
        if let Some(slot) = slot {
            *slot = Some(rest);
        }
    }

    fn write_node(&mut self, node: &mut ContentNode, in_footnote: bool) {
        let (marker, is_drop_cap) = self.marker_for(node);

        if is_drop_cap {
            self.split_chapter_number(node);
        }

        let mut in_footnote = in_footnote;
        match node.kind {
            NodeKind::Paragraph | NodeKind::Heading => {
                // A footnote's own marker already opened the run.
                if !marker.is_empty() && !in_footnote {
                    self.out.push_str(LINE_END);
                    self.out.push('\\');
                    self.out.push_str(&marker);
                    self.out.push(' ');
                }
            }
            NodeKind::Span => {
                if !marker.is_empty() {
                    self.out.push('\\');
                    self.out.push_str(&marker);
                    self.out.push(' ');
                }
            }
            NodeKind::Note => {
                self.out.push_str(FOOTNOTE_OPEN);
                in_footnote = true;
            }
            NodeKind::Tab => self.out.push_str(TAB),
            NodeKind::Other => {}
        }

        if let Some(text) = &node.text {
            self.out.push_str(text);
        }

        for child in &mut node.children {
            self.write_node(child, in_footnote);
        }

        match node.kind {
            NodeKind::Span if !marker.is_empty() => {
                self.out.push('\\');
                self.out.push_str(&marker);
                self.out.push('*');
            }
            NodeKind::Note => self.out.push_str(FOOTNOTE_CLOSE),
            _ => {}
        }

        if let Some(tail) = &node.tail {
            self.out.push_str(tail);
        }
    }
}

/// Append the SFM rendering of `root` to `out` and return the diagnostics
/// raised on the way. Drop-cap paragraphs lose their chapter digits from
/// the tree.
pub fn write_sfm(
    out: &mut String,
    root: &mut ContentNode,
    catalog: &StyleCatalog,
) -> Vec<Diagnostic> {
    let mut serializer = Serializer {
        catalog,
        out,
        diagnostics: Vec::new(),
    };
    serializer.write_node(root, false);
    serializer.diagnostics
}

pub fn to_sfm(root: &mut ContentNode, catalog: &StyleCatalog) -> (String, Vec<Diagnostic>) {
    let mut out = String::new();
    let diagnostics = write_sfm(&mut out, root, catalog);
    (out, diagnostics)
}
