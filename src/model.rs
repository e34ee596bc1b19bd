#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
}

/// Resolved view of one named style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleDescriptor {
    pub name: String,
    pub kind: StyleKind,
    pub is_drop_cap: bool,
    /// Concatenated facet codes; empty means nothing is emitted.
    pub marker: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    Heading,
    Span,
    Note,
    Tab,
    Other,
}

impl NodeKind {
    pub fn from_local_name(name: &str) -> NodeKind {
        match name {
            "p" => NodeKind::Paragraph,
            "h" => NodeKind::Heading,
            "span" => NodeKind::Span,
            "note" => NodeKind::Note,
            "tab" => NodeKind::Tab,
            _ => NodeKind::Other,
        }
    }
}

/// Element of the content tree in text/tail form: `text` precedes the
/// first child, `tail` follows the node's end and precedes the next sibling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentNode {
    pub kind: NodeKind,
    pub style_name: Option<String>,
    pub text: Option<String>,
    pub children: Vec<ContentNode>,
    pub tail: Option<String>,
}

impl ContentNode {
    pub fn new(kind: NodeKind) -> Self {
        ContentNode {
            kind,
            style_name: None,
            text: None,
            children: Vec::new(),
            tail: None,
        }
    }

    pub fn styled(mut self, style_name: &str) -> Self {
        self.style_name = Some(style_name.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_tail(mut self, tail: &str) -> Self {
        self.tail = Some(tail.to_string());
        self
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }
}
