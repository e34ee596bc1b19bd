use std::collections::HashMap;

use crate::config::MarkerConfig;
use crate::model::{StyleDescriptor, StyleKind};

use super::{FO_NS, STYLE_NS};

/// Minimal view of an attributed tree node, enough to search style
/// properties and find `style` elements.
pub trait AttributedNode<'a>: Copy {
    fn local_name(self) -> &'a str;
    fn attribute_value(self, ns: &str, name: &str) -> Option<&'a str>;
    fn child_elements(self) -> impl Iterator<Item = Self>;
}

impl<'a, 'input: 'a> AttributedNode<'a> for roxmltree::Node<'a, 'input> {
    fn local_name(self) -> &'a str {
        self.tag_name().name()
    }

    fn attribute_value(self, ns: &str, name: &str) -> Option<&'a str> {
        self.attribute((ns, name))
    }

    fn child_elements(self) -> impl Iterator<Item = Self> {
        self.children().filter(|n| n.is_element())
    }
}

/// Value of an attribute on `node` itself, else the first non-empty value
/// found on any descendant (depth first). Style engines put most properties
/// on nested `*-properties` elements.
pub fn find_attr<'a, N: AttributedNode<'a>>(node: N, ns: &str, name: &str) -> Option<&'a str> {
    if let Some(value) = node.attribute_value(ns, name) {
        return Some(value);
    }
    node.child_elements()
        .find_map(|child| find_attr(child, ns, name).filter(|v| !v.is_empty()))
}

fn is_default(defaults: &[String], value: &str) -> bool {
    defaults.iter().any(|d| d == value)
}

/// Drop a two-character unit suffix ("in", "pt", "cm").
fn strip_unit(value: &str) -> &str {
    let mut chars = value.chars();
    chars.next_back();
    chars.next_back();
    chars.as_str()
}

/// Length in hundredths of its unit, truncated toward zero.
fn hundredths(value: &str) -> Option<i64> {
    strip_unit(value)
        .trim()
        .parse::<f64>()
        .ok()
        .map(|v| (v * 100.0).trunc() as i64)
}

/// Build the descriptor for one `style:style` node. Facet codes are
/// appended in a fixed order so the same attributes always give the same
/// marker.
pub fn synthesize<'a, N: AttributedNode<'a>>(node: N, config: &MarkerConfig) -> StyleDescriptor {
    let attr = |ns: &str, name: &str| find_attr(node, ns, name).unwrap_or("");

    let name = attr(STYLE_NS, "name");
    let kind = if attr(STYLE_NS, "family") == "paragraph" {
        StyleKind::Paragraph
    } else {
        StyleKind::Character
    };
    let mut marker = String::from(match kind {
        StyleKind::Paragraph => "p",
        StyleKind::Character => "",
    });

    let is_drop_cap = !attr(STYLE_NS, "lines").is_empty();

    let parent = attr(STYLE_NS, "parent-style-name");
    if !parent.is_empty() && !is_default(&config.default_parent_names, parent) {
        if config.escaped_space.is_empty() {
            marker.push_str(parent);
        } else {
            marker.push_str(&parent.replace(&config.escaped_space, ""));
        }
    }

    let text_position = attr(STYLE_NS, "text-position");
    if !text_position.is_empty() && !text_position.starts_with('-') {
        marker.push_str("Super");
    }

    if attr(FO_NS, "text-align") == "center" {
        marker.push_str("Cntr");
    }

    let margin_left = attr(FO_NS, "margin-left");
    if !margin_left.is_empty() && !is_default(&config.default_margin_lefts, margin_left) {
        match hundredths(margin_left) {
            Some(v) => marker.push_str(&format!("Lft{v}")),
            None => log::warn!("Style {name}: unreadable margin-left {margin_left:?}"),
        }
    }

    if let Some(default_indents) = config
        .default_text_indents
        .as_deref()
        .filter(|_| config.tracks_text_indents())
    {
        let indent = attr(FO_NS, "text-indent");
        if !indent.is_empty() && !is_default(default_indents, indent) {
            match hundredths(indent) {
                Some(v) => marker.push_str(&format!("In{v}")),
                None => log::warn!("Style {name}: unreadable text-indent {indent:?}"),
            }
        }
    }

    let font_size = attr(FO_NS, "font-size");
    if !font_size.is_empty() && !is_default(&config.default_font_sizes, font_size) {
        marker.push_str("Fs");
        marker.push_str(strip_unit(font_size));
    }

    if attr(FO_NS, "font-style") == "italic" {
        marker.push_str("It");
    }

    if attr(FO_NS, "font-weight") == "bold" {
        marker.push_str("Bd");
    }

    if !attr(STYLE_NS, "text-underline-style").is_empty() {
        marker.push_str("Un");
        if attr(STYLE_NS, "text-underline-type") == "double" {
            marker.push_str("Dbl");
        }
    }

    StyleDescriptor {
        name: name.to_string(),
        kind,
        is_drop_cap,
        marker,
    }
}

/// Style name -> descriptor. Filled from the library stylesheet first and
/// then from the document's own styles, which replace same-named entries.
#[derive(Clone, Debug, Default)]
pub struct StyleCatalog {
    styles: HashMap<String, StyleDescriptor>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        StyleCatalog::default()
    }

    /// Add a descriptor for every `style` element at or below `root`.
    pub fn extend_from<'a, N: AttributedNode<'a>>(&mut self, root: N, config: &MarkerConfig) {
        if root.local_name() == "style" {
            let style = synthesize(root, config);
            log::debug!("Style {:?} -> \\{}", style.name, style.marker);
            self.insert(style);
        }
        for child in root.child_elements() {
            self.extend_from(child, config);
        }
    }

    pub fn insert(&mut self, style: StyleDescriptor) {
        self.styles.insert(style.name.clone(), style);
    }

    pub fn get(&self, name: &str) -> Option<&StyleDescriptor> {
        self.styles.get(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_doc(body: &str) -> String {
        format!(
            r#"<office:document-styles
                xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
                xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0"
                xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"><office:styles>{body}</office:styles></office:document-styles>"#
        )
    }

    fn descriptor(body: &str, config: &MarkerConfig) -> StyleDescriptor {
        let xml = style_doc(body);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let node = doc
            .descendants()
            .find(|n| n.tag_name().name() == "style")
            .unwrap();
        synthesize(node, config)
    }

    #[test]
    fn bold_heading_ignores_default_parent() {
        let d = descriptor(
            r#"<style:style style:name="Heading1" style:family="paragraph" style:parent-style-name="Standard">
                 <style:text-properties fo:font-weight="bold"/>
               </style:style>"#,
            &MarkerConfig::default(),
        );
        assert_eq!(d.name, "Heading1");
        assert_eq!(d.kind, StyleKind::Paragraph);
        assert_eq!(d.marker, "pBd");
        assert!(!d.is_drop_cap);
    }

    #[test]
    fn superscript_only_for_raised_position() {
        let config = MarkerConfig::default();
        let up = descriptor(
            r#"<style:style style:name="T1" style:family="text">
                 <style:text-properties style:text-position="50% 58%"/>
               </style:style>"#,
            &config,
        );
        assert_eq!(up.kind, StyleKind::Character);
        assert_eq!(up.marker, "Super");

        let down = descriptor(
            r#"<style:style style:name="T2" style:family="text">
                 <style:text-properties style:text-position="-20% 58%"/>
               </style:style>"#,
            &config,
        );
        assert!(!down.marker.contains("Super"));
        assert_eq!(down.marker, "");
    }

    #[test]
    fn margin_left_in_hundredths() {
        let d = descriptor(
            r#"<style:style style:name="P3" style:family="paragraph">
                 <style:paragraph-properties fo:margin-left="0.37in" fo:text-align="center"/>
               </style:style>"#,
            &MarkerConfig::default(),
        );
        assert_eq!(d.marker, "pCntrLft37");

        let d = descriptor(
            r#"<style:style style:name="P4" style:family="paragraph">
                 <style:paragraph-properties fo:margin-left="0in"/>
               </style:style>"#,
            &MarkerConfig::default(),
        );
        assert_eq!(d.marker, "p");
    }

    #[test]
    fn text_indent_needs_tracking_enabled() {
        let body = r#"<style:style style:name="P5" style:family="paragraph">
                 <style:paragraph-properties fo:text-indent="0.5in"/>
               </style:style>"#;
        assert_eq!(descriptor(body, &MarkerConfig::default()).marker, "p");

        let config = MarkerConfig {
            default_text_indents: Some(vec!["0in".to_string()]),
            ..MarkerConfig::default()
        };
        assert_eq!(descriptor(body, &config).marker, "pIn50");
    }

    #[test]
    fn facets_in_fixed_order() {
        let d = descriptor(
            r#"<style:style style:name="P7" style:family="paragraph" style:parent-style-name="Heading_20_1">
                 <style:paragraph-properties fo:margin-left="1.25in" fo:text-align="center"/>
                 <style:text-properties fo:font-size="20pt" fo:font-style="italic" fo:font-weight="bold"
                   style:text-underline-style="solid" style:text-underline-type="double"
                   style:text-position="super 58%"/>
               </style:style>"#,
            &MarkerConfig::default(),
        );
        assert_eq!(d.marker, "pHeading1SuperCntrLft125Fs20ItBdUnDbl");
    }

    #[test]
    fn default_font_size_omitted() {
        let d = descriptor(
            r#"<style:style style:name="T3" style:family="text">
                 <style:text-properties fo:font-size="12pt" fo:font-style="italic"/>
               </style:style>"#,
            &MarkerConfig::default(),
        );
        assert_eq!(d.marker, "It");
    }

    #[test]
    fn drop_cap_from_nested_element() {
        let d = descriptor(
            r#"<style:style style:name="P2" style:family="paragraph">
                 <style:paragraph-properties><style:drop-cap style:lines="2" style:length="1"/></style:paragraph-properties>
               </style:style>"#,
            &MarkerConfig::default(),
        );
        assert!(d.is_drop_cap);
        assert_eq!(d.marker, "p");
    }

    #[test]
    fn synthesis_is_deterministic() {
        let body = r#"<style:style style:name="T9" style:family="text">
                 <style:text-properties fo:font-weight="bold" style:text-underline-style="solid"/>
               </style:style>"#;
        let config = MarkerConfig::default();
        assert_eq!(descriptor(body, &config), descriptor(body, &config));
    }

    #[test]
    fn local_styles_override_library_styles() {
        let config = MarkerConfig::default();
        let library = style_doc(
            r#"<style:style style:name="A" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>
               <style:style style:name="B" style:family="text"><style:text-properties fo:font-style="italic"/></style:style>"#,
        );
        let local = style_doc(
            r#"<style:style style:name="A" style:family="text"><style:text-properties fo:font-style="italic"/></style:style>"#,
        );
        let library = roxmltree::Document::parse(&library).unwrap();
        let local = roxmltree::Document::parse(&local).unwrap();

        let mut catalog = StyleCatalog::new();
        catalog.extend_from(library.root_element(), &config);
        catalog.extend_from(local.root_element(), &config);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("A").unwrap().marker, "It");
        assert_eq!(catalog.get("B").unwrap().marker, "It");
    }

    #[test]
    fn find_attr_prefers_self_then_descendants() {
        let xml = style_doc(
            r#"<style:style style:name="X"><style:text-properties fo:font-size=""/><style:other><style:deep fo:font-size="20pt"/></style:other></style:style>"#,
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let node = doc
            .descendants()
            .find(|n| n.tag_name().name() == "style")
            .unwrap();
        assert_eq!(find_attr(node, STYLE_NS, "name"), Some("X"));
        assert_eq!(find_attr(node, FO_NS, "font-size"), Some("20pt"));
        assert_eq!(find_attr(node, FO_NS, "font-weight"), None);
    }
}
