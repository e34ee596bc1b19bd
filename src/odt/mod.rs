mod styles;

use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{ContentNode, NodeKind};

pub use styles::{AttributedNode, StyleCatalog, find_attr, synthesize};

pub(crate) const STYLE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:style:1.0";
pub(crate) const FO_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0";
pub(crate) const OFFICE_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";
pub(crate) const TEXT_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";

pub const STYLES_MEMBER: &str = "styles.xml";
pub const CONTENT_MEMBER: &str = "content.xml";

/// The two XML members of an OpenDocument text package the converter needs.
pub struct OdtPackage {
    pub styles_xml: String,
    pub content_xml: String,
}

impl OdtPackage {
    pub fn open(path: &Path) -> Result<OdtPackage> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        OdtPackage::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<OdtPackage> {
        OdtPackage::from_reader(std::io::Cursor::new(bytes))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<OdtPackage> {
        let mut zip = zip::ZipArchive::new(reader)
            .map_err(|e| Error::Corrupt(format!("file is not a ZIP archive ({e})")))?;
        Ok(OdtPackage {
            styles_xml: read_member(&mut zip, STYLES_MEMBER)?,
            content_xml: read_member(&mut zip, CONTENT_MEMBER)?,
        })
    }
}

fn read_member<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = zip.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => Error::NotFound(name.to_string()),
        other => Error::Corrupt(format!("{name}: {other}")),
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::Corrupt(format!("{name}: {e}")))?;
    Ok(content)
}

/// The `office:text` element holding the document body, if any.
pub fn text_root<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.tag_name().name() == "text" && n.tag_name().namespace() == Some(OFFICE_NS))
}

/// Convert an element and everything below it into the text/tail tree the
/// serializer walks. Text nodes before the first child element become the
/// node's `text`; text after a child element becomes that child's `tail`.
pub fn content_tree(elem: roxmltree::Node) -> ContentNode {
    let mut node = ContentNode::new(NodeKind::from_local_name(elem.tag_name().name()));
    node.style_name = elem
        .attribute((TEXT_NS, "style-name"))
        .map(|s| s.to_string());

    for child in elem.children() {
        if child.is_element() {
            node.children.push(content_tree(child));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            let slot = match node.children.last_mut() {
                Some(last) => &mut last.tail,
                None => &mut node.text,
            };
            slot.get_or_insert_with(String::new).push_str(text);
        }
    }
    node
}
