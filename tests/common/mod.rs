use std::io::{Cursor, Write};
use std::path::Path;

pub const NAMESPACES: &str = r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0""#;

/// Library stylesheet shared by the fixtures.
pub fn styles_xml() -> String {
    format!(
        concat!(
            r#"<office:document-styles {}><office:styles>"#,
            r#"<style:style style:name="Standard" style:family="paragraph"/>"#,
            r#"<style:style style:name="Heading1" style:family="paragraph" style:parent-style-name="Standard"><style:text-properties fo:font-weight="bold"/></style:style>"#,
            r#"<style:style style:name="Footnote" style:family="paragraph"><style:paragraph-properties fo:margin-left="0.37in"/></style:style>"#,
            r#"<style:style style:name="Verse" style:family="text"><style:text-properties style:text-position="super 58%"/></style:style>"#,
            r#"</office:styles></office:document-styles>"#,
        ),
        NAMESPACES
    )
}

/// content.xml with the given automatic styles and body.
pub fn content_xml(automatic_styles: &str, body: &str) -> String {
    format!(
        r#"<office:document-content {NAMESPACES}><office:automatic-styles>{automatic_styles}</office:automatic-styles><office:body><office:text>{body}</office:text></office:body></office:document-content>"#
    )
}

pub fn odt_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer
        .start_file("mimetype", options)
        .expect("start mimetype");
    writer
        .write_all(b"application/vnd.oasis.opendocument.text")
        .expect("write mimetype");
    for (name, text) in members {
        writer.start_file(*name, options).expect("start member");
        writer.write_all(text.as_bytes()).expect("write member");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn odt(automatic_styles: &str, body: &str) -> Vec<u8> {
    odt_bytes(&[
        ("styles.xml", &styles_xml()),
        ("content.xml", &content_xml(automatic_styles, body)),
    ])
}

pub fn write_odt(dir: &Path, file_name: &str, bytes: &[u8]) {
    std::fs::write(dir.join(file_name), bytes).expect("write fixture");
}
