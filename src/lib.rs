pub mod config;
mod error;
pub mod model;
pub mod odt;
pub mod rewrite;
pub mod scripture;
pub mod sfm;

pub use config::Config;
pub use error::{Error, Result};
pub use sfm::Diagnostic;

use std::path::{Path, PathBuf};
use std::time::Instant;

use odt::{OdtPackage, StyleCatalog};
use rewrite::RuleSet;

/// Serialized output of one document.
#[derive(Debug)]
pub struct Conversion {
    pub book_id: String,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Book identifier: the first three characters of the file name.
pub fn book_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().chars().take(3).collect())
        .unwrap_or_default()
}

pub fn sfm_file_name(book_id: &str) -> String {
    format!("_{book_id}.sfm")
}

/// Configured conversion pipeline. The post-pass rules are compiled once and
/// reused for every document.
pub struct Converter {
    config: Config,
    rules: RuleSet,
}

impl Converter {
    pub fn new(config: Config) -> Result<Converter> {
        let rules = sfm::cleanup::post_pass_rules(&config.cleanup)?;
        Ok(Converter { config, rules })
    }

    fn build_catalog(
        &self,
        styles: &roxmltree::Document,
        content: &roxmltree::Document,
    ) -> StyleCatalog {
        let mut catalog = StyleCatalog::new();
        catalog.extend_from(styles.root_element(), &self.config.markers);
        let library = catalog.len();
        catalog.extend_from(content.root_element(), &self.config.markers);
        log::debug!(
            "Style catalog: {} library styles, {} total after local styles",
            library,
            catalog.len()
        );
        catalog
    }

    pub fn convert_package(&self, package: &OdtPackage, book_id: &str) -> Result<Conversion> {
        let styles = roxmltree::Document::parse(&package.styles_xml)?;
        let content = roxmltree::Document::parse(&package.content_xml)?;
        let catalog = self.build_catalog(&styles, &content);

        let Some(text_node) = odt::text_root(&content) else {
            log::error!("Cannot find text node");
            return Err(Error::MissingTextRoot);
        };
        let mut tree = odt::content_tree(text_node);

        let mut raw = format!("\\id {book_id}{}", sfm::LINE_END);
        let diagnostics = sfm::write_sfm(&mut raw, &mut tree, &catalog);
        let text = self.rules.apply(&raw);

        Ok(Conversion {
            book_id: book_id.to_string(),
            text,
            diagnostics,
        })
    }

    pub fn convert_bytes(&self, input: &[u8], book_id: &str) -> Result<Conversion> {
        let package = OdtPackage::from_bytes(input)?;
        self.convert_package(&package, book_id)
    }

    /// Convert `input` and write `_<ID>.sfm` into `out_dir`.
    pub fn convert_file(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        let t0 = Instant::now();

        let package = OdtPackage::open(input)?;
        let conversion = self.convert_package(&package, &book_id(input))?;
        let t_convert = t0.elapsed();

        let output = out_dir.join(sfm_file_name(&conversion.book_id));
        std::fs::write(&output, conversion.text.as_bytes())?;
        let t_total = t0.elapsed();

        log::info!(
            "Converted {} -> {} ({} diagnostics): convert={:.1}ms, write={:.1}ms",
            input.display(),
            output.display(),
            conversion.diagnostics.len(),
            t_convert.as_secs_f64() * 1000.0,
            (t_total - t_convert).as_secs_f64() * 1000.0,
        );

        Ok(output)
    }

    /// Convert every `.odt` file directly inside `dir`. A failing document is
    /// logged and counted; the rest of the batch still runs.
    pub fn convert_directory(&self, dir: &Path, out_dir: &Path) -> Result<BatchSummary> {
        let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("odt"))
            })
            .collect();
        inputs.sort();

        let mut summary = BatchSummary::default();
        for input in &inputs {
            log::info!("Converting: {}", input.display());
            match self.convert_file(input, out_dir) {
                Ok(_) => summary.converted += 1,
                Err(e) => {
                    log::error!("Skipping {}: {e}", input.display());
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}

pub fn convert_odt_to_sfm(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    Converter::new(Config::default())?.convert_file(input, out_dir)
}

pub fn convert_odt_bytes(input: &[u8], book_id: &str) -> Result<Conversion> {
    Converter::new(Config::default())?.convert_bytes(input, book_id)
}

pub fn convert_directory(dir: &Path, out_dir: &Path, config: &Config) -> Result<BatchSummary> {
    Converter::new(config.clone())?.convert_directory(dir, out_dir)
}
