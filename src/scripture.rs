//! Normalization pass over an already marked-up scripture project.
//!
//! Works chapter by chapter: every `(reference, text)` pair from a
//! [`ChapterSource`] goes through the scripture rule list and is handed to a
//! [`ChapterSink`], which is saved once at the end.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::rewrite::{Rule, RuleSet};

// `[[:space:]]` is ASCII whitespace only; `\s` would also match NBSP.
static SCRIPTURE_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(vec![
        Rule::template(
            r"\\Super[[:space:]]+([0-9][^ \\[:space:]]*)[[:space:]]*\\Super\*",
            "\r\n\\v ${1} ",
        )
        .expect("scripture rule"),
        Rule::template(
            r"\\Super[[:space:]]+([0-9][^ \\[:space:]]*) (.)\\Super\*",
            "\r\n\\v ${1} ${2}",
        )
        .expect("scripture rule"),
        // Fullwidth hyphen-minus.
        Rule::template(r"\x{FF0D}", "-").expect("scripture rule"),
        Rule::template(r"(\\c [0-9]+\r\n\\p[^[:space:]]*)", "${1}\r\n\\v 1 ")
            .expect("scripture rule"),
        Rule::template(r"\\Un", "\\pn").expect("scripture rule"),
        Rule::template(
            r"(\\p[^[:space:]]*) \\Bd (.*)\\Bd\*[[:space:]]*\r\n",
            "${1}Bd ${2}\r\n",
        )
        .expect("scripture rule"),
        Rule::template(r"\\[^\\s]+Super", "\\x1Super").expect("scripture rule"),
    ])
});

static CHAPTER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\\c[ \t]+[0-9]+").expect("chapter marker regex"));
static BOOK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\\id[ \t]+(\S+)").expect("book id regex"));

pub fn normalize_text(text: &str) -> String {
    SCRIPTURE_RULES.apply(text)
}

pub trait ChapterSource {
    /// Every chapter once, in canonical order.
    fn chapters(&self) -> impl Iterator<Item = (String, String)> + '_;
}

pub trait ChapterSink {
    fn put_text(&mut self, reference: &str, text: &str) -> Result<()>;
    /// Persist project data after content changed.
    fn save(&mut self) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub chapters: usize,
    pub changed: usize,
}

pub fn normalize_corpus<S, K>(source: &S, sink: &mut K) -> Result<NormalizeSummary>
where
    S: ChapterSource,
    K: ChapterSink,
{
    let mut summary = NormalizeSummary::default();
    for (reference, text) in source.chapters() {
        let new_text = normalize_text(&text);
        sink.put_text(&reference, &new_text)?;
        summary.chapters += 1;
        if new_text != text {
            summary.changed += 1;
            let book = reference.rsplit_once(' ').map_or(reference.as_str(), |(book, _)| book);
            log::info!("{book} changed");
        } else {
            log::debug!("{reference} unchanged");
        }
    }
    sink.save()?;
    Ok(summary)
}

#[derive(Clone)]
struct Book {
    file_name: String,
    /// Segments in file order. Segment 0 is everything before the first `\c`
    /// line and may be empty; every later segment starts at a `\c` line.
    segments: Vec<String>,
}

impl Book {
    fn parse(file_name: String, text: &str) -> Book {
        let mut segments = Vec::new();
        let mut start = 0;
        for m in CHAPTER_MARKER.find_iter(text) {
            segments.push(text[start..m.start()].to_string());
            start = m.start();
        }
        segments.push(text[start..].to_string());
        Book {
            file_name,
            segments,
        }
    }

    fn text(&self) -> String {
        self.segments.concat()
    }
}

/// A directory of `*.sfm` files, one book per file. Usable as both source
/// and sink. References are `"<BOOK> <segment>"`, where the segment counts
/// `\c` lines in file order; for a book numbered 1, 2, ... in order it is
/// the chapter number.
pub struct SfmProject {
    dir: PathBuf,
    books: BTreeMap<String, Book>,
    dirty: BTreeSet<String>,
}

impl SfmProject {
    pub fn open(dir: &Path) -> Result<SfmProject> {
        let mut books = BTreeMap::new();
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("sfm")))
            .collect();
        entries.sort();
        for path in entries {
            let text = std::fs::read_to_string(&path)?;
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let id = BOOK_ID
                .captures(&text)
                .map(|c| c[1].to_string())
                .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .unwrap_or_default();
            books.insert(id, Book::parse(file_name.to_string(), &text));
        }
        log::debug!("Opened project {} with {} books", dir.display(), books.len());
        Ok(SfmProject {
            dir: dir.to_path_buf(),
            books,
            dirty: BTreeSet::new(),
        })
    }

    /// Empty project that writes into `dir` on save. Books it has not seen
    /// before are written as `_<BOOK>.sfm`.
    pub fn create(dir: &Path) -> SfmProject {
        SfmProject {
            dir: dir.to_path_buf(),
            books: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Copy of this project that saves every book, under its original file
    /// name, into `dir`.
    pub fn with_output_dir(&self, dir: &Path) -> SfmProject {
        SfmProject {
            dir: dir.to_path_buf(),
            books: self.books.clone(),
            dirty: self.books.keys().cloned().collect(),
        }
    }

    pub fn book_text(&self, book: &str) -> Option<String> {
        self.books.get(book).map(Book::text)
    }
}

fn split_reference(reference: &str) -> Result<(&str, usize)> {
    reference
        .rsplit_once(' ')
        .and_then(|(book, segment)| segment.parse().ok().map(|n| (book, n)))
        .ok_or_else(|| Error::BadReference(reference.to_string()))
}

impl ChapterSource for SfmProject {
    fn chapters(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.books.iter().flat_map(|(id, book)| {
            book.segments
                .iter()
                .enumerate()
                .map(move |(n, text)| (format!("{id} {n}"), text.clone()))
        })
    }
}

impl ChapterSink for SfmProject {
    fn put_text(&mut self, reference: &str, text: &str) -> Result<()> {
        let (id, index) = split_reference(reference)?;
        let book = self.books.entry(id.to_string()).or_insert_with(|| Book {
            file_name: crate::sfm_file_name(id),
            segments: Vec::new(),
        });
        if book.segments.len() <= index {
            book.segments.resize(index + 1, String::new());
        }
        if book.segments[index] != text {
            book.segments[index] = text.to_string();
            self.dirty.insert(id.to_string());
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        for id in std::mem::take(&mut self.dirty) {
            let Some(book) = self.books.get(&id) else {
                continue;
            };
            let path = self.dir.join(&book.file_name);
            std::fs::write(&path, book.text())?;
            log::info!("Wrote {}", path.display());
        }
        Ok(())
    }
}
