//! Post-pass rewrites for serialized SFM text.
//!
//! The serializer emits one marker pair per styled run, so the raw text is
//! full of artifacts: adjacent runs of the same style, verse numbers still
//! wrapped in superscript spans, footnote callers copied into the note
//! body. The rules below fold these into cleaner markup. They run in order,
//! each against the output of the previous one.

use once_cell::sync::Lazy;
use regex::Captures;

use crate::config::CleanupConfig;
use crate::error::Result;
use crate::rewrite::{Rule, RuleSet};

static FOOTNOTE_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(vec![
        // Underline wins over bold inside notes.
        Rule::template("BdUn", "Un").expect("footnote rule"),
        Rule::template(r"\\Bd[ *]", "").expect("footnote rule"),
        // Caller digits, empty parens or tabs copied after the note opener.
        Rule::template(r"\\f \+ (?:[0-9]+|\(\)|<tab>)+", "\\f + ").expect("footnote rule"),
    ])
});

fn clean_footnote(caps: &Captures<'_>) -> String {
    FOOTNOTE_RULES.apply(&caps[0])
}

// `[[:space:]]` is ASCII whitespace only; `\s` would also match NBSP.
static POST_PASS_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(vec![
        Rule::template(
            r"\\Super[[:space:]]+([0-9][^\\]*)[[:space:]]*\\Super\*",
            "\r\n\r\n\\v ${1} ",
        )
        .expect("post-pass rule"),
        Rule::template(r"\\p \\Fs29 ([0-9]+)\\Fs29\*", "\r\n\\c ${1}\r\n\\p ")
            .expect("post-pass rule"),
        Rule::template(r"\\(?:Default_Paragraph_Font)?Super[ *]", "").expect("post-pass rule"),
        Rule::template(r"\\Bd\*([[:space:]]*)\\Bd ", "${1}").expect("post-pass rule"),
        Rule::template(r"\\Un\*([[:space:]]*)\\Un ", "${1}").expect("post-pass rule"),
        Rule::callback(r"\\f .*?\\f\*", clean_footnote).expect("post-pass rule"),
        Rule::template(r"(?:\([[:space:]]*)+\\f", "\\f").expect("post-pass rule"),
        Rule::template(r"\\f\*(?:[[:space:]]*\))+", "\\f*").expect("post-pass rule"),
    ])
});

/// The built-in rules followed by any configured extras.
pub fn post_pass_rules(config: &CleanupConfig) -> Result<RuleSet> {
    let mut rules = POST_PASS_RULES.clone();
    rules.extend_from_config(&config.extra_rules)?;
    Ok(rules)
}

pub fn clean(text: &str) -> String {
    POST_PASS_RULES.apply(text)
}
