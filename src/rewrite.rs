use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::config::RuleConfig;
use crate::error::Result;

#[derive(Clone)]
pub enum Replacement {
    /// `regex` replacement template (`$1`, `${name}`).
    Template(String),
    Callback(fn(&Captures<'_>) -> String),
}

/// One find/replace step.
#[derive(Clone)]
pub struct Rule {
    pattern: Regex,
    replacement: Replacement,
}

impl Rule {
    pub fn template(pattern: &str, template: &str) -> Result<Rule> {
        Ok(Rule {
            pattern: Regex::new(pattern)?,
            replacement: Replacement::Template(template.to_string()),
        })
    }

    pub fn callback(pattern: &str, callback: fn(&Captures<'_>) -> String) -> Result<Rule> {
        Ok(Rule {
            pattern: Regex::new(pattern)?,
            replacement: Replacement::Callback(callback),
        })
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.replacement {
            Replacement::Template(template) => self.pattern.replace_all(text, template.as_str()),
            Replacement::Callback(callback) => self
                .pattern
                .replace_all(text, |caps: &Captures<'_>| callback(caps)),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let replacement = match &self.replacement {
            Replacement::Template(t) => t.as_str(),
            Replacement::Callback(_) => "<callback>",
        };
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .field("replacement", &replacement)
            .finish()
    }
}

/// Ordered rule pipeline. Each rule sees the output of the one before it.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append rules read from configuration. Empty patterns are skipped.
    pub fn extend_from_config(&mut self, rules: &[RuleConfig]) -> Result<()> {
        for rule in rules.iter().filter(|r| !r.find.is_empty()) {
            self.push(Rule::template(&rule.find, &rule.replace)?);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            let changed = match rule.apply(&current) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(changed) => changed,
            };
            current = changed;
        }
        current
    }
}
