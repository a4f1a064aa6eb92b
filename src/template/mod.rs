//! Command templates with named `{placeholder}` substitution points.
//!
//! A template is parsed once; the set of placeholders it uses is known up
//! front so an experiment can reject templates that reference values it will
//! never supply. `{{` and `}}` produce literal braces.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub const EXPERIMENT: &str = "experiment";
pub const WORKING_DIR: &str = "working_dir";
pub const DATASET: &str = "dataset";
pub const RESULT: &str = "result";
pub const LOG_FILE: &str = "log_file";
pub const SUFFIX: &str = "suffix";
pub const PARAM: &str = "param";
pub const SCRATCH_DIR: &str = "scratch_dir";
pub const DATA_DIR: &str = "data_dir";

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unclosed '{{' at byte {offset} in \"{template}\"")]
    Unclosed { template: String, offset: usize },

    #[error("unmatched '}}' at byte {offset} in \"{template}\"")]
    UnmatchedClose { template: String, offset: usize },

    #[error("invalid placeholder name '{name}' in \"{template}\"")]
    InvalidName { template: String, name: String },

    #[error("no value supplied for placeholder '{placeholder}' in \"{template}\"")]
    MissingValue { template: String, placeholder: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed { template: source.to_string(), offset });
                    }
                    if name.is_empty() || !name.chars().all(|n| n.is_ascii_alphanumeric() || n == '_') {
                        return Err(TemplateError::InvalidName { template: source.to_string(), name });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    return Err(TemplateError::UnmatchedClose { template: source.to_string(), offset });
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(CommandTemplate { source: source.to_string(), segments })
    }

    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Fails on the first placeholder not contained in `available`.
    pub fn check<'a>(&self, available: impl IntoIterator<Item = &'a str>) -> Result<(), TemplateError> {
        let available: BTreeSet<&str> = available.into_iter().collect();
        match self.placeholders().into_iter().find(|p| !available.contains(p)) {
            Some(missing) => Err(self.missing(missing)),
            None => Ok(()),
        }
    }

    pub fn render(&self, values: &Substitutions) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len() * 2);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values.get(name).ok_or_else(|| self.missing(name))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    fn missing(&self, placeholder: &str) -> TemplateError {
        TemplateError::MissingValue {
            template: self.source.clone(),
            placeholder: placeholder.to_string(),
        }
    }
}

/// Placeholder name -> value mapping for one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}
