//! Structural reader for the generated `bike-data.js` file.
//!
//! The file is scanned into tokens (identifiers, quoted strings, punctuation;
//! comments dropped). Every innermost `{ ... }` is read as a list of
//! `name: 'value'` pairs using the same field names the renderer writes, so
//! generation and extraction share one schema. Pairs that do not have that
//! shape are skipped rather than rejected.
//!
//! Batch-filled placeholder entries are usually produced by a loop in the page
//! script rather than written out as objects; those are caught by a secondary
//! [`GeneratedIdTemplate`] scan over the raw text.

use std::fs;
use std::path::Path;

use log::{debug, info};
use regex::Regex;
use serde::Deserialize;

use crate::error::{LedgerError, Result};
use crate::record::{Record, RecordSet};

pub const DEFAULT_GENERATED_PREFIX: &str = "MD9HAPXF4GR71";
pub const DEFAULT_GENERATED_DIGITS: usize = 4;

/// Fixed prefix followed by a run of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratedIdTemplate {
    pub prefix: String,
    pub digits: usize,
}

impl Default for GeneratedIdTemplate {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_GENERATED_PREFIX.to_string(),
            digits: DEFAULT_GENERATED_DIGITS,
        }
    }
}

impl GeneratedIdTemplate {
    pub fn to_regex(&self) -> Result<Regex> {
        let pattern = format!("{}[0-9]{{{}}}", regex::escape(&self.prefix), self.digits);
        Ok(Regex::new(&pattern)?)
    }

    /// Every match in `text`, repeats included, in order of appearance.
    pub fn find_all(&self, text: &str) -> Result<Vec<String>> {
        let pattern = self.to_regex()?;
        Ok(pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Punct(char),
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '\'' | '"' | '`' => {
                let quote = c;
                let mut value = String::new();
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('r') => value.push('\r'),
                            Some('t') => value.push('\t'),
                            Some(other) => value.push(other),
                            None => break,
                        },
                        q if q == quote => break,
                        other => value.push(other),
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if is_ident_char(c) => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    ident.push(next);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            other => tokens.push(Token::Punct(other)),
        }
    }

    tokens
}

/// Token slices between each innermost pair of braces.
fn object_bodies(tokens: &[Token]) -> Vec<&[Token]> {
    let mut bodies = Vec::new();
    let mut start = None;
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('{') => start = Some(index + 1),
            Token::Punct('}') => {
                if let Some(begin) = start.take() {
                    bodies.push(&tokens[begin..index]);
                }
            }
            _ => {}
        }
    }
    bodies
}

/// `name: 'value'` pairs of one object body. Segments of any other shape
/// (spreads, numbers, nested calls) are ignored.
fn object_pairs(body: &[Token]) -> Vec<(&str, &str)> {
    body.split(|token| *token == Token::Punct(','))
        .filter_map(|segment| match segment {
            [Token::Ident(name) | Token::Str(name), Token::Punct(':'), Token::Str(value)] => {
                Some((name.as_str(), value.as_str()))
            }
            _ => None,
        })
        .collect()
}

fn records_from_tokens(tokens: &[Token]) -> Vec<Record> {
    let mut records = Vec::new();
    for body in object_bodies(tokens) {
        match Record::from_literal_pairs(object_pairs(body)) {
            Some(record) => records.push(record),
            None => debug!("object without chassisNo skipped ({} tokens)", body.len()),
        }
    }
    records
}

/// Every object literal carrying a non-empty `chassisNo`, in file order.
pub fn parse_literal_records(text: &str) -> Vec<Record> {
    records_from_tokens(&tokenize(text))
}

/// A parsed data file: the declared array, whether it is exported on
/// `window`, and the records it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralDocument {
    pub array_name: Option<String>,
    pub exported: bool,
    pub records: Vec<Record>,
}

pub fn parse_literal_document(text: &str) -> LiteralDocument {
    let tokens = tokenize(text);
    let array_name = declared_array(&tokens);
    let exported = array_name
        .as_deref()
        .map(|name| is_exported(&tokens, name))
        .unwrap_or(false);
    LiteralDocument {
        array_name,
        exported,
        records: records_from_tokens(&tokens),
    }
}

/// Name from the first `const|let|var <name> = [`.
fn declared_array(tokens: &[Token]) -> Option<String> {
    tokens.windows(4).find_map(|window| match window {
        [Token::Ident(keyword), Token::Ident(name), Token::Punct('='), Token::Punct('[')]
            if matches!(keyword.as_str(), "const" | "let" | "var") =>
        {
            Some(name.clone())
        }
        _ => None,
    })
}

/// Looks for `window.<name> = <name>`.
fn is_exported(tokens: &[Token], name: &str) -> bool {
    tokens.windows(5).any(|window| match window {
        [Token::Ident(global), Token::Punct('.'), Token::Ident(property), Token::Punct('='), Token::Ident(value)] => {
            global == "window" && property == name && value == name
        }
        _ => false,
    })
}

/// Result of reading one embedded-literal source.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedExtract {
    pub records: Vec<Record>,
    /// Keys from parsed records plus every generated-template match.
    pub keys: RecordSet,
    /// Raw generated-template matches, repeats included.
    pub generated_matches: usize,
    pub array_name: Option<String>,
    pub exported: bool,
}

impl EmbeddedExtract {
    /// Distinct `chassisNo` values of the parsed objects, without template matches.
    pub fn record_keys(&self) -> RecordSet {
        self.records.iter().map(|r| r.chassis_no.as_str()).collect()
    }
}

pub fn extract_embedded(text: &str, template: &GeneratedIdTemplate) -> Result<EmbeddedExtract> {
    let document = parse_literal_document(text);
    let generated = template.find_all(text)?;

    let mut keys: RecordSet = document
        .records
        .iter()
        .map(|r| r.chassis_no.clone())
        .collect();
    let generated_matches = generated.len();
    keys.extend(generated);

    Ok(EmbeddedExtract {
        records: document.records,
        keys,
        generated_matches,
        array_name: document.array_name,
        exported: document.exported,
    })
}

pub fn load_embedded(
    path: impl AsRef<Path>,
    template: &GeneratedIdTemplate,
) -> Result<EmbeddedExtract> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LedgerError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| LedgerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let extract = extract_embedded(&text, template)?;
    info!(
        "read {} record(s) and {} generated id(s) from {}",
        extract.records.len(),
        extract.generated_matches,
        path.display()
    );
    Ok(extract)
}
