//! The two chassis-number sources: the tabular inventory and the generated literal file.

pub mod literal;
pub mod tabular;

use std::fmt;
use std::path::Path;

pub use literal::{
    extract_embedded, load_embedded, parse_literal_document, parse_literal_records,
    EmbeddedExtract, GeneratedIdTemplate, LiteralDocument,
};
pub use tabular::{load_tabular, read_tabular, TabularExtract};

use crate::error::Result;
use crate::record::RecordSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Tabular,
    EmbeddedLiteral,
}

/// Parsers are picked by the source's role, not by file extension.
impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::EmbeddedLiteral => "embedded literal",
        }
    }

    pub fn load_keys(&self, path: &Path, template: &GeneratedIdTemplate) -> Result<RecordSet> {
        match self {
            Self::Tabular => Ok(load_tabular(path)?.keys),
            Self::EmbeddedLiteral => Ok(load_embedded(path, template)?.keys),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
