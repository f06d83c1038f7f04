//! Resolve free-text bibliographic citations into structured bibliography records.
//!
//! `freecite` sends raw citation text to the FreeCite citation parsing service and
//! interprets the XML it answers with. No citation grammar is parsed locally: the
//! crate only reads the service's structured output.
//!
//! # Key Features
//!
//! - **Streaming interpretation**: the response is consumed as a single forward pass
//!   over XML events, one record per `<citation>` element.
//! - **Entry type inference**: journals make an article, technical report numbers make
//!   a tech report, everything else defaults to in-proceedings.
//! - **Lossless catch-all**: elements without a known bibliographic meaning are kept
//!   as `name:value` lines in the `note` field.
//! - **Pluggable transport**: anything implementing [`Transport`] can feed the
//!   interpreter. A blocking HTTP transport ships behind the `http` feature.
//!
//! # Basic Usage
//!
//! ```rust
//! use freecite::{CitationParser, EntryType, Field, FreeCiteParser};
//!
//! let response = r#"<citations><citation>
//! <authors><author>Smith, J.</author><author>Doe, A.</author></authors>
//! <journal>Journal of Testing</journal>
//! <title>An Example</title>
//! <year>2009</year>
//! </citation></citations>"#;
//!
//! let records = FreeCiteParser::new().parse(response).unwrap();
//! assert_eq!(records[0].entry_type(), EntryType::Article);
//! assert_eq!(records[0].get(&Field::Author), Some("Smith, J. and Doe, A."));
//! ```
//!
//! # Importing Through The Service
//!
//! ```no_run
//! # #[cfg(feature = "http")] {
//! use freecite::CitationImporter;
//!
//! let importer = CitationImporter::with_default_service().unwrap();
//! let result = importer.import_entries("J. Smith. An Example. Journal of Testing, 2009.");
//! match result.error_message() {
//!     Some(message) => eprintln!("{message}"),
//!     None => {
//!         for record in result.records() {
//!             println!("{}", record.to_bibtex());
//!         }
//!     }
//! }
//! # }
//! ```
//!
//! # Error Handling
//!
//! Parsers return the crate [`Result`] type wrapping [`CitationError`]. The
//! [`CitationImporter`] boundary never returns an error: every failure becomes an
//! [`ImportResult`] carrying an [`ImportFailure`] kind.
//!
//! ```rust
//! use freecite::{CitationError, CitationParser, FreeCiteParser};
//!
//! let result = FreeCiteParser::new().parse("<citations><citation><title>Unterminated");
//! match result {
//!     Ok(records) => println!("Parsed {} records", records.len()),
//!     Err(CitationError::InvalidFormat(msg)) => eprintln!("Parse error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```
//!
//! # Thread Safety
//!
//! Parsers hold no mutable state and can be shared between threads. Each call to
//! `parse` builds its own interpreter.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub mod field;
pub mod freecite;
pub mod importer;
pub mod transport;

// Reexports
pub use field::Field;
pub use freecite::FreeCiteParser;
pub use importer::{CitationImporter, ImportFailure, ImportResult};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{ServiceConfig, Transport};

/// A specialized Result type for citation operations.
pub type Result<T> = std::result::Result<T, CitationError>;

/// Represents errors that can occur while resolving citations.
#[derive(Error, Debug)]
pub enum CitationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("Error: {0}")]
    Other(String),
}

impl From<quick_xml::Error> for CitationError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => {
                CitationError::Io(std::io::Error::new(io.kind(), io.to_string()))
            }
            other => CitationError::InvalidFormat(other.to_string()),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for CitationError {
    fn from(err: reqwest::Error) -> Self {
        CitationError::ServiceUnreachable(err.to_string())
    }
}

/// The kind of bibliographic work a record describes.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Article,
    #[default]
    InProceedings,
    TechReport,
    Book,
    InCollection,
    Misc,
}

impl EntryType {
    /// The BibTeX name of this entry type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Article => "article",
            EntryType::InProceedings => "inproceedings",
            EntryType::TechReport => "techreport",
            EntryType::Book => "book",
            EntryType::InCollection => "incollection",
            EntryType::Misc => "misc",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured bibliography record: an entry type plus a map of fields.
///
/// Records carry no identifier. Every field holds a single non-empty string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographyRecord {
    entry_type: EntryType,
    fields: BTreeMap<Field, String>,
}

impl BibliographyRecord {
    /// Creates an empty record of the given type.
    #[must_use]
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the record with `field` set to `value`.
    #[must_use]
    pub fn with_field(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set_field(field, value.into());
        self
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Returns the value stored for `field`, if any.
    pub fn get(&self, field: &Field) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Looks a field up by its name, e.g. `"journal"` or an unknown `"editor"`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.get(&Field::from_name(name))
    }

    pub fn has_field(&self, field: &Field) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over the fields in a stable order.
    pub fn fields(&self) -> impl Iterator<Item = (&Field, &str)> {
        self.fields.iter().map(|(field, value)| (field, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the record as a BibTeX entry with an empty citation key.
    ///
    /// # Examples
    ///
    /// ```
    /// use freecite::{BibliographyRecord, EntryType, Field};
    ///
    /// let record = BibliographyRecord::new(EntryType::Article)
    ///     .with_field(Field::Title, "An Example");
    /// assert_eq!(record.to_bibtex(), "@article{,\n  title = {An Example}\n}\n");
    /// ```
    pub fn to_bibtex(&self) -> String {
        let body = self
            .fields
            .iter()
            .map(|(field, value)| format!("  {} = {{{}}}", field, value))
            .join(",\n");
        if body.is_empty() {
            format!("@{}{{,\n}}\n", self.entry_type)
        } else {
            format!("@{}{{,\n{}\n}}\n", self.entry_type, body)
        }
    }

    /// Stores `value` under `field`, replacing any previous value.
    /// An empty value clears the field.
    pub(crate) fn set_field(&mut self, field: Field, value: String) {
        if value.is_empty() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, value);
        }
    }

    pub(crate) fn set_entry_type(&mut self, entry_type: EntryType) {
        self.entry_type = entry_type;
    }
}

/// Trait for implementing citation response parsers.
pub trait CitationParser {
    /// Parse a string containing a service response with one or more citations.
    ///
    /// # Arguments
    ///
    /// * `input` - The response document
    ///
    /// # Errors
    ///
    /// Returns `CitationError` if the input is malformed
    fn parse(&self, input: &str) -> Result<Vec<BibliographyRecord>>;
}
