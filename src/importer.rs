//! Free-text citation importer.
//!
//! Ties a [`Transport`] to the [`FreeCiteParser`]. This is the caller-facing
//! boundary: every outcome, including transport and parse failures, comes back
//! as an [`ImportResult`] value rather than an error.
//!
//! # Example
//!
//! ```
//! use std::io::{BufRead, Cursor};
//! use freecite::{CitationImporter, EntryType, Result, Transport};
//!
//! struct Canned;
//!
//! impl Transport for Canned {
//!     fn fetch(&self, _citation: &str) -> Result<Box<dyn BufRead>> {
//!         let xml = "<citations><citation><journal>J</journal></citation></citations>";
//!         Ok(Box::new(Cursor::new(xml)))
//!     }
//! }
//!
//! let result = CitationImporter::new(Canned).import_entries("J. Smith, J, 2001.");
//! assert!(!result.is_failed());
//! assert_eq!(result.records()[0].entry_type(), EntryType::Article);
//! ```

use std::io::{BufRead, Read};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "http")]
use crate::transport::HttpTransport;
use crate::transport::Transport;
use crate::{BibliographyRecord, CitationError, FreeCiteParser};

/// Why an import produced no records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportFailure {
    /// The citation service could not be reached or refused the request.
    #[error("Unable to connect to FreeCite online service.")]
    ServiceUnreachable(String),

    /// The service answered with something that could not be interpreted.
    #[error("Unable to parse the FreeCite online service response.")]
    MalformedResponse(String),

    /// The citation text itself could not be read, so nothing was sent.
    #[error("Unable to read the citation text.")]
    UnreadableInput(String),
}

impl ImportFailure {
    /// The underlying cause, for diagnostics.
    pub fn cause(&self) -> &str {
        match self {
            ImportFailure::ServiceUnreachable(cause)
            | ImportFailure::MalformedResponse(cause)
            | ImportFailure::UnreadableInput(cause) => cause,
        }
    }
}

/// Outcome of an import: the records found, or the reason there are none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    records: Vec<BibliographyRecord>,
    failure: Option<ImportFailure>,
}

impl ImportResult {
    pub fn from_records(records: Vec<BibliographyRecord>) -> Self {
        Self {
            records,
            failure: None,
        }
    }

    pub fn failed(failure: ImportFailure) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn records(&self) -> &[BibliographyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<BibliographyRecord> {
        self.records
    }

    pub fn failure(&self) -> Option<&ImportFailure> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// User-facing message describing the failure, if any.
    pub fn error_message(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }
}

/// Imports free-text citations by resolving them through a citation service.
#[derive(Debug, Clone)]
pub struct CitationImporter<T> {
    transport: T,
    parser: FreeCiteParser,
}

impl<T: Transport> CitationImporter<T> {
    /// Display name of this importer.
    pub const NAME: &'static str = "text citations";

    pub const DESCRIPTION: &'static str =
        "This importer parses text format citations using the online API of FreeCite.";

    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            parser: FreeCiteParser::new(),
        }
    }

    /// Uses `parser` to interpret the service responses.
    #[must_use]
    pub fn with_parser(mut self, parser: FreeCiteParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Free text has no recognizable signature, so no input is ever claimed.
    pub fn is_recognized_format<R: BufRead>(&self, _reader: R) -> bool {
        false
    }

    /// Reads all of `reader` as citation text and imports it.
    ///
    /// Input that cannot be read or is not UTF-8 yields
    /// [`ImportFailure::UnreadableInput`] without contacting the service.
    pub fn import_database<R: Read>(&self, mut reader: R) -> ImportResult {
        let mut text = String::new();
        if let Err(err) = reader.read_to_string(&mut text) {
            warn!(error = %err, "Could not read citation text");
            return ImportResult::failed(ImportFailure::UnreadableInput(err.to_string()));
        }
        self.import_entries(&text)
    }

    /// Sends `text` to the citation service and interprets its answer.
    ///
    /// Never fails: transport problems yield
    /// [`ImportFailure::ServiceUnreachable`], anything wrong with the response
    /// yields [`ImportFailure::MalformedResponse`].
    pub fn import_entries(&self, text: &str) -> ImportResult {
        let response = match self.transport.fetch(text) {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Unable to connect to FreeCite online service");
                return ImportResult::failed(ImportFailure::ServiceUnreachable(cause_of(err)));
            }
        };

        match self.parser.parse_reader(response) {
            Ok(records) => {
                debug!(records = records.len(), "imported citations");
                ImportResult::from_records(records)
            }
            Err(err) => {
                warn!(error = %err, "Could not parse FreeCite response");
                ImportResult::failed(ImportFailure::MalformedResponse(cause_of(err)))
            }
        }
    }
}

#[cfg(feature = "http")]
impl CitationImporter<HttpTransport> {
    /// Creates an importer talking to the public FreeCite endpoint.
    ///
    /// # Errors
    ///
    /// Returns `CitationError::Other` if the HTTP client cannot be built.
    pub fn with_default_service() -> crate::Result<Self> {
        Ok(Self::new(HttpTransport::new()?))
    }
}

fn cause_of(err: CitationError) -> String {
    match err {
        CitationError::ServiceUnreachable(cause)
        | CitationError::InvalidFormat(cause)
        | CitationError::Other(cause) => cause,
        CitationError::Io(io) => io.to_string(),
    }
}
