//! FreeCite response parser.
//!
//! Interprets the XML returned by the FreeCite citation parsing service. Each
//! `<citation>` element becomes one [`BibliographyRecord`].
//!
//! # Example
//!
//! ```
//! use freecite::{CitationParser, EntryType, Field, FreeCiteParser};
//!
//! let input = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <citations><citation valid="true">
//! <authors><author>Smith, J.</author></authors>
//! <tech>TR-2001-17</tech>
//! <title>Example Report</title>
//! <raw_string>J. Smith. Example Report. TR-2001-17.</raw_string>
//! </citation></citations>"#;
//!
//! let parser = FreeCiteParser::new();
//! let records = parser.parse(input).unwrap();
//! assert_eq!(records[0].entry_type(), EntryType::TechReport);
//! assert_eq!(records[0].get(&Field::Number), Some("TR-2001-17"));
//! ```

pub mod events;
pub mod interpret;
pub mod rules;
mod structure;

use std::io::BufRead;
use tracing::debug;

use crate::freecite::events::ResponseEvents;
use crate::freecite::interpret::Interpreter;
use crate::{BibliographyRecord, CitationParser, Result};

/// Line separator used between note lines unless configured otherwise.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Parser for FreeCite XML responses.
#[derive(Debug, Clone)]
pub struct FreeCiteParser {
    line_separator: String,
}

impl Default for FreeCiteParser {
    fn default() -> Self {
        Self {
            line_separator: LINE_SEPARATOR.to_string(),
        }
    }
}

impl FreeCiteParser {
    /// Creates a new FreeCite parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use freecite::FreeCiteParser;
    /// let parser = FreeCiteParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the separator written after each catch-all line in the `note` field.
    #[must_use]
    pub fn with_line_separator(mut self, separator: &str) -> Self {
        self.line_separator = separator.to_string();
        self
    }

    /// Interprets a response read from a stream.
    ///
    /// The whole response is walked once. Records are only returned when the
    /// entire stream was read without error.
    ///
    /// # Errors
    ///
    /// Returns `CitationError::InvalidFormat` for XML that is not well-formed or
    /// not shaped like a FreeCite response, and `CitationError::Io` when reading
    /// the stream fails.
    pub fn parse_reader<B: BufRead>(&self, input: B) -> Result<Vec<BibliographyRecord>> {
        let mut interpreter = Interpreter::new(&self.line_separator);
        let mut records = Vec::new();

        for event in ResponseEvents::new(input) {
            if let Some(record) = interpreter.feed(event?)? {
                records.push(record);
            }
        }
        interpreter.finish()?;

        debug!(records = records.len(), "FreeCite response interpreted");
        Ok(records)
    }
}

impl CitationParser for FreeCiteParser {
    /// Parses a FreeCite response held in memory.
    ///
    /// # Errors
    ///
    /// Returns `CitationError` if the response is malformed
    fn parse(&self, input: &str) -> Result<Vec<BibliographyRecord>> {
        self.parse_reader(input.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CitationError, EntryType, Field};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::{self, Read};

    fn parse(input: &str) -> Result<Vec<BibliographyRecord>> {
        FreeCiteParser::new().with_line_separator("\n").parse(input)
    }

    fn single(citation_body: &str) -> BibliographyRecord {
        let input = format!("<citations><citation>{}</citation></citations>", citation_body);
        let mut records = parse(&input).unwrap();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    #[test]
    fn test_parse_full_citation() {
        let input = r#"<?xml version="1.0" encoding="UTF-8"?>
        <citations>
          <citation valid="true">
            <authors>
              <author>Smith, J.</author>
              <author>Doe, A.</author>
            </authors>
            <title>A Study of Things</title>
            <journal>Journal of Testing</journal>
            <volume>12</volume>
            <pages>100-110</pages>
            <year>2009</year>
            <publisher>Test Press</publisher>
            <location>Providence, RI</location>
            <doi>10.1000/test</doi>
            <raw_string>Smith, J., Doe, A. A Study of Things. Journal of Testing 12 (2009).</raw_string>
          </citation>
        </citations>"#;

        let records = parse(input).unwrap();
        assert_eq!(records.len(), 1);
        let expected = BibliographyRecord::new(EntryType::Article)
            .with_field(Field::Author, "Smith, J. and Doe, A.")
            .with_field(Field::Title, "A Study of Things")
            .with_field(Field::Journal, "Journal of Testing")
            .with_field(Field::Volume, "12")
            .with_field(Field::Pages, "100-110")
            .with_field(Field::Year, "2009")
            .with_field(Field::Publisher, "Test Press")
            .with_field(Field::Location, "Providence, RI")
            .with_field(Field::Doi, "10.1000/test");
        assert_eq!(records[0], expected);
    }

    #[test]
    fn test_journal_makes_article() {
        let record = single("<journal>Nature</journal><title>T</title>");
        assert_eq!(record.entry_type(), EntryType::Article);
        assert_eq!(record.get(&Field::Journal), Some("Nature"));
    }

    #[test]
    fn test_tech_makes_tech_report() {
        let record = single("<tech>CS-TR-42</tech><institution>Brown University</institution>");
        assert_eq!(record.entry_type(), EntryType::TechReport);
        assert_eq!(record.get(&Field::Number), Some("CS-TR-42"));
        assert_eq!(record.get(&Field::Institution), Some("Brown University"));
    }

    #[test]
    fn test_default_type_is_inproceedings() {
        let record = single("<title>Some Talk</title><year>1999</year>");
        assert_eq!(record.entry_type(), EntryType::InProceedings);
    }

    #[rstest]
    #[case("<journal>J</journal><tech>TR</tech>", EntryType::TechReport)]
    #[case("<tech>TR</tech><journal>J</journal>", EntryType::Article)]
    fn test_later_type_signal_wins(#[case] body: &str, #[case] expected: EntryType) {
        assert_eq!(single(body).entry_type(), expected);
    }

    #[test]
    fn test_author_concatenation() {
        let record =
            single("<authors><author>Smith, J.</author><author>Doe, A.</author></authors>");
        assert_eq!(record.get(&Field::Author), Some("Smith, J. and Doe, A."));
    }

    #[test]
    fn test_single_author_has_no_separator() {
        let record = single("<authors><author>Smith, J.</author></authors>");
        assert_eq!(record.get(&Field::Author), Some("Smith, J."));
    }

    #[test]
    fn test_empty_authors() {
        let record = single("<authors></authors><title>T</title>");
        assert_eq!(record.get(&Field::Author), None);
        assert_eq!(record.get(&Field::Title), Some("T"));
    }

    #[rstest]
    #[case("In Proceedings of XYZ", "Proceedings of XYZ")]
    #[case("Journal of ABC", "Journal of ABC")]
    #[case("in lowercase", "in lowercase")]
    fn test_booktitle_normalization(#[case] booktitle: &str, #[case] expected: &str) {
        let record = single(&format!("<booktitle>{}</booktitle>", booktitle));
        assert_eq!(record.get(&Field::Booktitle), Some(expected));
    }

    #[test]
    fn test_unknown_element_goes_to_note() {
        let record = single("<foo>bar</foo>");
        assert_eq!(record.get(&Field::Note), Some("foo:bar\n"));
        assert_eq!(record.field("foo"), None);
    }

    #[test]
    fn test_unknown_element_appended_to_explicit_note() {
        let record = single("<note>orig</note><foo>bar</foo>");
        assert_eq!(record.get(&Field::Note), Some("orig\nfoo:bar\n"));
    }

    #[test]
    fn test_note_order_independent_of_position() {
        let record = single("<foo>bar</foo><editor>Jones</editor><note>orig</note>");
        assert_eq!(record.get(&Field::Note), Some("orig\nfoo:bar\neditor:Jones\n"));
    }

    #[test]
    fn test_default_line_separator() {
        let input = "<citations><citation><foo>bar</foo></citation></citations>";
        let records = FreeCiteParser::new().parse(input).unwrap();
        assert_eq!(
            records[0].get(&Field::Note),
            Some(format!("foo:bar{}", LINE_SEPARATOR).as_str())
        );
    }

    #[test]
    fn test_raw_string_is_never_stored() {
        let record = single("<raw_string>anything</raw_string><title>T</title>");
        assert!(record.fields().all(|(_, value)| !value.contains("anything")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_multiple_citations_in_document_order() {
        let input = r#"<citations>
            <citation><title>First</title></citation>
            <citation><title>Second</title><journal>J</journal></citation>
            <citation><title>Third</title></citation>
        </citations>"#;

        let records = parse(input).unwrap();
        let titles: Vec<_> = records.iter().filter_map(|r| r.get(&Field::Title)).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        assert_eq!(records[0].entry_type(), EntryType::InProceedings);
        assert_eq!(records[1].entry_type(), EntryType::Article);
        assert_eq!(records[2].entry_type(), EntryType::InProceedings);
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let record = single("<title>Cats &amp; Dogs</title>");
        assert_eq!(record.get(&Field::Title), Some("Cats & Dogs"));
    }

    #[test]
    fn test_split_text_keeps_inner_whitespace() {
        let record = single(
            "<title>Part one <!-- c --> two</title><booktitle>In <![CDATA[Proc]]> of X</booktitle>",
        );
        assert_eq!(record.get(&Field::Title), Some("Part one  two"));
        assert_eq!(record.get(&Field::Booktitle), Some("Proc of X"));
    }

    #[test]
    fn test_field_text_trimmed_once() {
        let record = single("<title>\n   Spaced  Out \n</title><year> 2001 </year>");
        assert_eq!(record.get(&Field::Title), Some("Spaced  Out"));
        assert_eq!(record.get(&Field::Year), Some("2001"));
    }

    #[test]
    fn test_layout_whitespace_between_authors() {
        let record = single("<authors>\n  <author> Smith, J. </author>\n  <author>Doe, A.</author>\n</authors>");
        assert_eq!(record.get(&Field::Author), Some("Smith, J. and Doe, A."));
    }

    #[test]
    fn test_text_between_authors_fails() {
        let input = "<citations><citation><authors>oops<author>A</author></authors></citation></citations>";
        assert!(matches!(parse(input), Err(CitationError::InvalidFormat(_))));
    }

    #[test]
    fn test_stray_text_under_citation_is_skipped() {
        let record = single("stray words<title>T</title> more");
        assert_eq!(record.get(&Field::Title), Some("T"));
        assert_eq!(record.get(&Field::Note), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_no_citations() {
        assert!(parse("<citations></citations>").unwrap().is_empty());
        assert!(parse("").unwrap().is_empty());
    }

    #[rstest]
    #[case("<citations><citation><title>Unterminated")]
    #[case("<citations><citation><title>x</title>")]
    #[case("<citations><citation><title>x</year></citation></citations>")]
    #[case("<citations><citation><title <year>")]
    #[case("<citations><citation><title>x<b>y</b></title></citation></citations>")]
    fn test_malformed_response_fails(#[case] input: &str) {
        assert!(matches!(parse(input), Err(CitationError::InvalidFormat(_))));
    }

    #[test]
    fn test_no_partial_results_on_late_failure() {
        let input = "<citations><citation><title>Good</title></citation><citation><title>Bad";
        assert!(parse(input).is_err());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
        }
    }

    #[test]
    fn test_io_failure_mid_stream() {
        let input = "<citations><citation><title>Good</title></citation>".as_bytes().chain(FailingReader);
        let result = FreeCiteParser::new().parse_reader(io::BufReader::new(input));
        assert!(matches!(result, Err(CitationError::Io(_))));
    }

    #[test]
    fn test_reparse_is_identical() {
        let input = "<citations><citation><authors><author>A</author></authors><x>1</x></citation></citations>";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }
}
