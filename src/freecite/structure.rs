//! Intermediate data collected while walking one `<citation>` element.
//!
//! Authors and catch-all note lines are accumulated here and only folded into
//! the record when the citation closes.

use itertools::Itertools;

use crate::freecite::rules::{ElementRule, strip_prefix};
use crate::{BibliographyRecord, EntryType, Field};

/// Separator placed between concatenated authors.
const AUTHOR_SEPARATOR: &str = " and ";

#[derive(Debug, Clone, Default)]
pub(crate) struct RawCitation {
    record: BibliographyRecord,
    entry_type: EntryType,
    authors: Vec<String>,
    notes: Vec<String>,
}

impl RawCitation {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Folds the text of a closed element into the citation according to `rule`.
    pub(crate) fn apply(&mut self, rule: &ElementRule, name: &str, text: String) {
        match rule {
            ElementRule::Store(field) => self.record.set_field(field.clone(), text),
            ElementRule::SignalType { entry_type, field } => {
                self.entry_type = *entry_type;
                self.record.set_field(field.clone(), text);
            }
            ElementRule::StripPrefix { field, prefix } => {
                let value = strip_prefix(&text, prefix).to_string();
                self.record.set_field(field.clone(), value);
            }
            ElementRule::Note => self.notes.push(format!("{}:{}", name, text)),
            ElementRule::Ignore | ElementRule::Authors => {}
        }
    }

    pub(crate) fn add_author(&mut self, author: String) {
        self.authors.push(author);
    }

    /// Writes the authors collected so far into the `author` field.
    pub(crate) fn flush_authors(&mut self) {
        let joined = self.authors.iter().join(AUTHOR_SEPARATOR);
        self.record.set_field(Field::Author, joined);
    }

    /// Finishes the citation: merges pending note lines and assigns the entry type.
    pub(crate) fn into_record(mut self, line_separator: &str) -> BibliographyRecord {
        if !self.notes.is_empty() {
            let pending: String = self
                .notes
                .iter()
                .map(|line| format!("{}{}", line, line_separator))
                .collect();
            let note = match self.record.get(&Field::Note) {
                Some(existing) => format!("{}{}{}", existing, line_separator, pending),
                None => pending,
            };
            self.record.set_field(Field::Note, note);
        }

        self.record.set_entry_type(self.entry_type);
        self.record
    }
}
