//! Dispatch table for elements found inside a `<citation>`.
//!
//! Maps an element's local name to the way its content is folded into a record.
//! Names are matched ASCII case-insensitively. Anything absent from the table
//! falls through to [`ElementRule::Note`].

use crate::{EntryType, Field};

/// How the content of one citation child element is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRule {
    /// Container of `<author>` elements, joined into the `author` field.
    Authors,
    /// Text stored verbatim under the field.
    Store(Field),
    /// Text stored under `field`; the element's presence decides the entry type.
    SignalType { entry_type: EntryType, field: Field },
    /// Text stored under `field` with a leading `prefix` removed when present.
    StripPrefix { field: Field, prefix: &'static str },
    /// Consumed and dropped.
    Ignore,
    /// Appended to the note as a `name:value` line.
    Note,
}

static RULES: [(&str, ElementRule); 15] = [
    ("authors", ElementRule::Authors),
    (
        "journal",
        ElementRule::SignalType {
            entry_type: EntryType::Article,
            field: Field::Journal,
        },
    ),
    // FreeCite reports the technical report number under <tech>
    (
        "tech",
        ElementRule::SignalType {
            entry_type: EntryType::TechReport,
            field: Field::Number,
        },
    ),
    ("doi", ElementRule::Store(Field::Doi)),
    ("institution", ElementRule::Store(Field::Institution)),
    ("location", ElementRule::Store(Field::Location)),
    ("number", ElementRule::Store(Field::Number)),
    ("note", ElementRule::Store(Field::Note)),
    ("title", ElementRule::Store(Field::Title)),
    ("pages", ElementRule::Store(Field::Pages)),
    ("publisher", ElementRule::Store(Field::Publisher)),
    ("volume", ElementRule::Store(Field::Volume)),
    ("year", ElementRule::Store(Field::Year)),
    (
        "booktitle",
        ElementRule::StripPrefix {
            field: Field::Booktitle,
            prefix: "In ",
        },
    ),
    ("raw_string", ElementRule::Ignore),
];

static CATCH_ALL: ElementRule = ElementRule::Note;

impl ElementRule {
    /// Looks up the rule for an element name.
    pub fn for_element(name: &str) -> &'static ElementRule {
        RULES
            .iter()
            .find(|(element, _)| element.eq_ignore_ascii_case(name))
            .map(|(_, rule)| rule)
            .unwrap_or(&CATCH_ALL)
    }
}

/// Removes `prefix` from the start of `text` if it is there.
pub(crate) fn strip_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.strip_prefix(prefix).unwrap_or(text)
}
