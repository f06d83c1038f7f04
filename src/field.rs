//! Bibliographic field names.
//!
//! A field is either one of the known bibliographic attributes or an unknown name
//! preserved verbatim.

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A bibliographic field.
///
/// Variant order is the order fields are listed in when a record is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Author,
    Journal,
    Title,
    Year,
    Volume,
    Pages,
    Publisher,
    Number,
    Institution,
    Location,
    Doi,
    Note,
    Booktitle,
    /// Any other field, kept by its literal name.
    Unknown(CompactString),
}

impl Field {
    /// Classifies a field name. Known names match ASCII case-insensitively,
    /// unknown names are kept as given.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "author" => Field::Author,
            "journal" => Field::Journal,
            "title" => Field::Title,
            "year" => Field::Year,
            "volume" => Field::Volume,
            "pages" => Field::Pages,
            "publisher" => Field::Publisher,
            "number" => Field::Number,
            "institution" => Field::Institution,
            "location" => Field::Location,
            "doi" => Field::Doi,
            "note" => Field::Note,
            "booktitle" => Field::Booktitle,
            _ => Field::Unknown(CompactString::from(name)),
        }
    }

    /// The canonical name of this field.
    pub fn as_name(&self) -> &str {
        match self {
            Field::Author => "author",
            Field::Journal => "journal",
            Field::Title => "title",
            Field::Year => "year",
            Field::Volume => "volume",
            Field::Pages => "pages",
            Field::Publisher => "publisher",
            Field::Number => "number",
            Field::Institution => "institution",
            Field::Location => "location",
            Field::Doi => "doi",
            Field::Note => "note",
            Field::Booktitle => "booktitle",
            Field::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Field::Unknown(_))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

// Fields serialize as their plain name so records can be written as string-keyed maps.
impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_name())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = CompactString::deserialize(deserializer)?;
        Ok(Field::from_name(&name))
    }
}
