//! The state machine that turns response events into bibliography records.
//!
//! The walk is a single forward pass. Outside a citation every event is skipped
//! until a `<citation>` start. Inside, each child element is classified through
//! [`ElementRule::for_element`] and its text is folded into a [`RawCitation`].
//! `<authors>` opens a nested level whose `<author>` children are collected in
//! document order.

use compact_str::CompactString;
use std::mem;
use tracing::{debug, trace};

use crate::freecite::events::ResponseEvent;
use crate::freecite::rules::ElementRule;
use crate::freecite::structure::RawCitation;
use crate::{BibliographyRecord, CitationError, Result};

const CITATION: &str = "citation";
const AUTHOR: &str = "author";

#[derive(Debug)]
enum WalkState {
    ScanningForCitation,
    InsideCitation(CitationWalk),
}

/// Progress through a single `<citation>` element.
#[derive(Debug)]
struct CitationWalk {
    raw: RawCitation,
    position: Position,
}

#[derive(Debug)]
enum Position {
    /// Between the direct children of `<citation>`.
    Top,
    /// Inside a direct child, collecting its text.
    Field {
        rule: &'static ElementRule,
        name: CompactString,
        text: String,
    },
    /// Between the `<author>` children of `<authors>`.
    Authors,
    /// Inside one `<author>`.
    Author { text: String },
}

impl CitationWalk {
    fn new() -> Self {
        Self {
            raw: RawCitation::new(),
            position: Position::Top,
        }
    }

    /// Advances the walk by one event. Returns `true` once the citation is closed.
    fn feed(&mut self, event: ResponseEvent) -> Result<bool> {
        let position = mem::replace(&mut self.position, Position::Top);

        self.position = match (position, event) {
            (Position::Top, ResponseEvent::Start(name)) => {
                let rule = ElementRule::for_element(&name);
                trace!(element = %name, ?rule, "classified citation element");
                match rule {
                    ElementRule::Authors => Position::Authors,
                    _ => Position::Field {
                        rule,
                        name,
                        text: String::new(),
                    },
                }
            }
            (Position::Top, ResponseEvent::End(name)) if name.as_str() == CITATION => return Ok(true),
            (Position::Top, ResponseEvent::End(name)) => {
                return Err(CitationError::InvalidFormat(format!(
                    "Unexpected closing tag '{}' inside citation",
                    name
                )));
            }
            // layout whitespace and stray character data between fields
            (Position::Top, ResponseEvent::Text(_)) => Position::Top,

            (Position::Field { rule, name, mut text }, ResponseEvent::Text(chunk)) => {
                text.push_str(&chunk);
                Position::Field { rule, name, text }
            }
            (Position::Field { name, .. }, ResponseEvent::Start(child)) => {
                return Err(CitationError::InvalidFormat(format!(
                    "Element '{}' contains nested element '{}' where text was expected",
                    name, child
                )));
            }
            (Position::Field { rule, name, text }, ResponseEvent::End(_)) => {
                self.raw.apply(rule, &name, text.trim().to_string());
                Position::Top
            }

            (Position::Authors, ResponseEvent::Start(name)) if name.as_str() == AUTHOR => Position::Author {
                text: String::new(),
            },
            (Position::Authors, ResponseEvent::Start(name)) => {
                return Err(CitationError::InvalidFormat(format!(
                    "Expected 'author' inside 'authors', found '{}'",
                    name
                )));
            }
            (Position::Authors, ResponseEvent::Text(text)) if text.trim().is_empty() => {
                Position::Authors
            }
            (Position::Authors, ResponseEvent::Text(text)) => {
                return Err(CitationError::InvalidFormat(format!(
                    "Unexpected text '{}' between authors",
                    text
                )));
            }
            (Position::Authors, ResponseEvent::End(_)) => {
                self.raw.flush_authors();
                Position::Top
            }

            (Position::Author { mut text }, ResponseEvent::Text(chunk)) => {
                text.push_str(&chunk);
                Position::Author { text }
            }
            (Position::Author { .. }, ResponseEvent::Start(child)) => {
                return Err(CitationError::InvalidFormat(format!(
                    "Author contains nested element '{}'",
                    child
                )));
            }
            (Position::Author { text }, ResponseEvent::End(_)) => {
                self.raw.add_author(text.trim().to_string());
                Position::Authors
            }
        };

        Ok(false)
    }
}

/// Incremental interpreter for a FreeCite response.
///
/// Feed it the events of one response in order; every closed `<citation>` yields
/// a record. Call [`Interpreter::finish`] after the last event to detect a
/// response that stopped mid-citation.
#[derive(Debug)]
pub struct Interpreter {
    state: WalkState,
    line_separator: String,
    emitted: usize,
}

impl Interpreter {
    pub fn new(line_separator: &str) -> Self {
        Self {
            state: WalkState::ScanningForCitation,
            line_separator: line_separator.to_string(),
            emitted: 0,
        }
    }

    /// Consumes one event, returning a record when it closes a citation.
    pub fn feed(&mut self, event: ResponseEvent) -> Result<Option<BibliographyRecord>> {
        let closed = match &mut self.state {
            WalkState::ScanningForCitation => {
                if matches!(&event, ResponseEvent::Start(name) if name.as_str() == CITATION) {
                    debug!(index = self.emitted, "entering citation");
                    self.state = WalkState::InsideCitation(CitationWalk::new());
                }
                false
            }
            WalkState::InsideCitation(walk) => walk.feed(event)?,
        };

        if !closed {
            return Ok(None);
        }

        match mem::replace(&mut self.state, WalkState::ScanningForCitation) {
            WalkState::InsideCitation(walk) => {
                let record = walk.raw.into_record(&self.line_separator);
                debug!(
                    index = self.emitted,
                    entry_type = %record.entry_type(),
                    fields = record.len(),
                    "citation interpreted"
                );
                self.emitted += 1;
                Ok(Some(record))
            }
            WalkState::ScanningForCitation => Ok(None),
        }
    }

    /// Checks that the response did not end inside a citation.
    pub fn finish(self) -> Result<()> {
        match self.state {
            WalkState::ScanningForCitation => Ok(()),
            WalkState::InsideCitation(_) => Err(CitationError::InvalidFormat(
                "Response ended inside an unterminated citation".to_string(),
            )),
        }
    }
}
