//! Structured events read from a FreeCite response.
//!
//! Wraps the quick-xml pull reader and turns its borrowed events into owned
//! start/end/text events keyed by local element name. Text is passed on
//! untrimmed since a comment or CDATA section may split one element's text.

use compact_str::CompactString;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::io::BufRead;

use crate::{CitationError, Result};

/// A single structural event of a response document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEvent {
    /// An element was opened. Self-closing elements produce a start and an end.
    Start(CompactString),
    /// An element was closed.
    End(CompactString),
    /// Unescaped character data, exactly as it appears between markup.
    Text(String),
}

/// Pull iterator over the events of a response stream.
///
/// Yields an error and stops when the underlying XML is not well-formed, when
/// reading fails, or when the stream ends while elements are still open.
pub struct ResponseEvents<B: BufRead> {
    reader: Reader<B>,
    buf: Vec<u8>,
    pending: Option<ResponseEvent>,
    depth: usize,
    finished: bool,
}

impl<B: BufRead> ResponseEvents<B> {
    pub fn new(input: B) -> Self {
        let reader = Reader::from_reader(input);
        Self {
            reader,
            buf: Vec::new(),
            pending: None,
            depth: 0,
            finished: false,
        }
    }

    fn next_event(&mut self) -> Result<Option<ResponseEvent>> {
        if let Some(event) = self.pending.take() {
            return Ok(Some(event));
        }

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    self.depth += 1;
                    return Ok(Some(ResponseEvent::Start(local_name(e.local_name().as_ref())?)));
                }
                Event::End(e) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Some(ResponseEvent::End(local_name(e.local_name().as_ref())?)));
                }
                Event::Empty(e) => {
                    let name = local_name(e.local_name().as_ref())?;
                    self.pending = Some(ResponseEvent::End(name.clone()));
                    return Ok(Some(ResponseEvent::Start(name)));
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| {
                        CitationError::InvalidFormat(format!("Invalid XML text content: {}", e))
                    })?;
                    if !text.is_empty() {
                        return Ok(Some(ResponseEvent::Text(text.into_owned())));
                    }
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e).map_err(|e| {
                        CitationError::InvalidFormat(format!("Invalid CDATA content: {}", e))
                    })?;
                    if !text.is_empty() {
                        return Ok(Some(ResponseEvent::Text(text.to_string())));
                    }
                }
                Event::Eof if self.depth > 0 => {
                    return Err(CitationError::InvalidFormat(format!(
                        "Unexpected end of response with {} unclosed element(s)",
                        self.depth
                    )));
                }
                Event::Eof => return Ok(None),
                _ => continue,
            }
        }
    }
}

impl<B: BufRead> Iterator for ResponseEvents<B> {
    type Item = Result<ResponseEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn local_name(name: &[u8]) -> Result<CompactString> {
    std::str::from_utf8(name)
        .map(CompactString::from)
        .map_err(|e| CitationError::InvalidFormat(format!("Invalid element name: {}", e)))
}
