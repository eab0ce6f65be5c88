//! Build event stream decoding.
//!
//! The server publishes build events as server-sent events:
//!
//! ```text
//! id: 0
//! event: event
//! data: {"data":{"origin":{"id":"5f"},"time":1700000000},"event":"start-task","version":"5.1"}
//!
//! event: end
//! data:
//! ```
//!
//! Each `event` block carries one [`EventRecord`]; the `end` block marks the
//! end of the build's log. Running out of input without an `end` block is
//! treated the same way.

use crate::{
    error::{CollectorError, Result},
    models::EventRecord,
};

/// Incremental server-sent-event parser.
///
/// Input may be fed in arbitrary chunks; only complete lines are interpreted.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    events: Vec<EventRecord>,
    ended: bool,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next chunk of the stream.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if self.ended {
            return Ok(());
        }

        self.buffer.extend_from_slice(bytes);
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.process_line(&line)?;
            if self.ended {
                self.buffer.clear();
                break;
            }
        }
        Ok(())
    }

    /// Whether the `end` block has been seen.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Flushes any trailing partial block and returns the decoded events.
    pub fn finish(mut self) -> Result<Vec<EventRecord>> {
        if !self.ended {
            let rest = std::mem::take(&mut self.buffer);
            if !rest.is_empty() {
                self.process_line(&rest)?;
            }
            self.dispatch()?;
        }
        Ok(self.events)
    }

    fn process_line(&mut self, raw: &[u8]) -> Result<()> {
        let line = std::str::from_utf8(raw).map_err(|e| CollectorError::EventStream {
            message: format!("invalid UTF-8: {e}"),
        })?;
        let line = line.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return Ok(());
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the collector needs
            _ => {}
        }
        Ok(())
    }

    fn dispatch(&mut self) -> Result<()> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);

        match event.as_deref() {
            Some("end") => self.ended = true,
            Some("event") | None if !data.is_empty() => {
                let payload = data.join("\n");
                let record: EventRecord =
                    serde_json::from_str(&payload).map_err(|e| CollectorError::EventStream {
                        message: format!("undecodable event record: {e}"),
                    })?;
                self.events.push(record);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Parses a complete server-sent-event transcript.
pub fn parse_event_stream(text: &str) -> Result<Vec<EventRecord>> {
    let mut parser = EventStreamParser::new();
    parser.feed(text.as_bytes())?;
    parser.finish()
}

/// Decodes a saved event log: either a JSON array of event records or a
/// server-sent-event transcript.
pub fn decode_events(text: &str) -> Result<Vec<EventRecord>> {
    if text.trim_start().starts_with('[') {
        Ok(serde_json::from_str(text)?)
    } else {
        parse_event_stream(text)
    }
}
