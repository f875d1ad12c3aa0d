// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Depth-bounded JSON event parser.
//!
//! The parser streams a QDS document through `serde_json`'s deserializer
//! and forwards typed events to an [`EventHandler`] without building a
//! document tree. The accepted structure is bounded at depth 2: the
//! document is an array of measurement objects (or a single bare object),
//! and object values are scalars. Nested containers and `null` values are
//! rejected by the parser itself; scalar events at document level are
//! delivered and left to the handler to reject.

use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::Deserializer as _;

use qds_core::error::{ParsingError, ParsingResult};

// =============================================================================
// Parser Events
// =============================================================================

/// One typed event emitted while streaming a QDS document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParserEvent<'a> {
    /// A measurement object starts.
    ObjectBegin,

    /// The current measurement object ends.
    ObjectEnd,

    /// An object key.
    Key(&'a str),

    /// A string scalar.
    String(&'a str),

    /// A signed integer scalar.
    Int64(i64),

    /// An unsigned integer scalar.
    Uint64(u64),

    /// A floating point scalar.
    Double(f64),

    /// A boolean scalar.
    Bool(bool),
}

impl ParserEvent<'_> {
    /// Returns the JSON type name of this event for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParserEvent::ObjectBegin | ParserEvent::ObjectEnd => "object",
            ParserEvent::Key(_) => "key",
            ParserEvent::String(_) => "string",
            ParserEvent::Int64(_) => "int64",
            ParserEvent::Uint64(_) => "uint64",
            ParserEvent::Double(_) => "double",
            ParserEvent::Bool(_) => "bool",
        }
    }

    /// Renders the carried value as text for diagnostics.
    pub fn value_text(&self) -> String {
        match self {
            ParserEvent::ObjectBegin | ParserEvent::ObjectEnd => String::new(),
            ParserEvent::Key(v) | ParserEvent::String(v) => (*v).to_string(),
            ParserEvent::Int64(v) => v.to_string(),
            ParserEvent::Uint64(v) => v.to_string(),
            ParserEvent::Double(v) => v.to_string(),
            ParserEvent::Bool(v) => v.to_string(),
        }
    }
}

/// Receiver for [`ParserEvent`]s.
///
/// A handler error aborts the parse and is returned verbatim from
/// [`JsonParser::parse`].
pub trait EventHandler {
    /// Consumes the next event of the document.
    fn on_event(&mut self, event: ParserEvent<'_>) -> ParsingResult<()>;
}

// =============================================================================
// Json Parser
// =============================================================================

/// Streams a JSON document as [`ParserEvent`]s.
pub struct JsonParser;

impl JsonParser {
    /// Parses `json` and forwards its events to `handler`.
    ///
    /// Fails with [`ParsingError::Syntax`] on malformed JSON, with
    /// [`ParsingError::ExtraData`] when non-whitespace input follows the
    /// document, and with whatever error the handler raised.
    pub fn parse<H: EventHandler>(json: &str, handler: &mut H) -> ParsingResult<()> {
        let mut sink = EventSink {
            handler,
            failure: None,
        };

        let mut deserializer = serde_json::Deserializer::from_str(json);
        if let Err(error) = deserializer.deserialize_any(DocumentVisitor { sink: &mut sink }) {
            return Err(match sink.failure.take() {
                Some(failure) => failure,
                None => ParsingError::syntax(error),
            });
        }

        deserializer.end().map_err(|_| ParsingError::ExtraData)
    }
}

// =============================================================================
// Event Sink
// =============================================================================

/// Bridges handler errors out of the serde visitor callbacks.
///
/// serde carries errors as its own type; the typed [`ParsingError`] is
/// parked here and recovered by [`JsonParser::parse`] after the
/// deserializer unwinds.
struct EventSink<'h, H: EventHandler> {
    handler: &'h mut H,
    failure: Option<ParsingError>,
}

impl<H: EventHandler> EventSink<'_, H> {
    fn emit<E: de::Error>(&mut self, event: ParserEvent<'_>) -> Result<(), E> {
        match self.handler.on_event(event) {
            Ok(()) => Ok(()),
            Err(failure) => {
                let message = failure.to_string();
                self.failure = Some(failure);
                Err(E::custom(message))
            }
        }
    }

    fn drain_object<'de, A: MapAccess<'de>>(&mut self, mut map: A) -> Result<(), A::Error> {
        self.emit(ParserEvent::ObjectBegin)?;
        while map.next_key_seed(KeySeed { sink: &mut *self })?.is_some() {
            map.next_value_seed(ScalarSeed { sink: &mut *self })?;
        }
        self.emit(ParserEvent::ObjectEnd)
    }
}

// =============================================================================
// Visitor Seeds
// =============================================================================

/// Document level: an array of objects, a bare object, or a scalar that
/// the handler will reject.
struct DocumentVisitor<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> Visitor<'de> for DocumentVisitor<'_, '_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a QDS measurement set (array of objects)")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let sink = self.sink;
        while seq
            .next_element_seed(ElementSeed { sink: &mut *sink })?
            .is_some()
        {}
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<(), A::Error> {
        self.sink.drain_object(map)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.sink.emit(ParserEvent::String(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Int64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Uint64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Double(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.sink.emit(ParserEvent::Bool(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Err(E::custom("null values are not allowed"))
    }
}

/// One element of the document array.
struct ElementSeed<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> DeserializeSeed<'de> for ElementSeed<'_, '_, H> {
    type Value = ();

    fn deserialize<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(ElementVisitor { sink: self.sink })
    }
}

struct ElementVisitor<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> Visitor<'de> for ElementVisitor<'_, '_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a measurement object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<(), A::Error> {
        self.sink.drain_object(map)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<(), A::Error> {
        Err(de::Error::custom("maximum JSON depth exceeded"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.sink.emit(ParserEvent::String(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Int64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Uint64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Double(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.sink.emit(ParserEvent::Bool(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Err(E::custom("null values are not allowed"))
    }
}

/// An object key, forwarded as [`ParserEvent::Key`].
struct KeySeed<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> DeserializeSeed<'de> for KeySeed<'_, '_, H> {
    type Value = ();

    fn deserialize<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_str(KeyVisitor { sink: self.sink })
    }
}

struct KeyVisitor<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> Visitor<'de> for KeyVisitor<'_, '_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object key")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.sink.emit(ParserEvent::Key(v))
    }
}

/// An object value, which must be a scalar.
struct ScalarSeed<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> DeserializeSeed<'de> for ScalarSeed<'_, '_, H> {
    type Value = ();

    fn deserialize<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(ScalarVisitor { sink: self.sink })
    }
}

struct ScalarVisitor<'a, 'h, H: EventHandler> {
    sink: &'a mut EventSink<'h, H>,
}

impl<'de, H: EventHandler> Visitor<'de> for ScalarVisitor<'_, '_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.sink.emit(ParserEvent::String(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Int64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Uint64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.sink.emit(ParserEvent::Double(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.sink.emit(ParserEvent::Bool(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, _map: A) -> Result<(), A::Error> {
        Err(de::Error::custom("maximum JSON depth exceeded"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _seq: A) -> Result<(), A::Error> {
        Err(de::Error::custom("maximum JSON depth exceeded"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Err(E::custom("null values are not allowed"))
    }
}

// =============================================================================
// Tests
// =============================================================================
