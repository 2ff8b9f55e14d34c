//! Forward-only token cursor over a JSON byte stream.
//!
//! [`TokenCursor`] wraps a struson pull reader and adds the one thing the
//! reader does not offer: a single `peek()` that reports *any* structural
//! token, including field names and container ends. It keeps a small frame
//! stack so that every consuming call can be checked against the next token
//! first; a call that does not match the input becomes an [`Error`] instead
//! of a reader panic.

use std::fmt;
use std::io::Read;

use serde::de::DeserializeOwned;
use struson::reader::{JsonReader, JsonStreamReader, ReaderError, ReaderSettings, ValueType};
use struson::serde::DeserializerError;

use crate::error::{Error, Result};

/// Map a reader failure to an I/O error or a malformed-input error.
fn reader_error(err: ReaderError) -> Error {
    match err {
        ReaderError::IoError { error, .. } => Error::Io(error),
        other => Error::malformed(other),
    }
}

fn deserializer_error(err: DeserializerError) -> Error {
    match err {
        DeserializerError::ReaderError(e) => reader_error(e),
        other => Error::malformed(other),
    }
}

/// Kind of a scalar JSON value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
}

/// The next structural token of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// An object member name.
    Name,
    /// A scalar value.
    Scalar(ScalarKind),
    /// The root value has been fully consumed.
    EndOfInput,
}

impl Token {
    fn is_value(self) -> bool {
        matches!(self, Token::BeginObject | Token::BeginArray | Token::Scalar(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::BeginObject => "begin of object",
            Token::EndObject => "end of object",
            Token::BeginArray => "begin of array",
            Token::EndArray => "end of array",
            Token::Name => "member name",
            Token::Scalar(ScalarKind::String) => "string",
            Token::Scalar(ScalarKind::Number) => "number",
            Token::Scalar(ScalarKind::Boolean) => "boolean",
            Token::Scalar(ScalarKind::Null) => "null",
            Token::EndOfInput => "end of input",
        };
        write!(f, "{}", s)
    }
}

/// Open container the cursor is currently inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    /// Inside an object; `value_pending` is set between a name and its value.
    Object { value_pending: bool },
    Array,
}

/// Forward-only cursor over a single JSON document.
pub struct TokenCursor<R: Read> {
    reader: JsonStreamReader<R>,
    frames: Vec<Frame>,
    root_consumed: bool,
}

impl<R: Read> TokenCursor<R> {
    /// Create a cursor positioned before the root value of `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader: JsonStreamReader::new_custom(
                reader,
                ReaderSettings {
                    // Out-of-range numbers are degraded by the decoder, and
                    // ignored members may nest arbitrarily deep.
                    restrict_number_values: false,
                    max_nesting_depth: None,
                    ..Default::default()
                },
            ),
            frames: Vec::new(),
            root_consumed: false,
        }
    }

    /// Number of currently open objects and arrays.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Report the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token> {
        match self.frames.last().copied() {
            None if self.root_consumed => Ok(Token::EndOfInput),
            None | Some(Frame::Object { value_pending: true }) => self.peek_value(),
            Some(Frame::Object {
                value_pending: false,
            }) => {
                if self.reader.has_next().map_err(reader_error)? {
                    Ok(Token::Name)
                } else {
                    Ok(Token::EndObject)
                }
            }
            Some(Frame::Array) => {
                if self.reader.has_next().map_err(reader_error)? {
                    self.peek_value()
                } else {
                    Ok(Token::EndArray)
                }
            }
        }
    }

    fn peek_value(&mut self) -> Result<Token> {
        let token = match self.reader.peek().map_err(reader_error)? {
            ValueType::Object => Token::BeginObject,
            ValueType::Array => Token::BeginArray,
            ValueType::String => Token::Scalar(ScalarKind::String),
            ValueType::Number => Token::Scalar(ScalarKind::Number),
            ValueType::Boolean => Token::Scalar(ScalarKind::Boolean),
            ValueType::Null => Token::Scalar(ScalarKind::Null),
        };
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let found = self.peek()?;
        if found != expected {
            return Err(Error::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    fn expect_value(&mut self) -> Result<Token> {
        let found = self.peek()?;
        if !found.is_value() {
            return Err(Error::UnexpectedToken {
                expected: "value".to_string(),
                found: found.to_string(),
            });
        }
        Ok(found)
    }

    /// Record that the value at the current position is being consumed.
    fn value_consumed(&mut self) {
        match self.frames.last_mut() {
            Some(Frame::Object { value_pending }) => *value_pending = false,
            Some(Frame::Array) => {}
            None => self.root_consumed = true,
        }
    }

    /// Consume `{`.
    pub fn begin_object(&mut self) -> Result<()> {
        self.expect(Token::BeginObject)?;
        self.reader.begin_object().map_err(reader_error)?;
        self.value_consumed();
        self.frames.push(Frame::Object {
            value_pending: false,
        });
        Ok(())
    }

    /// Consume `}`.
    pub fn end_object(&mut self) -> Result<()> {
        self.expect(Token::EndObject)?;
        self.reader.end_object().map_err(reader_error)?;
        self.frames.pop();
        Ok(())
    }

    /// Consume `[`.
    pub fn begin_array(&mut self) -> Result<()> {
        self.expect(Token::BeginArray)?;
        self.reader.begin_array().map_err(reader_error)?;
        self.value_consumed();
        self.frames.push(Frame::Array);
        Ok(())
    }

    /// Consume `]`.
    pub fn end_array(&mut self) -> Result<()> {
        self.expect(Token::EndArray)?;
        self.reader.end_array().map_err(reader_error)?;
        self.frames.pop();
        Ok(())
    }

    /// Consume a member name.
    pub fn next_name(&mut self) -> Result<String> {
        self.expect(Token::Name)?;
        let name = self.reader.next_name_owned().map_err(reader_error)?;
        if let Some(Frame::Object { value_pending }) = self.frames.last_mut() {
            *value_pending = true;
        }
        Ok(name)
    }

    /// Consume and discard the next value, however deeply nested.
    pub fn skip_value(&mut self) -> Result<()> {
        self.expect_value()?;
        self.reader.skip_value().map_err(reader_error)?;
        self.value_consumed();
        Ok(())
    }

    /// Consume a string value.
    pub fn next_str(&mut self) -> Result<&str> {
        self.expect(Token::Scalar(ScalarKind::String))?;
        self.value_consumed();
        self.reader.next_str().map_err(reader_error)
    }

    /// Consume a number value, returning its source text.
    pub fn next_number(&mut self) -> Result<&str> {
        self.expect(Token::Scalar(ScalarKind::Number))?;
        self.value_consumed();
        self.reader.next_number_as_str().map_err(reader_error)
    }

    /// Decode the next value with serde.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.expect_value()?;
        self.value_consumed();
        self.reader.deserialize_next().map_err(deserializer_error)
    }

    /// Verify that nothing but whitespace follows the root value.
    pub fn finish(self) -> Result<()> {
        if !self.root_consumed || !self.frames.is_empty() {
            return Err(Error::malformed(
                "document ended before the root value was closed",
            ));
        }
        self.reader
            .consume_trailing_whitespace()
            .map_err(reader_error)
    }
}
