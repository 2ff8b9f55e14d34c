//! Streaming parser for KairosDB query responses.
//!
//! The parser walks the outer shape of a response,
//! `{"queries": [{"results": [ ... ]}]}`, and yields each entry of every
//! `results` array as a decoded [`QueryResult`], one at a time, without
//! materializing the rest of the document.

use std::io::Read;

use tracing::trace;

use crate::cursor::{Token, TokenCursor};
use crate::decoder::decode_query_result;
use crate::error::{Error, Result};
use crate::types::QueryResult;

/// Internal state of the response walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParsingState {
    /// Outside the `queries` array.
    Outer,
    /// Inside the `queries` array; `depth` is the cursor depth of the array.
    InQueriesArray { depth: usize },
    /// Inside a `results` array of the query set at `queries_depth`.
    InResultsArray { queries_depth: usize },
    /// The root value has been consumed.
    Done,
}

/// Streaming parser over a KairosDB query response.
///
/// # Example
///
/// ```
/// use kairos_csv::QueryResponseParser;
///
/// let json = r#"{"queries": [{"results": [{"name": "cpu", "values": [[1000, 1]]}]}]}"#;
/// let mut parser = QueryResponseParser::new(json.as_bytes());
/// while let Some(result) = parser.next().unwrap() {
///     assert_eq!(result.name, "cpu");
/// }
/// parser.finish().unwrap();
/// ```
pub struct QueryResponseParser<R: Read> {
    cursor: TokenCursor<R>,
    parsing_state: ParsingState,
    results_parsed: u64,
}

impl<R: Read> QueryResponseParser<R> {
    /// Create a new parser from a reader.
    pub fn new(reader: R) -> Self {
        Self {
            cursor: TokenCursor::new(reader),
            parsing_state: ParsingState::Outer,
            results_parsed: 0,
        }
    }

    /// Number of query results returned so far.
    pub fn results_parsed(&self) -> u64 {
        self.results_parsed
    }

    /// Parse and return the next query result.
    ///
    /// Returns:
    /// - `Ok(Some(result))` - Decoded the next entry of a `results` array
    /// - `Ok(None)` - End of document
    /// - `Err(e)` - The input is malformed or could not be read
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<QueryResult>> {
        loop {
            match self.parsing_state {
                ParsingState::Done => return Ok(None),
                ParsingState::InResultsArray { queries_depth } => match self.cursor.peek()? {
                    Token::BeginObject => {
                        let result = decode_query_result(&mut self.cursor)?;
                        self.results_parsed += 1;
                        return Ok(Some(result));
                    }
                    Token::EndArray => {
                        self.cursor.end_array()?;
                        self.parsing_state = ParsingState::InQueriesArray {
                            depth: queries_depth,
                        };
                    }
                    _ => self.cursor.skip_value()?,
                },
                ParsingState::Outer | ParsingState::InQueriesArray { .. } => {
                    let token = self.cursor.peek()?;
                    self.step(token)?;
                }
            }
        }
    }

    /// Advance over one token outside of a `results` array.
    fn step(&mut self, token: Token) -> Result<()> {
        match token {
            Token::BeginObject => self.cursor.begin_object(),
            Token::BeginArray => self.cursor.begin_array(),
            Token::EndObject => self.cursor.end_object(),
            Token::EndArray => {
                let closing = self.cursor.depth();
                self.cursor.end_array()?;
                if self.parsing_state == (ParsingState::InQueriesArray { depth: closing }) {
                    self.parsing_state = ParsingState::Outer;
                }
                Ok(())
            }
            Token::Name => {
                let name = self.cursor.next_name()?;
                self.enter_named_value(&name)
            }
            Token::Scalar(_) => self.cursor.skip_value(),
            Token::EndOfInput => {
                if self.parsing_state != ParsingState::Outer {
                    return Err(Error::malformed("document ended inside the queries array"));
                }
                self.parsing_state = ParsingState::Done;
                Ok(())
            }
        }
    }

    /// Decide what to do with the value of member `name`.
    fn enter_named_value(&mut self, name: &str) -> Result<()> {
        let is_array = self.cursor.peek()? == Token::BeginArray;
        match (self.parsing_state, name) {
            (ParsingState::Outer, "queries") if is_array => {
                self.cursor.begin_array()?;
                self.parsing_state = ParsingState::InQueriesArray {
                    depth: self.cursor.depth(),
                };
            }
            // Only a member of a query set object directly inside the array.
            (ParsingState::InQueriesArray { depth }, "results")
                if is_array && self.cursor.depth() == depth + 1 =>
            {
                self.cursor.begin_array()?;
                self.parsing_state = ParsingState::InResultsArray {
                    queries_depth: depth,
                };
            }
            _ => {
                trace!(field = %name, "skipping value");
                self.cursor.skip_value()?;
            }
        }
        Ok(())
    }

    /// Verify that the document ended cleanly.
    ///
    /// Call after [`next`](Self::next) has returned `Ok(None)`.
    pub fn finish(self) -> Result<()> {
        if self.parsing_state != ParsingState::Done {
            return Err(Error::malformed("parser finished before the end of the document"));
        }
        self.cursor.finish()
    }
}
