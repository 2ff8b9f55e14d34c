//! Schema-aware decoding of a single query result object.
//!
//! The decoder reads one entry of a query's `results` array from the shared
//! [`TokenCursor`]. The fields it understands are materialized; everything
//! else is skipped structurally, so the cursor always ends up just past the
//! closing brace of the result.

use std::io::Read;

use tracing::{debug, trace};

use crate::cursor::{ScalarKind, Token, TokenCursor};
use crate::error::{Error, Result};
use crate::types::{DataPoint, GroupDescriptor, QueryResult};
use crate::value::DataPointValue;

/// Decode the query result object at the cursor.
///
/// The cursor must be positioned on a begin-object token.
pub fn decode_query_result<R: Read>(cursor: &mut TokenCursor<R>) -> Result<QueryResult> {
    cursor.begin_object()?;
    let mut result = QueryResult::default();

    while cursor.peek()? == Token::Name {
        let field = cursor.next_name()?;
        match field.as_str() {
            "name" => {
                if cursor.peek()? == Token::Scalar(ScalarKind::Null) {
                    cursor.skip_value()?;
                } else {
                    result.name = cursor.next_str()?.to_string();
                }
            }
            "values" => decode_data_points(cursor, &mut result.data_points)?,
            "group_by" => {
                let group_by: Option<Vec<GroupDescriptor>> = cursor.decode()?;
                result.group_by = group_by.unwrap_or_default();
            }
            _ => {
                trace!(field = %field, "skipping query result field");
                cursor.skip_value()?;
            }
        }
    }

    cursor.end_object()?;
    Ok(result)
}

/// Decode a `values` array of `[timestamp, value]` pairs.
fn decode_data_points<R: Read>(
    cursor: &mut TokenCursor<R>,
    points: &mut Vec<DataPoint>,
) -> Result<()> {
    if cursor.peek()? == Token::Scalar(ScalarKind::Null) {
        return cursor.skip_value();
    }

    cursor.begin_array()?;
    while cursor.peek()? != Token::EndArray {
        points.push(decode_data_point(cursor)?);
    }
    cursor.end_array()
}

fn decode_data_point<R: Read>(cursor: &mut TokenCursor<R>) -> Result<DataPoint> {
    cursor.begin_array()?;

    let raw = cursor.next_number()?;
    let timestamp = raw
        .parse::<i64>()
        .map_err(|_| Error::malformed(format!("timestamp '{}' is not an integer", raw)))?;

    let value = decode_value(cursor)?;
    if value.is_degraded() {
        debug!(timestamp, "data point value is not a number, using 0");
    }

    // Tolerate trailing members of the pair.
    while cursor.peek()? != Token::EndArray {
        cursor.skip_value()?;
    }
    cursor.end_array()?;

    Ok(DataPoint::new(timestamp, value))
}

fn decode_value<R: Read>(cursor: &mut TokenCursor<R>) -> Result<DataPointValue> {
    match cursor.peek()? {
        Token::Scalar(ScalarKind::Number) => Ok(DataPointValue::parse(cursor.next_number()?)),
        Token::Scalar(ScalarKind::String) => Ok(DataPointValue::parse(cursor.next_str()?)),
        _ => {
            cursor.skip_value()?;
            Ok(DataPointValue::Degraded)
        }
    }
}
