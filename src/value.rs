//! Value types for data points in a KairosDB query result.

use ordered_float::OrderedFloat;

/// The value half of a data point.
///
/// KairosDB writes integer samples without a decimal point and floating point
/// samples with one. Anything that is neither is kept as `Degraded` so that a
/// single bad sample does not abort a large conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataPointValue {
    /// Signed 64-bit integer.
    Long(i64),

    /// 64-bit floating point value.
    Double(OrderedFloat<f64>),

    /// A value that could not be read as a number. Rendered as `0`.
    Degraded,
}

impl DataPointValue {
    /// Interpret the raw text of a JSON number or string.
    ///
    /// Integers win over doubles; non-finite doubles and unparseable text
    /// become [`DataPointValue::Degraded`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<i64>() {
            return DataPointValue::Long(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => DataPointValue::Double(OrderedFloat::from(v)),
            _ => DataPointValue::Degraded,
        }
    }

    /// Returns the value as an i64 if it is a `Long` variant.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            DataPointValue::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a f64 if it is a `Double` variant.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            DataPointValue::Double(f) => Some(f.into_inner()),
            _ => None,
        }
    }

    /// Returns true if this is an integer sample.
    pub fn is_integer(&self) -> bool {
        matches!(self, DataPointValue::Long(_))
    }

    /// Returns true if the source value could not be read as a number.
    pub fn is_degraded(&self) -> bool {
        matches!(self, DataPointValue::Degraded)
    }
}

impl std::fmt::Display for DataPointValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataPointValue::Long(i) => write!(f, "{}", i),
            DataPointValue::Double(d) => {
                let d = d.into_inner();
                // Whole doubles keep their decimal point.
                if d.fract() == 0.0 {
                    write!(f, "{:.1}", d)
                } else {
                    write!(f, "{}", d)
                }
            }
            DataPointValue::Degraded => write!(f, "0"),
        }
    }
}
