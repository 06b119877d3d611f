use std::cmp::Ordering;

/// A single scalar cell of a [`Table`](crate::Table).
///
/// Values carry a total order so they can serve as group and join keys in
/// ordered maps:
///
/// - `Null` sorts before everything else
/// - `Int` and `Float` are compared numerically (`Int(2) == Float(2.0)`),
///   floats through [`f64::total_cmp`]
/// - `Str` sorts after all numbers
///
/// # Examples
///
/// ```
/// use pitwall_frame::Value;
///
/// assert_eq!(Value::Int(2), Value::Float(2.0));
/// assert!(Value::Null < Value::Int(-10));
/// assert!(Value::Float(1e9) < Value::from("a"));
/// assert_eq!(Value::Float(0.25).to_string(), "0.25");
/// assert_eq!(Value::Null.to_string(), "");
/// ```
#[derive(Debug, Clone, Default, derive_more::Display)]
pub enum Value {
    /// Missing value.
    #[default]
    #[display("")]
    Null,
    /// Integer value.
    #[display("{_0}")]
    Int(i64),
    /// Floating point value.
    #[display("{_0}")]
    Float(f64),
    /// Text value.
    #[display("{_0}")]
    Str(String),
}

impl Value {
    /// Returns `true` for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for `Null` and for a `NaN` float.
    ///
    /// Missing values never match as join keys.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            Value::Int(_) | Value::Str(_) => false,
        }
    }

    /// Numeric view of the value, `None` for `Null` and strings.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Null | Value::Str(_) => None,
        }
    }

    /// Integer view of the value.
    ///
    /// Floats convert only when they hold an integral, finite value.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Value::Float(_) | Value::Null | Value::Str(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Null | Value::Int(_) | Value::Float(_) => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Str(_) => 2,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}
