//! Built-in column predicates
use std::cmp::Ordering;
use std::fmt;

use crate::filter::{ChunkStatistics, ColumnFilter, StatValue};

/// A constant operand of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Utf8(String),
    Binary(Vec<u8>),
}

impl Literal {
    fn as_stat(&self) -> StatValue<'_> {
        match self {
            Literal::Boolean(v) => StatValue::Boolean(*v),
            Literal::Int(v) => StatValue::Int(*v),
            Literal::UInt(v) => StatValue::UInt(*v),
            Literal::Float(v) => StatValue::Float(*v),
            Literal::Utf8(v) => StatValue::Bytes(v.as_bytes()),
            Literal::Binary(v) => StatValue::Bytes(v),
        }
    }

    /// Orders this literal against a statistics bound, `None` if incomparable
    fn compare(&self, bound: &StatValue<'_>) -> Option<Ordering> {
        self.as_stat().compare(bound)
    }
}

macro_rules! literal_from {
    ($($t:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$t> for Literal {
                fn from(v: $t) -> Self {
                    Literal::$variant(v as $target)
                }
            }
        )*
    };
}

literal_from!(
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
);

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Utf8(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Utf8(v)
    }
}

impl From<Vec<u8>> for Literal {
    fn from(v: Vec<u8>) -> Self {
        Literal::Binary(v)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(v) => write!(f, "{}", v),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::UInt(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Utf8(v) => write!(f, "'{}'", v),
            Literal::Binary(v) => write!(f, "0x{}", v.iter().map(|b| format!("{:02x}", b)).collect::<String>()),
        }
    }
}

/// One end of a range predicate
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBound {
    pub value: Literal,
    pub inclusive: bool,
}

/// The comparison a [`ColumnPredicate`] performs
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateKind {
    /// `lower <(=) col <(=) upper`, either side optional
    Range {
        lower: Option<RangeBound>,
        upper: Option<RangeBound>,
    },
    Equal(Literal),
    NotEqual(Literal),
    In(Vec<Literal>),
    IsNull,
}

/// A filter over a single named column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPredicate {
    column: String,
    kind: PredicateKind,
}

impl ColumnPredicate {
    pub fn new(column: impl Into<String>, kind: PredicateKind) -> Self {
        Self {
            column: column.into(),
            kind,
        }
    }

    /// `low <= col <= high`
    pub fn between(column: impl Into<String>, low: impl Into<Literal>, high: impl Into<Literal>) -> Self {
        Self::range(column, Some((low.into(), true)), Some((high.into(), true)))
    }

    /// General range with optional, individually inclusive bounds
    pub fn range(
        column: impl Into<String>,
        lower: Option<(Literal, bool)>,
        upper: Option<(Literal, bool)>,
    ) -> Self {
        let bound = |(value, inclusive): (Literal, bool)| RangeBound { value, inclusive };
        Self::new(
            column,
            PredicateKind::Range {
                lower: lower.map(bound),
                upper: upper.map(bound),
            },
        )
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::range(column, Some((value.into(), false)), None)
    }

    pub fn gt_eq(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::range(column, Some((value.into(), true)), None)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::range(column, None, Some((value.into(), false)))
    }

    pub fn lt_eq(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::range(column, None, Some((value.into(), true)))
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::new(column, PredicateKind::Equal(value.into()))
    }

    pub fn not_eq(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::new(column, PredicateKind::NotEqual(value.into()))
    }

    pub fn is_in<L: Into<Literal>>(column: impl Into<String>, values: impl IntoIterator<Item = L>) -> Self {
        Self::new(
            column,
            PredicateKind::In(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, PredicateKind::IsNull)
    }

    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    /// True if `value` provably lies outside `[min, max]`
    fn outside(value: &Literal, min: &StatValue<'_>, max: &StatValue<'_>) -> bool {
        matches!(value.compare(min), Some(Ordering::Less))
            || matches!(value.compare(max), Some(Ordering::Greater))
    }
}

impl ColumnFilter for ColumnPredicate {
    fn column_name(&self) -> &str {
        &self.column
    }

    fn check_statistics(&self, stats: &ChunkStatistics<'_>) -> bool {
        if let PredicateKind::IsNull = self.kind {
            return stats.null_count() == Some(0);
        }

        let Some((min, max)) = stats.min_max() else {
            return false;
        };

        match &self.kind {
            PredicateKind::Range { lower, upper } => {
                // Every value is below the lower bound
                let below = lower.as_ref().is_some_and(|b| {
                    match b.value.compare(&max) {
                        Some(Ordering::Greater) => true,
                        Some(Ordering::Equal) => !b.inclusive,
                        _ => false,
                    }
                });
                // Every value is above the upper bound
                let above = upper.as_ref().is_some_and(|b| {
                    match b.value.compare(&min) {
                        Some(Ordering::Less) => true,
                        Some(Ordering::Equal) => !b.inclusive,
                        _ => false,
                    }
                });
                below || above
            }
            PredicateKind::Equal(value) => Self::outside(value, &min, &max),
            // Float bounds leave out NaN, which satisfies `!=`
            PredicateKind::NotEqual(_) if matches!(min, StatValue::Float(_)) => false,
            PredicateKind::NotEqual(value) => {
                // Nulls never satisfy `!=`, so a chunk whose only non-null
                // value is `value` has no match
                value.compare(&min) == Some(Ordering::Equal)
                    && value.compare(&max) == Some(Ordering::Equal)
            }
            PredicateKind::In(values) => values.iter().all(|v| Self::outside(v, &min, &max)),
            PredicateKind::IsNull => false,
        }
    }
}

impl fmt::Display for ColumnPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = &self.column;
        match &self.kind {
            PredicateKind::Range { lower, upper } => {
                let mut parts = Vec::new();
                if let Some(b) = lower {
                    parts.push(format!("{} {} {}", col, if b.inclusive { ">=" } else { ">" }, b.value));
                }
                if let Some(b) = upper {
                    parts.push(format!("{} {} {}", col, if b.inclusive { "<=" } else { "<" }, b.value));
                }
                if parts.is_empty() {
                    write!(f, "{} is unbounded", col)
                } else {
                    write!(f, "{}", parts.join(" AND "))
                }
            }
            PredicateKind::Equal(v) => write!(f, "{} = {}", col, v),
            PredicateKind::NotEqual(v) => write!(f, "{} != {}", col, v),
            PredicateKind::In(values) => {
                let list: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} IN ({})", col, list.join(", "))
            }
            PredicateKind::IsNull => write!(f, "{} IS NULL", col),
        }
    }
}
