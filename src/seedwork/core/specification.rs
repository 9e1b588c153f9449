use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

// ============================================================================
// Specification Pattern - Storage-Agnostic Query Descriptors
// ============================================================================
//
// A specification is filter criteria + include list + ordering + paging.
// Criteria are plain data (an expression tree), so the same specification can
// be evaluated in memory or rendered into a store's query language.
//
// Specifications are immutable: every builder step consumes the value and
// returns a new one, and `Clone` is cheap enough to reuse them per request.
//
// ============================================================================

/// A comparable field value exposed by a `Queryable` entity
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Ordering between values of the same kind; `Null` sorts first
    fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            (FieldValue::Null, _) => Some(Ordering::Less),
            (_, FieldValue::Null) => Some(Ordering::Greater),
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            FieldValue::Uuid(u) => write!(f, "{}", u),
            FieldValue::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            FieldValue::Timestamp(t) => write!(f, "'{}'", t.to_rfc3339()),
        }
    }
}

/// Entities expose named fields so criteria can be evaluated against them.
/// Returning `None` means the field is unknown to the entity.
pub trait Queryable {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criteria {
    All,
    Eq(String, FieldValue),
    Ne(String, FieldValue),
    Gt(String, FieldValue),
    Gte(String, FieldValue),
    Lt(String, FieldValue),
    Lte(String, FieldValue),
    In(String, Vec<FieldValue>),
    /// Case-insensitive substring match on text fields
    Contains(String, String),
    IsNull(String),
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
    Not(Box<Criteria>),
}

impl Criteria {
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Criteria::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Criteria::Ne(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Criteria::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Criteria::Gte(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Criteria::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Criteria::Lte(field.into(), value.into())
    }

    pub fn one_of<V: Into<FieldValue>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Criteria::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Criteria::Contains(field.into(), needle.into())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Criteria::IsNull(field.into())
    }

    pub fn and(self, other: Criteria) -> Self {
        match (self, other) {
            (Criteria::All, c) | (c, Criteria::All) => c,
            (Criteria::And(mut left), Criteria::And(right)) => {
                left.extend(right);
                Criteria::And(left)
            }
            (Criteria::And(mut left), c) => {
                left.push(c);
                Criteria::And(left)
            }
            (c, other) => Criteria::And(vec![c, other]),
        }
    }

    pub fn or(self, other: Criteria) -> Self {
        match (self, other) {
            (Criteria::All, _) | (_, Criteria::All) => Criteria::All,
            (Criteria::Or(mut left), c) => {
                left.push(c);
                Criteria::Or(left)
            }
            (c, other) => Criteria::Or(vec![c, other]),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Criteria::Not(inner) => *inner,
            c => Criteria::Not(Box::new(c)),
        }
    }

    /// Evaluate against a single entity
    pub fn evaluate<T: Queryable + ?Sized>(&self, entity: &T) -> bool {
        let cmp = |field: &str, value: &FieldValue| -> Option<Ordering> {
            entity.field(field).and_then(|actual| {
                if actual == FieldValue::Null || *value == FieldValue::Null {
                    None
                } else {
                    actual.compare(value)
                }
            })
        };

        // NULL only matches IS NULL / IS NOT NULL, as in the rendered query
        match self {
            Criteria::All => true,
            Criteria::Eq(field, FieldValue::Null) => entity.field(field) == Some(FieldValue::Null),
            Criteria::Ne(field, FieldValue::Null) => {
                entity.field(field).map_or(false, |actual| actual != FieldValue::Null)
            }
            Criteria::Eq(field, value) => entity.field(field).as_ref() == Some(value),
            Criteria::Ne(field, value) => entity
                .field(field)
                .map_or(false, |actual| actual != FieldValue::Null && actual != *value),
            Criteria::Gt(field, value) => cmp(field, value) == Some(Ordering::Greater),
            Criteria::Gte(field, value) => {
                matches!(cmp(field, value), Some(Ordering::Greater | Ordering::Equal))
            }
            Criteria::Lt(field, value) => cmp(field, value) == Some(Ordering::Less),
            Criteria::Lte(field, value) => {
                matches!(cmp(field, value), Some(Ordering::Less | Ordering::Equal))
            }
            Criteria::In(field, values) => entity
                .field(field)
                .map_or(false, |actual| actual != FieldValue::Null && values.contains(&actual)),
            Criteria::Contains(field, needle) => match entity.field(field) {
                Some(FieldValue::Text(text)) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Criteria::IsNull(field) => entity.field(field) == Some(FieldValue::Null),
            Criteria::And(children) => children.iter().all(|c| c.evaluate(entity)),
            Criteria::Or(children) => children.iter().any(|c| c.evaluate(entity)),
            Criteria::Not(inner) => !inner.evaluate(entity),
        }
    }

    /// The value `field` must equal for this criteria to match, if any.
    /// Only top-level equality and conjunctions constrain it.
    pub fn required_value(&self, field: &str) -> Option<&FieldValue> {
        match self {
            Criteria::Eq(name, value) if name == field && *value != FieldValue::Null => Some(value),
            Criteria::And(children) => children.iter().find_map(|c| c.required_value(field)),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::And(_) | Criteria::Or(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

/// Renders a SQL/CQL-like WHERE clause, used by store adapters and logs
impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::All => write!(f, "TRUE"),
            Criteria::Eq(field, FieldValue::Null) => write!(f, "{} IS NULL", field),
            Criteria::Ne(field, FieldValue::Null) => write!(f, "{} IS NOT NULL", field),
            Criteria::Eq(field, value) => write!(f, "{} = {}", field, value),
            Criteria::Ne(field, value) => write!(f, "{} <> {}", field, value),
            Criteria::Gt(field, value) => write!(f, "{} > {}", field, value),
            Criteria::Gte(field, value) => write!(f, "{} >= {}", field, value),
            Criteria::Lt(field, value) => write!(f, "{} < {}", field, value),
            Criteria::Lte(field, value) => write!(f, "{} <= {}", field, value),
            Criteria::In(field, values) => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} IN ({})", field, rendered.join(", "))
            }
            Criteria::Contains(field, needle) => {
                let escaped: String = needle
                    .to_lowercase()
                    .chars()
                    .flat_map(|c| match c {
                        '%' | '_' | '\\' => vec!['\\', c],
                        '\'' => vec!['\'', '\''],
                        c => vec![c],
                    })
                    .collect();
                write!(f, "LOWER({}) LIKE '%{}%' ESCAPE '\\'", field, escaped)
            }
            Criteria::IsNull(field) => write!(f, "{} IS NULL", field),
            Criteria::And(children) | Criteria::Or(children) => {
                if children.is_empty() {
                    return write!(f, "{}", if matches!(self, Criteria::And(_)) { "TRUE" } else { "FALSE" });
                }
                let joiner = if matches!(self, Criteria::And(_)) { " AND " } else { " OR " };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", joiner)?;
                    }
                    child.fmt_nested(f)?;
                }
                Ok(())
            }
            Criteria::Not(inner) => {
                write!(f, "NOT ({})", inner)
            }
        }
    }
}

/// Declarative query: criteria + includes + ordering + paging
pub struct Specification<T> {
    criteria: Criteria,
    includes: Vec<String>,
    order_by: Option<String>,
    order_by_descending: Option<String>,
    skip: usize,
    take: Option<usize>,
    _entity: PhantomData<fn(&T)>,
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            includes: self.includes.clone(),
            order_by: self.order_by.clone(),
            order_by_descending: self.order_by_descending.clone(),
            skip: self.skip,
            take: self.take,
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("criteria", &self.criteria.to_string())
            .field("includes", &self.includes)
            .field("order_by", &self.order_by)
            .field("order_by_descending", &self.order_by_descending)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> Specification<T> {
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria,
            includes: Vec::new(),
            order_by: None,
            order_by_descending: None,
            skip: 0,
            take: None,
            _entity: PhantomData,
        }
    }

    /// Matches every entity
    pub fn all() -> Self {
        Self::new(Criteria::All)
    }

    pub fn with_include(mut self, related: impl Into<String>) -> Self {
        self.includes.push(related.into());
        self
    }

    /// Ascending key; the last call wins
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Descending key; the last call wins
    pub fn order_by_descending(mut self, field: impl Into<String>) -> Self {
        self.order_by_descending = Some(field.into());
        self
    }

    pub fn paged(mut self, skip: usize, take: usize) -> Self {
        self.skip = skip;
        self.take = Some(take);
        self
    }

    /// Narrow with additional criteria, keeping includes/ordering/paging
    pub fn and(mut self, other: Specification<T>) -> Self {
        self.criteria = self.criteria.and(other.criteria);
        self
    }

    pub fn to_expression(&self) -> &Criteria {
        &self.criteria
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn order_by_key(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn order_by_descending_key(&self) -> Option<&str> {
        self.order_by_descending.as_deref()
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn take(&self) -> Option<usize> {
        self.take
    }

    pub fn is_paging_enabled(&self) -> bool {
        self.take.is_some()
    }
}

impl<T: Queryable> Specification<T> {
    pub fn is_satisfied_by(&self, entity: &T) -> bool {
        self.criteria.evaluate(entity)
    }

    /// Filter then order, without paging
    pub fn filter_and_sort(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut matched: Vec<T> = items
            .into_iter()
            .filter(|item| self.criteria.evaluate(item))
            .collect();

        if self.order_by.is_some() || self.order_by_descending.is_some() {
            matched.sort_by(|a, b| self.compare(a, b));
        }

        matched
    }

    /// Filter, order and page in memory
    pub fn apply(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        self.apply_counted(items).0
    }

    /// Like `apply`, also returning the number of matches before paging
    pub fn apply_counted(&self, items: impl IntoIterator<Item = T>) -> (Vec<T>, usize) {
        let matched = self.filter_and_sort(items);
        let total = matched.len();

        if !self.is_paging_enabled() {
            return (matched, total);
        }

        let page = matched
            .into_iter()
            .skip(self.skip)
            .take(self.take.unwrap_or(usize::MAX))
            .collect();
        (page, total)
    }

    // Ascending key is primary; the descending key breaks ties
    fn compare(&self, a: &T, b: &T) -> Ordering {
        let by_field = |left: &T, right: &T, field: &str| -> Ordering {
            match (left.field(field), right.field(field)) {
                (Some(l), Some(r)) => l.compare(&r).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        };

        let mut ordering = Ordering::Equal;
        if let Some(field) = &self.order_by {
            ordering = by_field(a, b, field);
        }
        if ordering == Ordering::Equal {
            if let Some(field) = &self.order_by_descending {
                ordering = by_field(b, a, field);
            }
        }
        ordering
    }
}
