use std::fmt;

/// A single attribute value of a feature.
///
/// Values are written to CSV through their canonical string form, i.e. their
/// `Display` implementation. No type-specific formatting is applied beyond it.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Text(String),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    Date { year: i32, month: u32, day: u32 },
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Text(text) => f.write_str(text),
            AttributeValue::Integer(value) => write!(f, "{}", value),
            AttributeValue::Unsigned(value) => write!(f, "{}", value),
            AttributeValue::Float(value) => write!(f, "{}", value),
            AttributeValue::Boolean(value) => write!(f, "{}", value),
            AttributeValue::Date { year, month, day } => {
                write!(f, "{:04}-{:02}-{:02}", year, month, day)
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => AttributeValue::Integer(value),
            Err(_) => AttributeValue::Unsigned(value),
        }
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(value.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

/// One geospatial record reduced to its attribute table row.
///
/// Attributes keep the order in which the source declared them; that order is
/// part of the schema and is compared between features.
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::feature::{AttributeValue, Feature};
///
/// let feature = Feature::new()
///     .with_attribute("name", "Lyon")
///     .with_attribute("population", 522_228);
///
/// assert_eq!(feature.names().collect::<Vec<_>>(), vec!["name", "population"]);
/// assert_eq!(feature.get("population"), Some(&AttributeValue::Integer(522_228)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    attributes: Vec<(String, AttributeValue)>,
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            attributes: Vec::with_capacity(capacity),
        }
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Attribute names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    /// Attribute values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &AttributeValue> {
        self.attributes.iter().map(|(_, value)| value)
    }

    /// Returns the first value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Feature
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Feature {
            attributes: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// The ordered attribute names shared by every feature of a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
}

impl Schema {
    /// Captures the schema of `feature`.
    pub fn of(feature: &Feature) -> Self {
        Schema {
            names: feature.names().map(str::to_string).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Checks that `feature` carries the same names, in the same order and
    /// the same count.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.names.len() == feature.len()
            && self.names.iter().zip(feature.names()).all(|(a, b)| a == b)
    }
}
