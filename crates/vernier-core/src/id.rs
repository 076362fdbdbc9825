//! Meter identity: names, tags, and meter kinds
//!
//! An [`Id`] is what a meter is stored and looked up by. Two ids are equal
//! when their name and tag set are equal; base unit, description, and kind
//! are metadata and do not participate in identity.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A key/value dimension attached to a meter.
///
/// Tag sets are keyed by `key`: when the same key appears twice, the last
/// value wins. Equality of a tag set is order-independent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Tag key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Tag value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<(&str, &str)> for Tag {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

impl From<(String, String)> for Tag {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The kind of instrument a meter represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeterType {
    /// Monotonically increasing value
    Counter,
    /// Duration distribution
    Timer,
    /// Instantaneous value read from a supplier
    Gauge,
    /// Distribution of arbitrary amounts
    DistributionSummary,
}

impl fmt::Display for MeterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Counter => "counter",
            Self::Timer => "timer",
            Self::Gauge => "gauge",
            Self::DistributionSummary => "distribution summary",
        };
        f.write_str(name)
    }
}

/// The identity of a meter: a name plus a normalized tag set, with optional
/// descriptive metadata.
///
/// Ids are immutable; `with_*` methods return new values. Construction
/// normalizes the tag set (duplicate keys deduplicated with last write
/// winning, sorted by key so equality and hashing are order-independent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Id {
    name: String,
    tags: Vec<Tag>,
    base_unit: Option<String>,
    description: Option<String>,
    meter_type: MeterType,
}

impl Id {
    /// Create a new id with a normalized tag set
    pub fn new(
        name: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
        meter_type: MeterType,
    ) -> Self {
        Self {
            name: name.into(),
            tags: normalize_tags(tags),
            base_unit: None,
            description: None,
            meter_type,
        }
    }

    /// Meter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized tag set, sorted by key
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Look up a tag value by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key() == key)
            .map(Tag::value)
    }

    /// Base unit of recorded values, if declared
    pub fn base_unit(&self) -> Option<&str> {
        self.base_unit.as_deref()
    }

    /// Human-readable description, if declared
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The kind of instrument this id was requested for
    pub fn meter_type(&self) -> MeterType {
        self.meter_type
    }

    /// Copy of this id under a different name
    pub fn with_name(&self, name: impl Into<String>) -> Id {
        Id {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy of this id with the tag set replaced (and re-normalized)
    pub fn with_tags(&self, tags: impl IntoIterator<Item = Tag>) -> Id {
        Id {
            tags: normalize_tags(tags),
            ..self.clone()
        }
    }

    /// Copy of this id with one tag added or overwritten
    pub fn with_tag(&self, tag: Tag) -> Id {
        self.with_tags(self.tags.iter().cloned().chain([tag]))
    }

    /// Copy of this id with a base unit
    pub fn with_base_unit(&self, base_unit: impl Into<String>) -> Id {
        Id {
            base_unit: Some(base_unit.into()),
            ..self.clone()
        }
    }

    /// Copy of this id with a description
    pub fn with_description(&self, description: impl Into<String>) -> Id {
        Id {
            description: Some(description.into()),
            ..self.clone()
        }
    }

    /// Copy of this id requested as a different kind of instrument
    pub fn with_meter_type(&self, meter_type: MeterType) -> Id {
        Id {
            meter_type,
            ..self.clone()
        }
    }
}

// Identity covers name and tag set only; metadata fields are excluded so a
// lookup finds the meter regardless of how the request described it.
impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tags == other.tags
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.tags.hash(state);
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.tags.is_empty() {
            f.write_str("[")?;
            for (i, tag) in self.tags.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{tag}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Deduplicate by key (last write wins) and sort by key.
fn normalize_tags(tags: impl IntoIterator<Item = Tag>) -> Vec<Tag> {
    let mut normalized: Vec<Tag> = Vec::new();
    for tag in tags {
        match normalized.iter_mut().find(|t| t.key() == tag.key()) {
            Some(existing) => *existing = tag,
            None => normalized.push(tag),
        }
    }
    normalized.sort_by(|a, b| a.key.cmp(&b.key));
    normalized
}
