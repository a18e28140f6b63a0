//! The rendering seam: resolved property values flow out through a
//! [`PropertySink`].

use std::fmt;

use rustc_hash::FxHashMap;

use super::value::PropertyValue;

/// Identity of one animated element: a selector plus its index among the
/// elements matching it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    /// Selector the element was matched by.
    pub selector: String,
    /// Position among the matches, in document order.
    pub index: usize,
}

impl TargetKey {
    /// Key for match `index` of `selector`.
    #[must_use]
    pub fn new(selector: &str, index: usize) -> Self {
        Self {
            selector: selector.to_owned(),
            index,
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.selector, self.index)
    }
}

/// Receives resolved values. Implemented by the rendering layer.
pub trait PropertySink {
    /// Apply `value` to `property` of `target`.
    fn write(&mut self, target: &TargetKey, property: &str, value: PropertyValue);

    /// Drop whatever the orchestrator applied to `property` of `target`,
    /// restoring the element's own styling.
    fn revert(&mut self, _target: &TargetKey, _property: &str) {}
}

/// In-memory sink holding the latest value per `(target, property)`.
#[derive(Debug, Default)]
pub struct PropertyTable {
    values: FxHashMap<(TargetKey, String), PropertyValue>,
    writes: u64,
}

impl PropertyTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value written for `property` of `target`.
    #[must_use]
    pub fn get(&self, target: &TargetKey, property: &str) -> Option<PropertyValue> {
        self.values
            .get(&(target.clone(), property.to_owned()))
            .copied()
    }

    /// Shorthand for a scalar lookup by selector and index.
    #[must_use]
    pub fn scalar(&self, selector: &str, index: usize, property: &str) -> Option<f64> {
        self.get(&TargetKey::new(selector, index), property)
            .as_ref()
            .and_then(PropertyValue::as_scalar)
    }

    /// Total number of writes received (reverts excluded).
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Number of distinct `(target, property)` pairs currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by target then property, for stable dumps.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&TargetKey, &str, PropertyValue)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .map(|((target, prop), value)| (target, prop.as_str(), *value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));
        entries
    }
}

impl PropertySink for PropertyTable {
    fn write(&mut self, target: &TargetKey, property: &str, value: PropertyValue) {
        self.writes += 1;
        let _ = self
            .values
            .insert((target.clone(), property.to_owned()), value);
    }

    fn revert(&mut self, target: &TargetKey, property: &str) {
        let _ = self.values.remove(&(target.clone(), property.to_owned()));
    }
}
