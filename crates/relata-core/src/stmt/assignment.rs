use super::{criteria::bind_alias, CriteriaValue, PropertyPath, Value};

use indexmap::IndexMap;

/// Property assignments of an insert or update, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    assignments: IndexMap<PropertyPath, CriteriaValue>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn contains(&self, path: &PropertyPath) -> bool {
        self.assignments.contains_key(path)
    }

    pub fn get(&self, path: &PropertyPath) -> Option<&CriteriaValue> {
        self.assignments.get(path)
    }

    /// Set `path`, replacing any earlier assignment to it.
    pub fn set(&mut self, path: PropertyPath, value: impl Into<CriteriaValue>) {
        self.assignments.insert(path, value.into());
    }

    pub fn remove(&mut self, path: &PropertyPath) -> Option<CriteriaValue> {
        self.assignments.shift_remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyPath, &CriteriaValue)> {
        self.assignments.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PropertyPath> {
        self.assignments.keys()
    }

    /// Fill alias values from `params`. With `remove_unbound`, assignments
    /// whose alias has no value are dropped.
    pub fn apply_values(&mut self, params: &IndexMap<String, Value>, remove_unbound: bool) {
        self.assignments.retain(|_, value| bind_alias(value, params) || !remove_unbound);
    }
}

impl IntoIterator for Assignments {
    type Item = (PropertyPath, CriteriaValue);
    type IntoIter = indexmap::map::IntoIter<PropertyPath, CriteriaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.into_iter()
    }
}

impl FromIterator<(PropertyPath, CriteriaValue)> for Assignments {
    fn from_iter<T: IntoIterator<Item = (PropertyPath, CriteriaValue)>>(iter: T) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}
