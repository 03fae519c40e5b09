//! The attribute map hangs off every `Series` and every `Filter`. It is a
//! small, sorted name / value collection: series carry a handful of
//! attributes at most, and a sorted vector beats hashing at that size while
//! giving a stable order on the wire.

use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::slice::Iter;

/// Attribute name to attribute value. Behaves like
/// `std::collections::BTreeMap<String, String>`: inserting a name twice keeps
/// the last value.
#[derive(Clone, Debug, Default, Eq)]
pub struct AttributeMap {
    inner: Vec<(String, String)>,
}

impl Hash for AttributeMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &(ref k, ref v) in self.iter() {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl PartialEq for AttributeMap {
    fn eq(&self, other: &AttributeMap) -> bool {
        if self.inner.len() != other.inner.len() {
            false
        } else {
            for (&(ref k, ref v), &(ref o_k, ref o_v)) in
                self.inner.iter().zip(other.inner.iter())
            {
                if (k != o_k) || (v != o_v) {
                    return false;
                }
            }
            true
        }
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = &'a (String, String);
    type IntoIter = Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl FromIterator<(String, String)> for AttributeMap {
    fn from_iter<I>(iter: I) -> AttributeMap
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = AttributeMap::default();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl AttributeMap {
    /// Iterate name / value pairs in name order.
    pub fn iter(&self) -> Iter<(String, String)> {
        self.inner.iter()
    }

    /// Get the value stored under `name`, if it exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.inner.binary_search_by(|probe| probe.0.as_str().cmp(name)) {
            Ok(idx) => Some(&self.inner[idx].1),
            Err(_) => None,
        }
    }

    /// Remove `name` from the map. The value will be returned if it existed.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        match self.inner.binary_search_by(|probe| probe.0.as_str().cmp(name)) {
            Ok(idx) => Some(self.inner.remove(idx).1),
            Err(_) => None,
        }
    }

    /// Insert a name / value into self
    ///
    /// This method will return the value previously stored under the given
    /// name, if there was such a value.
    pub fn insert(&mut self, name: String, val: String) -> Option<String> {
        match self.inner.binary_search_by(|probe| probe.0.cmp(&name)) {
            Ok(idx) => {
                self.inner.push((name, val));
                let old = self.inner.swap_remove(idx);
                Some(old.1)
            }
            Err(idx) => {
                self.inner.insert(idx, (name, val));
                None
            }
        }
    }

    /// Determine if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Return the total number of names stored in the map.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
