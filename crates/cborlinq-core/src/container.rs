//! Array and object nodes.
//!
//! Both are persistent: contents are fixed at construction and the `with_*`
//! methods return a new container, leaving the receiver untouched.

use std::ops::Index;

use indexmap::IndexMap;

use crate::types::Node;

/// Ordered sequence of child slots, in CBOR array order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayNode {
    items: Vec<Option<Node>>,
}

impl ArrayNode {
    pub fn new(items: Vec<Option<Node>>) -> Self {
        ArrayNode { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The node at `index`; `None` both out of range and for an absent slot.
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// The slot at `index`: `None` when out of range, `Some(None)` for an
    /// absent slot.
    pub fn try_get(&self, index: usize) -> Option<Option<&Node>> {
        self.items.get(index).map(Option::as_ref)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<&Node>> + '_ {
        self.items.iter().map(Option::as_ref)
    }

    pub fn as_slice(&self) -> &[Option<Node>] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Option<Node>> {
        self.items
    }

    /// A new array with `item` appended.
    pub fn with_pushed(&self, item: Option<Node>) -> ArrayNode {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(item);
        ArrayNode { items }
    }
}

impl Index<usize> for ArrayNode {
    type Output = Option<Node>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl FromIterator<Option<Node>> for ArrayNode {
    fn from_iter<I: IntoIterator<Item = Option<Node>>>(iter: I) -> Self {
        ArrayNode::new(iter.into_iter().collect())
    }
}

impl FromIterator<Node> for ArrayNode {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        ArrayNode::new(iter.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<Node>>> for ArrayNode {
    fn from(items: Vec<Option<Node>>) -> Self {
        ArrayNode::new(items)
    }
}

impl IntoIterator for ArrayNode {
    type Item = Option<Node>;
    type IntoIter = std::vec::IntoIter<Option<Node>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// String-keyed mapping of child slots, in insertion (and CBOR map) order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    entries: IndexMap<String, Option<Node>>,
}

impl ObjectNode {
    pub fn new(entries: IndexMap<String, Option<Node>>) -> Self {
        ObjectNode { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The node under `key`; `None` both for a missing key and a null value.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// The slot under `key`: `None` when the key is absent, `Some(None)` when
    /// the key is present with no value.
    pub fn try_get(&self, key: &str) -> Option<Option<&Node>> {
        self.entries.get(key).map(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = Option<&Node>> + '_ {
        self.entries.values().map(Option::as_ref)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, Option<&Node>)> + '_ {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn as_map(&self) -> &IndexMap<String, Option<Node>> {
        &self.entries
    }

    pub fn into_map(self) -> IndexMap<String, Option<Node>> {
        self.entries
    }

    /// A new object with `key` set to `value`.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn with_entry(&self, key: impl Into<String>, value: Option<Node>) -> ObjectNode {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value);
        ObjectNode { entries }
    }
}

impl Index<&str> for ObjectNode {
    type Output = Option<Node>;

    /// # Panics
    ///
    /// Panics when `key` is absent.
    fn index(&self, key: &str) -> &Self::Output {
        match self.entries.get(key) {
            Some(slot) => slot,
            None => panic!("key {key:?} not present in object"),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Node>)> for ObjectNode {
    fn from_iter<I: IntoIterator<Item = (K, Option<Node>)>>(iter: I) -> Self {
        ObjectNode::new(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

impl From<IndexMap<String, Option<Node>>> for ObjectNode {
    fn from(entries: IndexMap<String, Option<Node>>) -> Self {
        ObjectNode::new(entries)
    }
}

impl IntoIterator for ObjectNode {
    type Item = (String, Option<Node>);
    type IntoIter = indexmap::map::IntoIter<String, Option<Node>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
