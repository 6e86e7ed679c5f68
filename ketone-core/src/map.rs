use std::fmt;
use std::hash::Hash;

use indexmap::{Equivalent, IndexMap};

/// Error returned by the reorder operations when one of the keys is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MissingKey {
    #[error("key to move is not in the map")]
    Key,
    #[error("mark key is not in the map")]
    Mark,
}

/// An associative container that remembers insertion order.
///
/// Iteration always walks entries from the oldest insertion to the newest.
/// Updating an existing key replaces its value but keeps its original
/// position; only [`remove`](Self::remove) and the `move_*` operations change
/// where an entry sits.
///
/// Storage is allocated lazily: a map created with [`new`](Self::new) owns no
/// buffer until the first insert or [`reserve`](Self::reserve).
///
/// # Example
///
/// ```
/// use ketone_core::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("b", 2);
/// map.set("a", 1);
/// map.set("b", 3);
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, ["b", "a"]);
/// assert_eq!(map.get("b"), Some(&3));
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    entries: IndexMap<K, V>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map without allocating.
    pub fn new() -> Self {
        OrderedMap {
            entries: IndexMap::new(),
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns how many entries fit before the map reallocates.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the entry that was inserted first.
    pub fn oldest(&self) -> Option<(&K, &V)> {
        self.entries.first()
    }

    /// Returns the entry that was inserted last.
    pub fn newest(&self) -> Option<(&K, &V)> {
        self.entries.last()
    }

    /// Iterates entries from oldest to newest. Use `.rev()` for newest first.
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, K, V> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.entries.values()
    }
}

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    /// Makes room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Inserts or updates an entry.
    ///
    /// A new key is appended at the back. An existing key keeps its position
    /// and the previous value is returned.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get_mut(key)
    }

    /// Returns the stored key together with its value.
    pub fn get_pair<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get_key_value(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.contains_key(key)
    }

    /// Removes an entry, keeping the relative order of the others.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.shift_remove(key)
    }

    /// Moves `key` so it becomes the oldest entry.
    pub fn move_to_front<Q>(&mut self, key: &Q) -> Result<(), MissingKey>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let from = self.entries.get_index_of(key).ok_or(MissingKey::Key)?;
        self.entries.move_index(from, 0);
        Ok(())
    }

    /// Moves `key` so it becomes the newest entry.
    pub fn move_to_back<Q>(&mut self, key: &Q) -> Result<(), MissingKey>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let from = self.entries.get_index_of(key).ok_or(MissingKey::Key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(from, last);
        Ok(())
    }

    /// Moves `key` to sit immediately before `mark`.
    pub fn move_before<Q>(&mut self, key: &Q, mark: &Q) -> Result<(), MissingKey>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let (from, at) = self.indices_of(key, mark)?;
        // Removing `from` shifts everything after it one slot to the left.
        let to = if from < at { at - 1 } else { at };
        self.entries.move_index(from, to);
        Ok(())
    }

    /// Moves `key` to sit immediately after `mark`.
    pub fn move_after<Q>(&mut self, key: &Q, mark: &Q) -> Result<(), MissingKey>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let (from, at) = self.indices_of(key, mark)?;
        let to = if from < at { at } else { at + 1 };
        if from != at {
            self.entries.move_index(from, to);
        }
        Ok(())
    }

    fn indices_of<Q>(&self, key: &Q, mark: &Q) -> Result<(usize, usize), MissingKey>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let from = self.entries.get_index_of(key).ok_or(MissingKey::Key)?;
        let at = self.entries.get_index_of(mark).ok_or(MissingKey::Mark)?;
        Ok((from, at))
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Two maps are equal when they hold equal entries in the same order.
impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Hash + Eq, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut map = OrderedMap::new();
        map.extend(pairs);
        map
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
