/// Map contract shared by every storage engine.
///
/// Engines differ only in asymptotic cost and in the order in which
/// [`Map::iter`] yields entries.
///
/// Textual dumps are engine-specific and live on each engine's
/// [`Display`](std::fmt::Display) implementation, so generic code renders a
/// map with a `M: Map<K, V> + Display` bound.
pub trait Map<K, V> {
    /// Iterator over entries in engine-defined order.
    type Iter<'a>: Iterator<Item = (&'a K, &'a V)>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Returns a number of entries.
    fn len(&self) -> usize;

    /// Returns true if a map has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds a value associated with a key.
    fn get(&self, key: &K) -> Option<&V>;

    /// Associates a value with a key and returns a previous value if any.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Removes a key and returns its value if any.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns entries in engine-defined order.
    fn iter(&self) -> Self::Iter<'_>;
}
