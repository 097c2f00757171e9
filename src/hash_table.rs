use crate::{key_value::KeyValue, map::Map, utilities::slot_index};
use log::{debug, warn};
use std::{
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    fmt::{self, Debug, Display, Formatter},
    hash::{BuildHasher, BuildHasherDefault, Hash},
    iter::{self, FusedIterator},
    mem,
};

/// Bucket counts a table grows through. A table never grows past the last
/// one.
pub const PRIMES: [usize; 12] = [
    101, 211, 431, 863, 1733, 3467, 6947, 13901, 27803, 55609, 111227, 222461,
];

/// Load factor above which a table grows.
pub const MAX_LOAD_FACTOR: f64 = 0.75;

/// Maximum number of entries rendered by [`Display`].
pub const MAX_DISPLAY_ENTRIES: usize = 1000;

type Chain<K, V> = Option<Box<Link<K, V>>>;

#[derive(Debug)]
struct Link<K, V> {
    key_value: KeyValue<K, V>,
    next: Chain<K, V>,
}

impl<K, V> Link<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key_value: KeyValue::new(key, value),
            next: None,
        }
    }
}

// Shape of a chain around a matching link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Unlink {
    Sole,
    Head,
    Middle(usize),
    Tail(usize),
}

impl Unlink {
    fn new(position: usize, length: usize) -> Self {
        match position {
            0 if length == 1 => Self::Sole,
            0 => Self::Head,
            _ if position + 1 == length => Self::Tail(position),
            _ => Self::Middle(position),
        }
    }
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Chain<K, V>> {
    iter::repeat_with(|| None).take(capacity).collect()
}

fn overloaded(size: usize, capacity: usize) -> bool {
    size as f64 / capacity as f64 > MAX_LOAD_FACTOR
}

/// Map of a hash table with separate chaining.
///
/// A table starts with [`PRIMES`]`[0]` buckets and moves to the next prime
/// whenever an insertion pushes its load factor above [`MAX_LOAD_FACTOR`].
/// Once the primes run out, chains just get longer.
pub struct HashTable<K, V, S = BuildHasherDefault<DefaultHasher>> {
    buckets: Vec<Chain<K, V>>,
    prime_index: usize,
    size: usize,
    build_hasher: S,
}

impl<K, V> HashTable<K, V> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> HashTable<K, V, S> {
    /// Creates an empty table hashing keys with a given hasher builder.
    pub fn with_hasher(build_hasher: S) -> Self {
        Self {
            buckets: empty_buckets(PRIMES[0]),
            prime_index: 0,
            size: 0,
            build_hasher,
        }
    }

    /// Returns a number of entries.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if a table is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns a number of buckets.
    pub fn table_size(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.table_size() as f64
    }

    /// Returns a length of the longest chain.
    pub fn max_chain_length(&self) -> usize {
        (0..self.buckets.len())
            .map(|index| self.links(index).count())
            .max()
            .unwrap_or(0)
    }

    /// Returns entries in bucket order, and in chain order within a bucket.
    pub fn iter(&self) -> HashIterator<'_, K, V> {
        HashIterator::new(&self.buckets, self.size)
    }

    fn links(&self, index: usize) -> impl Iterator<Item = &Link<K, V>> {
        iter::successors(self.buckets[index].as_deref(), |link| link.next.as_deref())
    }

    fn link_mut(&mut self, index: usize, position: usize) -> Option<&mut Link<K, V>> {
        let mut link = self.buckets[index].as_deref_mut()?;

        for _ in 0..position {
            link = link.next.as_deref_mut()?;
        }

        Some(link)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> HashTable<K, V, S> {
    fn slot<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        slot_index(&self.build_hasher, key, self.buckets.len())
    }

    /// Finds a value associated with a key.
    pub fn get<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        self.links(self.slot(key))
            .find(|link| key == link.key_value.key().borrow())
            .map(|link| link.key_value.value())
    }

    /// Returns true if a key is in a table.
    pub fn contains_key<Q: Hash + Eq + ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.get(key).is_some()
    }

    /// Associates a value with a key and returns a previous value if any.
    ///
    /// A new key is appended to the tail of its chain.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = self.slot(&key);
        let mut chain = &mut self.buckets[index];

        while let Some(link) = chain {
            if link.key_value.key() == &key {
                return Some(mem::replace(link.key_value.value_mut(), value));
            }

            chain = &mut link.next;
        }

        *chain = Some(Link::new(key, value).into());
        self.size += 1;

        if overloaded(self.size, self.table_size()) {
            if let Some(&capacity) = PRIMES.get(self.prime_index + 1) {
                self.rehash(capacity);
            } else if !overloaded(self.size - 1, self.table_size()) {
                warn!(
                    "hash table of {} buckets exceeded load factor {} with no larger capacity left",
                    self.table_size(),
                    MAX_LOAD_FACTOR
                );
            }
        }

        None
    }

    /// Removes a key and returns its value if any.
    pub fn remove<Q: Hash + Eq + ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let index = self.slot(key);
        let position = self
            .links(index)
            .position(|link| key == link.key_value.key().borrow())?;
        let length = self.links(index).count();

        let link = match Unlink::new(position, length) {
            Unlink::Sole => self.buckets[index].take(),
            Unlink::Head => {
                let mut head = self.buckets[index].take()?;

                self.buckets[index] = head.next.take();

                Some(head)
            }
            Unlink::Middle(position) => {
                let previous = self.link_mut(index, position - 1)?;
                let mut link = previous.next.take()?;

                previous.next = link.next.take();

                Some(link)
            }
            Unlink::Tail(position) => self.link_mut(index, position - 1)?.next.take(),
        }?;

        self.size -= 1;

        Some(link.key_value.into_pair().1)
    }

    fn rehash(&mut self, capacity: usize) {
        debug!(
            "rehashing {} entries from {} to {} buckets",
            self.size,
            self.table_size(),
            capacity
        );

        let buckets = mem::replace(&mut self.buckets, empty_buckets(capacity));
        self.prime_index += 1;

        for mut chain in buckets {
            while let Some(mut link) = chain {
                chain = link.next.take();
                self.append(link);
            }
        }
    }

    // Appends a detached link to the tail of its chain.
    fn append(&mut self, link: Box<Link<K, V>>) {
        let index = self.slot(link.key_value.key());
        let mut chain = &mut self.buckets[index];

        while let Some(next) = chain {
            chain = &mut next.next;
        }

        *chain = Some(link);
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for HashTable<K, V, S> {
    fn clone(&self) -> Self {
        let mut buckets = Vec::with_capacity(self.buckets.len());

        for index in 0..self.buckets.len() {
            let mut chain: Chain<K, V> = None;
            let mut tail = &mut chain;

            for link in self.links(index) {
                let (key, value) = link.key_value.clone().into_pair();

                tail = &mut tail.insert(Box::new(Link::new(key, value))).next;
            }

            buckets.push(chain);
        }

        Self {
            buckets,
            prime_index: self.prime_index,
            size: self.size,
            build_hasher: self.build_hasher.clone(),
        }
    }
}

// Links are detached one at a time to keep dropping a chain iterative.
impl<K, V, S> Drop for HashTable<K, V, S> {
    fn drop(&mut self) {
        for bucket in &mut self.buckets {
            let mut chain = bucket.take();

            while let Some(mut link) = chain {
                chain = link.next.take();
            }
        }
    }
}

impl<K, V, S: Default> Default for HashTable<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: Debug, V: Debug, S> Debug for HashTable<K, V, S> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Display, V: Display, S> Display for HashTable<K, V, S> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        if self.size > MAX_DISPLAY_ENTRIES {
            return write!(formatter, "HashMap too large to represent as a string.");
        } else if self.size == 0 {
            return write!(formatter, "HashMap is empty.");
        }

        let width = self
            .buckets
            .iter()
            .rposition(Option::is_some)
            .unwrap_or(0)
            .to_string()
            .len();

        for index in 0..self.buckets.len() {
            if self.buckets[index].is_none() {
                continue;
            }

            write!(formatter, "{index:>width$}: ")?;

            for (position, link) in self.links(index).enumerate() {
                if position > 0 {
                    write!(formatter, " -> ")?;
                }

                write!(formatter, "{}", link.key_value)?;
            }

            writeln!(formatter)?;
        }

        Ok(())
    }
}

impl<K: Hash + Eq, V: PartialEq, S: BuildHasher> PartialEq for HashTable<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for HashTable<K, V, S> {}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for HashTable<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterator: I) {
        for (key, value) in iterator {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> FromIterator<(K, V)> for HashTable<K, V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterator: I) -> Self {
        let mut table = Self::default();

        table.extend(iterator);

        table
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Map<K, V> for HashTable<K, V, S> {
    type Iter<'a>
        = HashIterator<'a, K, V>
    where
        K: 'a,
        V: 'a,
        S: 'a;

    fn len(&self) -> usize {
        HashTable::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        HashTable::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        HashTable::remove(self, key)
    }

    fn iter(&self) -> Self::Iter<'_> {
        HashTable::iter(self)
    }
}

/// Iterator of a hash table in bucket order.
#[derive(Debug)]
pub struct HashIterator<'a, K, V> {
    buckets: &'a [Chain<K, V>],
    index: usize,
    current: Option<&'a Link<K, V>>,
    remaining: usize,
}

impl<'a, K, V> HashIterator<'a, K, V> {
    fn new(buckets: &'a [Chain<K, V>], remaining: usize) -> Self {
        let mut iterator = Self {
            buckets,
            index: 0,
            current: None,
            remaining,
        };

        iterator.current = iterator.advance();
        iterator
    }

    /// Returns true if there are entries left.
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    // Moves to the head of the next non-empty bucket at or after the current
    // index.
    fn advance(&mut self) -> Option<&'a Link<K, V>> {
        let buckets = self.buckets;

        while self.index < buckets.len() && buckets[self.index].is_none() {
            self.index += 1;
        }

        buckets.get(self.index)?.as_deref()
    }
}

impl<'a, K, V> Iterator for HashIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.current?;

        self.current = match link.next.as_deref() {
            Some(next) => Some(next),
            None => {
                self.index += 1;
                self.advance()
            }
        };
        self.remaining -= 1;

        Some((link.key_value.key(), link.key_value.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for HashIterator<'_, K, V> {}

impl<K, V> FusedIterator for HashIterator<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type IntoIter = HashIterator<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
