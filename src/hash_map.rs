use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::load_factor::LoadFactor;
use crate::strategy::HashStrategy;
#[cfg(any(feature = "std", feature = "foldhash"))]
use crate::strategy::DefaultHashBuilder;
#[cfg(any(feature = "std", feature = "foldhash"))]
use crate::strategy::Natural;

pub use crate::hash_table::Drain;
pub use crate::hash_table::Entry;
pub use crate::hash_table::IntoIter;
pub use crate::hash_table::Iter;
pub use crate::hash_table::IterMut;
pub use crate::hash_table::OccupiedEntry;
pub use crate::hash_table::VacantEntry;

/// A [`HashMap`] using the key's own `Hash` and `Eq` through the default
/// hasher builder.
#[cfg(any(feature = "std", feature = "foldhash"))]
pub type DefaultHashMap<K, V> = HashMap<K, V, Natural<DefaultHashBuilder>>;

/// A hash map backed by the open-addressing [`HashTable`].
///
/// `HashMap<K, V, H>` pairs keys of type `K` with values of type `V`, hashing
/// and comparing keys with the [`HashStrategy`] `H`. Keys and values live in
/// parallel slot arrays; removal compacts clusters by shifting entries back
/// instead of leaving tombstones.
///
/// # Performance Characteristics
///
/// - **Memory**: one `Option<K>`, one `V` and one cached `u64` hash per slot.
/// - **Lookup**: a linear probe comparing cached hashes before calling into
///   the strategy.
///
/// # Thread safety
///
/// No internal locking is performed. Wrap the map in a mutex to share it
/// mutably between threads.
#[derive(Clone)]
pub struct HashMap<K, V, H> {
    table: HashTable<K, V, H>,
}

impl<K, V, H> Debug for HashMap<K, V, H>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H> PartialEq for HashMap<K, V, H>
where
    V: PartialEq,
    H: HashStrategy<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(key, value)| other.get(key).is_some_and(|v| *value == *v))
    }
}

impl<K, V, H> Eq for HashMap<K, V, H>
where
    V: Eq,
    H: HashStrategy<K>,
{
}

impl<K, V, H> HashMap<K, V, H> {
    /// Creates an empty map using `strategy`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashMap;
    /// use shift_hash::Identity;
    ///
    /// let map: HashMap<&str, u32, _> = HashMap::with_strategy(Identity);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    /// ```
    pub fn with_strategy(strategy: H) -> Self {
        Self {
            table: HashTable::with_strategy(strategy),
        }
    }

    /// Creates a map with at least `capacity` slots using `strategy`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be allocated.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: H) -> Self {
        Self {
            table: HashTable::with_capacity_and_strategy(capacity, strategy),
        }
    }

    /// Creates a map with at least `capacity` slots that grows according to
    /// `load_factor`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    /// use shift_hash::LoadFactor;
    /// use shift_hash::Natural;
    ///
    /// let lf = LoadFactor::from_percent(50).unwrap();
    /// let mut map: DefaultHashMap<u32, u32> = DefaultHashMap::with_config(8, lf, Natural::default());
    /// for k in 0..3 {
    ///     map.insert(k, k);
    /// }
    /// assert_eq!(map.capacity(), 8);
    /// map.insert(3, 3);
    /// assert_eq!(map.capacity(), 16);
    /// # }
    /// ```
    pub fn with_config(capacity: usize, load_factor: LoadFactor, strategy: H) -> Self {
        Self {
            table: HashTable::with_config(capacity, load_factor, strategy),
        }
    }

    /// Fallible version of [`with_config`](Self::with_config).
    pub fn try_with_config(capacity: usize, load_factor: LoadFactor, strategy: H) -> Result<Self> {
        Ok(Self {
            table: HashTable::try_with_config(capacity, load_factor, strategy)?,
        })
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map = DefaultHashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the underlying table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the strategy used to hash and compare keys.
    pub fn strategy(&self) -> &H {
        self.table.strategy()
    }

    /// Removes every entry, keeping the allocated slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map = DefaultHashMap::new();
    /// map.insert(1, "a");
    /// let capacity = map.capacity();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), capacity);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the map to the smallest capacity holding its entries.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Resizes the map to hold `max(expected_len, len)` entries without
    /// growing. May shrink.
    pub fn allocate(&mut self, expected_len: usize) -> Result<()> {
        self.table.allocate(expected_len)
    }

    /// Tries to reserve room for `additional` more entries.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Reserves room for `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity cannot be allocated.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Returns an iterator over the entries in storage order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map = DefaultHashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let mut pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    /// pairs.sort();
    /// assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Returns an iterator over the entries with mutable access to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values, mutably.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map = DefaultHashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// for v in map.values_mut() {
    ///     *v *= 10;
    /// }
    /// assert_eq!(map.get(&"b"), Some(&20));
    /// # }
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns `true` if some key maps to `value`.
    ///
    /// This scans every entry.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map: DefaultHashMap<i32, i32> = (0..8).map(|k| (k, k * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// # }
    /// ```
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(f);
    }

    /// Removes and yields every entry. Capacity is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V, H> {
        self.table.drain()
    }

    /// Computes probe-length statistics of the underlying table.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::hash_table::ProbeStats {
        self.table.probe_stats()
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    H: HashStrategy<K>,
{
    /// Inserts `value` under `key`, returning the value it replaces.
    ///
    /// When the key is already present its stored key is kept and only the
    /// value is overwritten.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`](crate::Error::InvalidKey) if the strategy rejects
    /// the key, [`Error::CapacityOverflow`](crate::Error::CapacityOverflow) if
    /// the map cannot grow. The map is unchanged on error.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(match self.table.entry(key)? {
            Entry::Occupied(mut entry) => Some(entry.insert(value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        })
    }

    /// Inserts `value` under `key`, returning the value it replaces.
    ///
    /// # Panics
    ///
    /// Panics if [`try_insert`](Self::try_insert) fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map = DefaultHashMap::new();
    /// assert_eq!(map.insert(1, "a"), None);
    /// assert_eq!(map.insert(1, "b"), Some("a"));
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.try_insert(key, value)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.table.get_key_value(key)
    }

    /// Returns the value stored under `key`, mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.table.contains(key)
    }

    /// Removes `key`, returning its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut map = DefaultHashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// # }
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(key).map(|(_, value)| value)
    }

    /// Removes `key`, returning the stored key and its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.table.remove(key)
    }

    /// Returns the entry for `key`.
    ///
    /// # Errors
    ///
    /// See [`try_insert`](Self::try_insert).
    pub fn try_entry(&mut self, key: K) -> Result<Entry<'_, K, V, H>> {
        self.table.entry(key)
    }

    /// Returns the entry for `key`.
    ///
    /// # Panics
    ///
    /// Panics if [`try_entry`](Self::try_entry) fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashMap;
    ///
    /// let mut counts = DefaultHashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&2));
    /// # }
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, H> {
        self.try_entry(key).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Inserts every pair of `iter`, stopping at the first rejected key.
    ///
    /// Pairs inserted before the failure stay in the map.
    pub fn try_extend(&mut self, iter: impl IntoIterator<Item = (K, V)>) -> Result<()> {
        let iter = iter.into_iter();
        self.try_reserve(iter.size_hint().0)?;
        for (key, value) in iter {
            self.try_insert(key, value)?;
        }
        Ok(())
    }
}

impl<K, V, H> HashMap<K, V, H>
where
    H: Default,
{
    /// Creates an empty map using the default strategy.
    pub fn new() -> Self {
        Self::with_strategy(H::default())
    }

    /// Creates a map with at least `capacity` slots using the default
    /// strategy.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, H::default())
    }
}

impl<K, V, H> Default for HashMap<K, V, H>
where
    H: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> IntoIterator for HashMap<K, V, H> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, H> IntoIterator for &'a HashMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H> IntoIterator for &'a mut HashMap<K, V, H> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// # Panics
///
/// Panics if the strategy rejects a key.
impl<K, V, H> FromIterator<(K, V)> for HashMap<K, V, H>
where
    H: HashStrategy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// # Panics
///
/// Panics if the strategy rejects a key.
impl<K, V, H> Extend<(K, V)> for HashMap<K, V, H>
where
    H: HashStrategy<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.try_extend(iter).unwrap_or_else(|err| panic!("{err}"));
    }
}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: hash_table::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: hash_table::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: hash_table::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}
