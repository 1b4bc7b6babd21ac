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

/// A [`HashSet`] using the key's own `Hash` and `Eq` through the default
/// hasher builder.
#[cfg(any(feature = "std", feature = "foldhash"))]
pub type DefaultHashSet<K> = HashSet<K, Natural<DefaultHashBuilder>>;

/// A hash set backed by the open-addressing [`HashTable`].
///
/// `HashSet<K, H>` stores keys of type `K` compared with the [`HashStrategy`]
/// `H`. It shares the map engine with a zero-sized value type, so no value
/// storage is allocated.
///
/// # Performance Characteristics
///
/// - **Memory**: one `Option<K>` and one cached `u64` hash per slot.
#[derive(Clone)]
pub struct HashSet<K, H> {
    table: HashTable<K, (), H>,
}

impl<K, H> PartialEq for HashSet<K, H>
where
    H: HashStrategy<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|key| other.contains(key))
    }
}

impl<K, H> Eq for HashSet<K, H> where H: HashStrategy<K> {}

impl<K, H> Debug for HashSet<K, H>
where
    K: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, H> HashSet<K, H> {
    /// Creates an empty set using `strategy`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::HashSet;
    /// use shift_hash::Identity;
    ///
    /// let set: HashSet<&u32, _> = HashSet::with_strategy(Identity);
    /// assert!(set.is_empty());
    /// ```
    pub fn with_strategy(strategy: H) -> Self {
        Self {
            table: HashTable::with_strategy(strategy),
        }
    }

    /// Creates a set with at least `capacity` slots using `strategy`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be allocated.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: H) -> Self {
        Self {
            table: HashTable::with_capacity_and_strategy(capacity, strategy),
        }
    }

    /// Creates a set with at least `capacity` slots that grows according to
    /// `load_factor`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be allocated.
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

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no keys.
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

    /// Removes every key, keeping the allocated slots.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the set to the smallest capacity holding its keys.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Resizes the set to hold `max(expected_len, len)` keys without growing.
    /// May shrink.
    pub fn allocate(&mut self, expected_len: usize) -> Result<()> {
        self.table.allocate(expected_len)
    }

    /// Tries to reserve room for `additional` more keys.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Reserves room for `additional` more keys.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity cannot be allocated.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Returns an iterator over the keys in storage order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes and yields every key. Capacity is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashSet;
    ///
    /// let mut set: DefaultHashSet<i32> = (1..=3).collect();
    /// let mut drained: Vec<_> = set.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, vec![1, 2, 3]);
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, H> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Keeps only the keys for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashSet;
    ///
    /// let mut set: DefaultHashSet<i32> = (1..=4).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K) -> bool) {
        self.table.retain(|key, _| f(key));
    }

    /// Computes probe-length statistics of the underlying table.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::hash_table::ProbeStats {
        self.table.probe_stats()
    }
}

impl<K, H> HashSet<K, H>
where
    H: HashStrategy<K>,
{
    /// Adds `key`, returning `true` if it was not present.
    ///
    /// A key already present is left in place and `key` is dropped.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`](crate::Error::InvalidKey) if the strategy rejects
    /// the key, [`Error::CapacityOverflow`](crate::Error::CapacityOverflow) if
    /// the set cannot grow. The set is unchanged on error.
    pub fn try_insert(&mut self, key: K) -> Result<bool> {
        Ok(self.table.insert(key, ())?.1)
    }

    /// Adds `key`, returning `true` if it was not present.
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
    /// use shift_hash::DefaultHashSet;
    ///
    /// let mut set = DefaultHashSet::new();
    /// assert!(set.insert("a"));
    /// assert!(!set.insert("a"));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.try_insert(key).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.table.contains(key)
    }

    /// Returns the stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.table.get_key_value(key).map(|(stored, _)| stored)
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.table.remove(key).is_some()
    }

    /// Removes and returns the stored key equal to `key`.
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.table.remove(key).map(|(stored, _)| stored)
    }

    /// Returns `true` if `self` and `other` share no keys.
    pub fn is_disjoint(&self, other: &HashSet<K, H>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|key| !large.contains(key))
    }

    /// Returns `true` if every key of `self` is in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashSet;
    ///
    /// let a: DefaultHashSet<i32> = [1, 2].into_iter().collect();
    /// let b: DefaultHashSet<i32> = [1, 2, 3].into_iter().collect();
    /// assert!(a.is_subset(&b));
    /// assert!(b.is_superset(&a));
    /// assert!(!b.is_subset(&a));
    /// # }
    /// ```
    pub fn is_subset(&self, other: &HashSet<K, H>) -> bool {
        self.len() <= other.len() && self.iter().all(|key| other.contains(key))
    }

    /// Returns `true` if every key of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<K, H>) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over the keys in `self` or `other`, without
    /// duplicates.
    pub fn union<'a>(&'a self, other: &'a HashSet<K, H>) -> Union<'a, K, H> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            other_set: self,
        }
    }

    /// Returns an iterator over the keys in both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use shift_hash::DefaultHashSet;
    ///
    /// let a: DefaultHashSet<i32> = [1, 2].into_iter().collect();
    /// let b: DefaultHashSet<i32> = [2, 3].into_iter().collect();
    /// let both: Vec<_> = a.intersection(&b).copied().collect();
    /// assert_eq!(both, vec![2]);
    /// # }
    /// ```
    pub fn intersection<'a>(&'a self, other: &'a HashSet<K, H>) -> Intersection<'a, K, H> {
        if self.len() <= other.len() {
            Intersection {
                iter: self.iter(),
                other,
            }
        } else {
            Intersection {
                iter: other.iter(),
                other: self,
            }
        }
    }

    /// Returns an iterator over the keys in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<K, H>) -> Difference<'a, K, H> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the keys in exactly one of `self` and
    /// `other`.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<K, H>,
    ) -> SymmetricDifference<'a, K, H> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Adds every key of `iter`, stopping at the first rejected key.
    ///
    /// Keys added before the failure stay in the set.
    pub fn try_extend(&mut self, iter: impl IntoIterator<Item = K>) -> Result<()> {
        let iter = iter.into_iter();
        self.try_reserve(iter.size_hint().0)?;
        for key in iter {
            self.try_insert(key)?;
        }
        Ok(())
    }
}

impl<K, H> HashSet<K, H>
where
    H: Default,
{
    /// Creates an empty set using the default strategy.
    pub fn new() -> Self {
        Self::with_strategy(H::default())
    }

    /// Creates a set with at least `capacity` slots using the default
    /// strategy.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, H::default())
    }
}

impl<K, H> Default for HashSet<K, H>
where
    H: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the keys of a [`HashSet`] in storage order.
///
/// The set cannot be structurally modified while the iterator is alive.
pub struct Iter<'a, K> {
    inner: hash_table::Iter<'a, K, ()>,
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// A draining iterator over the keys of a [`HashSet`].
pub struct Drain<'a, K, H> {
    inner: hash_table::Drain<'a, K, (), H>,
}

impl<K, H> Iterator for Drain<'_, K, H> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, H> ExactSizeIterator for Drain<'_, K, H> {}

/// An owning iterator over the keys of a [`HashSet`].
pub struct IntoIter<K, H> {
    inner: hash_table::IntoIter<K, (), H>,
}

impl<K, H> Iterator for IntoIter<K, H> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, H> ExactSizeIterator for IntoIter<K, H> {}

impl<K, H> IntoIterator for HashSet<K, H> {
    type Item = K;
    type IntoIter = IntoIter<K, H>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, H> IntoIterator for &'a HashSet<K, H> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// # Panics
///
/// Panics if the strategy rejects a key.
impl<K, H> FromIterator<K> for HashSet<K, H>
where
    H: HashStrategy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// # Panics
///
/// Panics if the strategy rejects a key.
impl<K, H> Extend<K> for HashSet<K, H>
where
    H: HashStrategy<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.try_extend(iter).unwrap_or_else(|err| panic!("{err}"));
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, K, H> {
    iter: Iter<'a, K>,
    other_iter: Iter<'a, K>,
    other_set: &'a HashSet<K, H>,
}

impl<'a, K, H> Iterator for Union<'a, K, H>
where
    H: HashStrategy<K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(key) = self.iter.next() {
            return Some(key);
        }
        loop {
            let key = self.other_iter.next()?;
            if !self.other_set.contains(key) {
                return Some(key);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, K, H> {
    iter: Iter<'a, K>,
    other: &'a HashSet<K, H>,
}

impl<'a, K, H> Iterator for Intersection<'a, K, H>
where
    H: HashStrategy<K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.iter.next()?;
            if self.other.contains(key) {
                return Some(key);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, K, H> {
    iter: Iter<'a, K>,
    other: &'a HashSet<K, H>,
}

impl<'a, K, H> Iterator for Difference<'a, K, H>
where
    H: HashStrategy<K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.iter.next()?;
            if !self.other.contains(key) {
                return Some(key);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, K, H> {
    iter: core::iter::Chain<Difference<'a, K, H>, Difference<'a, K, H>>,
}

impl<'a, K, H> Iterator for SymmetricDifference<'a, K, H>
where
    H: HashStrategy<K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
