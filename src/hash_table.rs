use alloc::boxed::Box;
#[cfg(any(test, feature = "stats"))]
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;

use crate::error::Error;
use crate::error::Result;
use crate::load_factor::LoadFactor;
use crate::strategy::HashStrategy;

type Storage<K, V> = (Box<[Option<K>]>, Box<[u64]>, Box<[MaybeUninit<V>]>);

/// Fails with [`Error::CapacityOverflow`] unless every slot array for
/// `capacity` slots can be described by a valid layout.
fn check_storage<K, V>(capacity: usize) -> Result<()> {
    if capacity.is_power_of_two()
        && Layout::array::<Option<K>>(capacity).is_ok()
        && Layout::array::<u64>(capacity).is_ok()
        && Layout::array::<V>(capacity).is_ok()
    {
        Ok(())
    } else {
        log::debug!("capacity of {capacity} slots cannot be allocated");
        Err(Error::CapacityOverflow)
    }
}

fn allocate_storage<K, V>(capacity: usize) -> Storage<K, V> {
    let keys = core::iter::repeat_with(|| None).take(capacity).collect();
    let hashes = alloc::vec![0u64; capacity].into_boxed_slice();
    let values = Box::<[V]>::new_uninit_slice(capacity);
    (keys, hashes, values)
}

/// Probe-length statistics of a table.
///
/// The probe length of an entry is its distance from its home slot, i.e. the
/// number of occupied slots a successful lookup steps over before reaching it.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStats {
    /// Number of entries.
    pub len: usize,
    /// Number of slots.
    pub capacity: usize,
    /// `len / capacity`.
    pub load: f64,
    /// Longest probe length of any entry.
    pub max_probe_length: usize,
    /// Mean probe length over all entries.
    pub mean_probe_length: f64,
    /// `histogram[d]` counts the entries stored `d` slots after their home.
    pub histogram: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeStats {
    /// Pretty-prints the statistics with a horizontal bar chart of the
    /// histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load)",
            self.len,
            self.capacity,
            self.load * 100.0
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );

        let max = self.histogram.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return;
        }
        for (distance, &count) in self.histogram.iter().enumerate() {
            let bar = (count * 50).div_ceil(max);
            println!("{distance:>4} | {:<50} {count}", "#".repeat(bar));
        }
    }
}

/// A compact open-addressing hash table with a pluggable [`HashStrategy`].
///
/// `HashTable<K, V, H>` stores keys of type `K`, each paired with a value of
/// type `V`, and hashes and compares keys with the strategy `H`. Use `V = ()`
/// for a set. Entries are addressed by slot index; indices stay valid until
/// the next structural mutation (insertion, removal, growth or clear).
///
/// ## Layout
///
/// - Keys: one `Option<K>` per slot; `None` marks an empty slot.
/// - Hashes: one cached `u64` per slot, so growth and removal never call back
///   into the strategy.
/// - Values: one possibly uninitialized `V` per slot, initialized exactly
///   where the key slot is occupied.
///
/// ## Thread safety
///
/// Mutation requires `&mut self`; the table has no interior mutability and no
/// internal locking. Sharing one table between threads requires an external
/// lock.
///
/// ## Example
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use shift_hash::hash_table::HashTable;
/// use shift_hash::strategy::DefaultHashBuilder;
/// use shift_hash::strategy::Natural;
///
/// let mut table: HashTable<&str, u32, Natural<DefaultHashBuilder>> = HashTable::new();
///
/// let (index, inserted) = table.insert("apple", 3).unwrap();
/// assert!(inserted);
/// assert_eq!(table.find(&"apple"), Some(index));
///
/// // Reinsertion never overwrites.
/// let (again, inserted) = table.insert("apple", 9).unwrap();
/// assert_eq!((again, inserted), (index, false));
/// assert_eq!(table.value_at(index), Some(&3));
/// # }
/// ```
pub struct HashTable<K, V, H> {
    keys: Box<[Option<K>]>,
    hashes: Box<[u64]>,
    values: Box<[MaybeUninit<V>]>,

    len: usize,
    load_factor: LoadFactor,
    strategy: H,
}

impl<K, V, H> Debug for HashTable<K, V, H>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Slots<'a, K, V, H>(&'a HashTable<K, V, H>);

        impl<K: Debug, V: Debug, H> Debug for Slots<'_, K, V, H> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut map = f.debug_map();
                for (index, key) in self.0.keys.iter().enumerate() {
                    if let Some(key) = key {
                        // SAFETY: The slot is occupied, so its value is
                        // initialized.
                        let value = unsafe { self.0.values[index].assume_init_ref() };
                        map.entry(&index, &(key, value));
                    }
                }
                map.finish()
            }
        }

        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("load_factor", &self.load_factor.percent())
            .field("slots", &Slots(self))
            .finish()
    }
}

impl<K, V, H> Clone for HashTable<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Clone,
{
    fn clone(&self) -> Self {
        let (keys, _, values) = allocate_storage::<K, V>(self.capacity());
        let mut table = Self {
            keys,
            hashes: self.hashes.clone(),
            values,
            len: 0,
            load_factor: self.load_factor,
            strategy: self.strategy.clone(),
        };

        for (index, key) in self.keys.iter().enumerate() {
            if let Some(key) = key {
                let key = key.clone();
                // SAFETY: The source slot is occupied, so its value is
                // initialized.
                let value = unsafe { self.values[index].assume_init_ref() }.clone();
                table.values[index].write(value);
                table.keys[index] = Some(key);
                table.len += 1;
            }
        }

        table
    }
}

impl<K, V, H> Drop for HashTable<K, V, H> {
    fn drop(&mut self) {
        if core::mem::needs_drop::<V>() && self.len > 0 {
            for (key, value) in self.keys.iter().zip(self.values.iter_mut()) {
                if key.is_some() {
                    // SAFETY: Occupied slots always hold an initialized value.
                    unsafe { value.assume_init_drop() };
                }
            }
        }
    }
}

impl<K, V, H> HashTable<K, V, H> {
    /// Creates an empty table without any slots using `strategy`.
    ///
    /// The first insertion allocates.
    pub fn with_strategy(strategy: H) -> Self {
        let (keys, hashes, values) = allocate_storage(0);
        Self {
            keys,
            hashes,
            values,
            len: 0,
            load_factor: LoadFactor::DEFAULT,
            strategy,
        }
    }

    /// Creates a table with `capacity` slots, rounded up to a power of two.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity cannot be allocated.
    pub fn with_capacity_and_strategy(capacity: usize, strategy: H) -> Self {
        Self::with_config(capacity, LoadFactor::DEFAULT, strategy)
    }

    /// Creates a table with `capacity` slots, rounded up to a power of two,
    /// that grows according to `load_factor`.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity cannot be allocated.
    pub fn with_config(capacity: usize, load_factor: LoadFactor, strategy: H) -> Self {
        Self::try_with_config(capacity, load_factor, strategy).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Fallible version of [`with_config`](Self::with_config).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::Error;
    /// use shift_hash::LoadFactor;
    /// use shift_hash::hash_table::HashTable;
    /// use shift_hash::strategy::Identity;
    ///
    /// let table = HashTable::<&u8, (), _>::try_with_config(5, LoadFactor::DEFAULT, Identity).unwrap();
    /// assert_eq!(table.capacity(), 8);
    ///
    /// let huge = HashTable::<&u8, (), _>::try_with_config(usize::MAX, LoadFactor::DEFAULT, Identity);
    /// assert_eq!(huge.err(), Some(Error::CapacityOverflow));
    /// ```
    pub fn try_with_config(capacity: usize, load_factor: LoadFactor, strategy: H) -> Result<Self> {
        let mut table = Self::with_strategy(strategy);
        table.load_factor = load_factor;
        if capacity > 0 {
            let capacity = capacity
                .checked_next_power_of_two()
                .ok_or(Error::CapacityOverflow)?;
            check_storage::<K, V>(capacity)?;
            table.rehash(capacity);
        }
        Ok(table)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots. Always zero or a power of two.
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Returns the growth policy.
    pub fn load_factor(&self) -> LoadFactor {
        self.load_factor
    }

    /// Returns the strategy bound to this table.
    pub fn strategy(&self) -> &H {
        &self.strategy
    }

    /// Returns the key stored at `index`, or `None` if the slot is empty or
    /// out of range.
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)?.as_ref()
    }

    /// Returns the cached hash of the key stored at `index`.
    pub fn hash_at(&self, index: usize) -> Option<u64> {
        self.key_at(index)?;
        Some(self.hashes[index])
    }

    /// Returns the value paired with the key stored at `index`.
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.key_at(index)?;
        // SAFETY: The slot is occupied, so its value is initialized.
        Some(unsafe { self.values[index].assume_init_ref() })
    }

    /// Returns a mutable reference to the value paired with the key stored at
    /// `index`.
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.key_at(index)?;
        // SAFETY: The slot is occupied, so its value is initialized.
        Some(unsafe { self.values[index].assume_init_mut() })
    }

    /// Removes the entry stored at `index` and returns it, shifting later
    /// members of its cluster back into the freed slot.
    ///
    /// Returns `None` if the slot is empty or out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        let key = self.keys.get_mut(index)?.take()?;
        // SAFETY: The slot was occupied, so its value is initialized. Clearing
        // the key above marks the value as moved out.
        let value = unsafe { self.values[index].assume_init_read() };
        self.len -= 1;
        self.shift_back(index);
        Some((key, value))
    }

    /// Closes the gap at `gap` by moving later entries of the same cluster
    /// backward.
    ///
    /// An entry may fill the gap unless its home slot lies cyclically within
    /// `(gap, index]`; such entries stay put and the walk continues past them
    /// until it reaches an empty slot.
    fn shift_back(&mut self, mut gap: usize) {
        let mask = self.keys.len() - 1;
        let mut index = (gap + 1) & mask;

        while self.keys[index].is_some() {
            let home = self.hashes[index] as usize & mask;
            let displacement = index.wrapping_sub(home) & mask;
            let distance_to_gap = index.wrapping_sub(gap) & mask;

            if displacement >= distance_to_gap {
                self.keys.swap(gap, index);
                self.values.swap(gap, index);
                self.hashes[gap] = self.hashes[index];
                gap = index;
            }

            index = (index + 1) & mask;
        }
    }

    /// Returns the first empty slot at or after the home slot of `hash`.
    ///
    /// The load factor keeps at least one slot empty, so this terminates.
    fn probe_empty(&self, hash: u64) -> usize {
        let mask = self.keys.len() - 1;
        let mut index = hash as usize & mask;
        while self.keys[index].is_some() {
            index = (index + 1) & mask;
        }
        index
    }

    /// Moves every entry into fresh storage of `capacity` slots.
    ///
    /// No strategy or user code runs while entries are in flight; the old
    /// arrays are retired only after every entry has been placed.
    fn rehash(&mut self, capacity: usize) {
        debug_assert!(capacity == 0 || capacity.is_power_of_two());
        debug_assert!(self.len == 0 || self.load_factor.fits(capacity, self.len));

        log::trace!(
            "rehashing table from {} to {} slots with {} entries",
            self.keys.len(),
            capacity,
            self.len
        );

        let (keys, hashes, values) = allocate_storage::<K, V>(capacity);
        let old_keys = core::mem::replace(&mut self.keys, keys);
        let old_hashes = core::mem::replace(&mut self.hashes, hashes);
        let old_values = core::mem::replace(&mut self.values, values);

        for ((key, &hash), value) in old_keys
            .into_vec()
            .into_iter()
            .zip(old_hashes.iter())
            .zip(old_values.iter())
        {
            if let Some(key) = key {
                let index = self.probe_empty(hash);
                // SAFETY: The old slot was occupied, so its value is
                // initialized. The old value array is a `MaybeUninit` slice and
                // is released without dropping its contents.
                self.values[index].write(unsafe { value.assume_init_read() });
                self.keys[index] = Some(key);
                self.hashes[index] = hash;
            }
        }
    }

    /// Replaces the storage with a strictly larger one.
    fn grow(&mut self, capacity: usize) -> Result<()> {
        debug_assert!(capacity > self.keys.len());
        check_storage::<K, V>(capacity)?;
        self.rehash(capacity);
        Ok(())
    }

    /// Grows, if necessary, so that `len` entries fit.
    fn reserve_for(&mut self, len: usize) -> Result<()> {
        if !self.load_factor.fits(self.keys.len(), len) {
            let capacity = self.load_factor.slots_for(len)?;
            self.grow(capacity)?;
        }
        Ok(())
    }

    /// Tries to reserve room for at least `additional` more entries without
    /// further growth.
    ///
    /// On failure the table is left untouched.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        self.reserve_for(required)
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity cannot be allocated.
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional)
            .unwrap_or_else(|err| panic!("{err}"));
    }

    /// Resizes the storage to the smallest capacity holding
    /// `max(expected_len, len)` entries.
    ///
    /// Unlike [`reserve`](Self::reserve) this may also shrink the table. Use it
    /// before bulk insertion when the final size is known.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::hash_table::HashTable;
    /// use shift_hash::strategy::Identity;
    ///
    /// let mut table: HashTable<&u8, (), Identity> = HashTable::with_strategy(Identity);
    /// table.allocate(100).unwrap();
    /// assert_eq!(table.capacity(), 256);
    ///
    /// table.allocate(0).unwrap();
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn allocate(&mut self, expected_len: usize) -> Result<()> {
        let capacity = self.load_factor.slots_for(expected_len.max(self.len))?;
        if capacity != self.keys.len() {
            if capacity > 0 {
                check_storage::<K, V>(capacity)?;
            }
            self.rehash(capacity);
        }
        Ok(())
    }

    /// Shrinks the storage to the smallest capacity holding the current
    /// entries. An empty table releases all of its slots.
    pub fn shrink_to_fit(&mut self) {
        if let Ok(capacity) = self.load_factor.slots_for(self.len)
            && capacity < self.keys.len()
        {
            self.rehash(capacity);
        }
    }

    /// Removes every entry, keeping the allocated slots.
    pub fn clear(&mut self) {
        if self.len == 0 {
            return;
        }

        self.len = 0;
        for (key, value) in self.keys.iter_mut().zip(self.values.iter_mut()) {
            if key.take().is_some() {
                // SAFETY: The slot was occupied, so its value is initialized.
                unsafe { value.assume_init_drop() };
            }
        }
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// Each entry is visited exactly once, in an unspecified order.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        if self.len == 0 {
            return;
        }

        // The scan starts just after an empty slot. No cluster spans that
        // slot, so backward shifts only ever pull unvisited entries into the
        // slot being examined.
        let Some(start) = self.keys.iter().position(Option::is_none) else {
            return;
        };
        let mask = self.keys.len() - 1;

        for offset in 1..=self.keys.len() {
            let index = (start + offset) & mask;
            loop {
                let keep = match &self.keys[index] {
                    None => break,
                    // SAFETY: The slot is occupied, so its value is initialized.
                    Some(key) => f(key, unsafe { self.values[index].assume_init_mut() }),
                };
                if keep {
                    break;
                }
                self.remove_at(index);
            }
        }
    }

    /// Returns an iterator over all entries in storage order.
    ///
    /// The iterator borrows the table, so the table cannot be structurally
    /// modified while it is alive.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.keys.iter(),
            values: self.values.iter(),
            remaining: self.len,
        }
    }

    /// Returns an iterator over all entries in storage order, with mutable
    /// access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            keys: self.keys.iter(),
            values: self.values.iter_mut(),
            remaining: self.len,
        }
    }

    /// Returns an iterator that removes and yields every entry.
    ///
    /// The table is empty once the iterator is dropped, even if it was not
    /// exhausted. Capacity is kept. The slots are moved into the iterator
    /// up front, so a leaked `Drain` leaves the table empty with no slots.
    pub fn drain(&mut self) -> Drain<'_, K, V, H> {
        let (keys, hashes, values) = allocate_storage(0);
        Drain {
            keys: core::mem::replace(&mut self.keys, keys),
            hashes: core::mem::replace(&mut self.hashes, hashes),
            values: core::mem::replace(&mut self.values, values),
            remaining: core::mem::replace(&mut self.len, 0),
            index: 0,
            table: self,
        }
    }

    /// Computes probe-length statistics for the current contents.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_stats(&self) -> ProbeStats {
        let capacity = self.keys.len();
        let mut histogram = Vec::new();
        let mut total = 0usize;

        if capacity > 0 {
            let mask = capacity - 1;
            for (index, key) in self.keys.iter().enumerate() {
                if key.is_some() {
                    let distance = index.wrapping_sub(self.hashes[index] as usize) & mask;
                    if histogram.len() <= distance {
                        histogram.resize(distance + 1, 0);
                    }
                    histogram[distance] += 1;
                    total += distance;
                }
            }
        }

        ProbeStats {
            len: self.len,
            capacity,
            load: if capacity == 0 {
                0.0
            } else {
                self.len as f64 / capacity as f64
            },
            max_probe_length: histogram.len().saturating_sub(1),
            mean_probe_length: if self.len == 0 {
                0.0
            } else {
                total as f64 / self.len as f64
            },
            histogram,
        }
    }
}

impl<K, V, H> HashTable<K, V, H>
where
    H: Default,
{
    /// Creates an empty table without any slots using the default strategy.
    pub fn new() -> Self {
        Self::with_strategy(H::default())
    }

    /// Creates a table with `capacity` slots, rounded up to a power of two,
    /// using the default strategy.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, H::default())
    }
}

impl<K, V, H> Default for HashTable<K, V, H>
where
    H: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> HashTable<K, V, H>
where
    H: HashStrategy<K>,
{
    fn find_hashed(&self, hash: u64, key: &K) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let mask = self.keys.len() - 1;
        let mut index = hash as usize & mask;
        loop {
            match &self.keys[index] {
                None => return None,
                Some(stored) if self.hashes[index] == hash && self.strategy.equals(stored, key) => {
                    return Some(index);
                }
                Some(_) => {}
            }
            index = (index + 1) & mask;
        }
    }

    /// Returns the slot index holding `key`, probing linearly from its home
    /// slot until the key or an empty slot is found.
    pub fn find(&self, key: &K) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.find_hashed(self.strategy.hash(key), key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the stored key and its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let index = self.find(key)?;
        Some((self.key_at(index)?, self.value_at(index)?))
    }

    /// Returns the value paired with `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = self.find(key)?;
        self.value_at(index)
    }

    /// Returns a mutable reference to the value paired with `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.find(key)?;
        self.value_at_mut(index)
    }

    /// Looks up `key` and returns an entry for in-place manipulation.
    ///
    /// A vacant entry is returned only after any growth its insertion would
    /// need, so [`VacantEntry::insert`] cannot fail. On error the table is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKey`] if the strategy does not accept `key`.
    /// - [`Error::CapacityOverflow`] if the key is absent and the table cannot
    ///   grow.
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V, H>> {
        if !self.strategy.accepts(&key) {
            log::debug!("rejecting key reserved as the empty-slot sentinel");
            return Err(Error::InvalidKey);
        }

        let hash = self.strategy.hash(&key);
        if let Some(index) = self.find_hashed(hash, &key) {
            return Ok(Entry::Occupied(OccupiedEntry { table: self, index }));
        }

        self.reserve_for(self.len + 1)?;
        let index = self.probe_empty(hash);
        Ok(Entry::Vacant(VacantEntry {
            table: self,
            index,
            hash,
            key,
        }))
    }

    /// Inserts `key` paired with `value` unless the key is already present.
    ///
    /// Returns the slot index of the key and whether it was newly inserted. An
    /// existing entry is never overwritten; in that case `key` and `value` are
    /// dropped.
    ///
    /// # Errors
    ///
    /// See [`entry`](Self::entry).
    pub fn insert(&mut self, key: K, value: V) -> Result<(usize, bool)> {
        match self.entry(key)? {
            Entry::Occupied(entry) => Ok((entry.index(), false)),
            Entry::Vacant(entry) => {
                let index = entry.index();
                entry.insert(value);
                Ok((index, true))
            }
        }
    }

    /// Removes `key` and returns the stored key and value.
    ///
    /// Removing an absent key is a no-op returning `None`.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.find(key)?;
        self.remove_at(index)
    }
}

impl<K, V, H> IntoIterator for HashTable<K, V, H> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, H>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            index: 0,
        }
    }
}

impl<'a, K, V, H> IntoIterator for &'a HashTable<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single slot, either occupied by the looked-up key or vacant
/// and ready to receive it.
///
/// Created by [`HashTable::entry`].
pub enum Entry<'a, K, V, H> {
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, H>),
    /// The key is absent; the slot it would occupy is reserved.
    Vacant(VacantEntry<'a, K, V, H>),
}

impl<'a, K, V, H> Entry<'a, K, V, H> {
    /// Returns the slot index of the entry.
    pub fn index(&self) -> usize {
        match self {
            Entry::Occupied(entry) => entry.index(),
            Entry::Vacant(entry) => entry.index(),
        }
    }

    /// Returns the key of the entry.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Inserts `default` if vacant and returns the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if vacant and returns the value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value if occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if vacant and returns the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// An occupied slot. Created by [`HashTable::entry`].
pub struct OccupiedEntry<'a, K, V, H> {
    table: &'a mut HashTable<K, V, H>,
    index: usize,
}

impl<'a, K, V, H> OccupiedEntry<'a, K, V, H> {
    /// Returns the slot index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the stored key.
    pub fn key(&self) -> &K {
        match &self.table.keys[self.index] {
            Some(key) => key,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Returns the stored value.
    pub fn get(&self) -> &V {
        // SAFETY: An occupied entry always refers to an occupied slot.
        unsafe { self.table.values[self.index].assume_init_ref() }
    }

    /// Returns the stored value mutably.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: An occupied entry always refers to an occupied slot.
        unsafe { self.table.values[self.index].assume_init_mut() }
    }

    /// Converts the entry into a mutable reference bound to the table.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        // SAFETY: An occupied entry always refers to an occupied slot.
        unsafe { table.values[self.index].assume_init_mut() }
    }

    /// Replaces the stored value, returning the previous one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry, returning its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry, returning its key and value.
    pub fn remove_entry(self) -> (K, V) {
        match self.table.remove_at(self.index) {
            Some(entry) => entry,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }
}

/// A vacant slot reserved for a key. Created by [`HashTable::entry`].
pub struct VacantEntry<'a, K, V, H> {
    table: &'a mut HashTable<K, V, H>,
    index: usize,
    hash: u64,
    key: K,
}

impl<'a, K, V, H> VacantEntry<'a, K, V, H> {
    /// Returns the slot index the key will occupy.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the key that will be inserted.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes back the key without inserting.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Stores the key with `value` and returns the value.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        table.keys[self.index] = Some(self.key);
        table.hashes[self.index] = self.hash;
        table.len += 1;
        table.values[self.index].write(value)
    }
}

/// An iterator over the entries of a [`HashTable`] in storage order.
///
/// Created by [`HashTable::iter`]. The table cannot be structurally modified
/// while the iterator is alive.
pub struct Iter<'a, K, V> {
    keys: core::slice::Iter<'a, Option<K>>,
    values: core::slice::Iter<'a, MaybeUninit<V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let key = self.keys.next()?;
            let value = self.values.next()?;
            if let Some(key) = key {
                self.remaining -= 1;
                // SAFETY: The slot is occupied, so its value is initialized.
                return Some((key, unsafe { value.assume_init_ref() }));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`HashTable`] in storage order.
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, K, V> {
    keys: core::slice::Iter<'a, Option<K>>,
    values: core::slice::IterMut<'a, MaybeUninit<V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            let key = self.keys.next()?;
            let value = self.values.next()?;
            if let Some(key) = key {
                self.remaining -= 1;
                // SAFETY: The slot is occupied, so its value is initialized.
                return Some((key, unsafe { value.assume_init_mut() }));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// A draining iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::drain`].
pub struct Drain<'a, K, V, H> {
    table: &'a mut HashTable<K, V, H>,
    keys: Box<[Option<K>]>,
    hashes: Box<[u64]>,
    values: Box<[MaybeUninit<V>]>,
    remaining: usize,
    index: usize,
}

impl<K, V, H> Iterator for Drain<'_, K, V, H> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = take_next(&mut self.keys, &self.values, &mut self.index)?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, H> Drop for Drain<'_, K, V, H> {
    fn drop(&mut self) {
        for _ in &mut *self {}
        // Every slot is empty now; hand the allocation back to the table.
        core::mem::swap(&mut self.table.keys, &mut self.keys);
        core::mem::swap(&mut self.table.hashes, &mut self.hashes);
        core::mem::swap(&mut self.table.values, &mut self.values);
    }
}

impl<K, V, H> ExactSizeIterator for Drain<'_, K, V, H> {}

impl<K, V, H> FusedIterator for Drain<'_, K, V, H> {}

/// An owning iterator over the entries of a [`HashTable`].
pub struct IntoIter<K, V, H> {
    table: HashTable<K, V, H>,
    index: usize,
}

impl<K, V, H> Iterator for IntoIter<K, V, H> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = take_next(&mut self.table.keys, &self.table.values, &mut self.index)?;
        self.table.len -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<K, V, H> ExactSizeIterator for IntoIter<K, V, H> {}

impl<K, V, H> FusedIterator for IntoIter<K, V, H> {}

/// Moves the next occupied slot at or after `cursor` out of `keys`/`values`.
///
/// Slots are emptied without backward shifting, so the arrays must not be
/// probed until every slot has been taken.
fn take_next<K, V>(
    keys: &mut [Option<K>],
    values: &[MaybeUninit<V>],
    cursor: &mut usize,
) -> Option<(K, V)> {
    while *cursor < keys.len() {
        let index = *cursor;
        *cursor += 1;
        if let Some(key) = keys[index].take() {
            // SAFETY: The slot was occupied, so its value is initialized.
            // Clearing the key marks the value as moved out.
            let value = unsafe { values[index].assume_init_read() };
            return Some((key, value));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::Cell;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::strategy::Natural;

    #[derive(Clone)]
    struct SipHashBuilder {
        k0: u64,
        k1: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap_or(0),
                k1: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type Sip = Natural<SipHashBuilder>;

    /// A key whose hash is chosen by the test, so home slots are known.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Placed {
        home: u64,
        id: u32,
    }

    #[derive(Default, Clone)]
    struct ByHome;

    impl HashStrategy<Placed> for ByHome {
        fn hash(&self, key: &Placed) -> u64 {
            key.home
        }

        fn equals(&self, stored: &Placed, key: &Placed) -> bool {
            stored.id == key.id
        }
    }

    fn placed(home: u64, id: u32) -> Placed {
        Placed { home, id }
    }

    fn assert_consistent<K, V, H: HashStrategy<K>>(table: &HashTable<K, V, H>) {
        let mut occupied = 0;
        for index in 0..table.capacity() {
            if let Some(key) = table.key_at(index) {
                occupied += 1;
                assert_eq!(table.find(key), Some(index));
                assert_eq!(table.hash_at(index), Some(table.strategy().hash(key)));
            }
        }
        assert_eq!(occupied, table.len());
        assert!(table.is_empty() || table.load_factor().fits(table.capacity(), table.len()));
    }

    #[test]
    fn insert_and_find() {
        let mut table: HashTable<u64, u64, Sip> = HashTable::new();
        for k in 0..64u64 {
            let (index, inserted) = table.insert(k, k * 2).unwrap();
            assert!(inserted);
            assert_eq!(table.find(&k), Some(index));
            assert_eq!(table.value_at(index), Some(&(k * 2)), "{table:#?}");
        }
        assert_eq!(table.len(), 64);

        for k in 0..64u64 {
            assert_eq!(table.get(&k), Some(&(k * 2)));
        }
        assert_eq!(table.find(&999), None);
        assert_consistent(&table);
    }

    #[test]
    fn duplicate_insert_does_not_overwrite() {
        let mut table: HashTable<String, i32, Sip> = HashTable::new();
        let (first, inserted) = table.insert("k".to_string(), 7).unwrap();
        assert!(inserted);

        let (second, inserted) = table.insert("k".to_string(), 11).unwrap();
        assert!(!inserted);
        assert_eq!(first, second);
        assert_eq!(table.get(&"k".to_string()), Some(&7));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn find_on_empty_table() {
        let table: HashTable<u64, (), Sip> = HashTable::new();
        assert_eq!(table.capacity(), 0);
        assert_eq!(table.find(&1), None);
        assert!(!table.contains(&1));
    }

    #[test]
    fn grows_on_third_insert_from_four_slots() {
        let lf = LoadFactor::from_percent(75).unwrap();
        let mut table: HashTable<&str, (), Sip> = HashTable::with_config(4, lf, Sip::default());
        assert_eq!(table.capacity(), 4);

        table.insert("a", ()).unwrap();
        table.insert("b", ()).unwrap();
        assert_eq!(table.capacity(), 4);

        table.insert("c", ()).unwrap();
        assert_eq!(table.capacity(), 8);

        for key in ["a", "b", "c"] {
            assert!(table.contains(&key));
        }
        assert_consistent(&table);
    }

    #[test]
    fn growth_preserves_values() {
        let mut table: HashTable<u32, String, Sip> = HashTable::with_capacity(4);
        for k in 0..1000u32 {
            table.insert(k, k.to_string()).unwrap();
        }
        assert!(table.capacity() >= 1024);
        for k in 0..1000u32 {
            assert_eq!(table.get(&k), Some(&k.to_string()));
        }
        assert_consistent(&table);
    }

    #[test]
    fn capacity_rounds_to_power_of_two() {
        let table: HashTable<u32, (), Sip> = HashTable::with_capacity(5);
        assert_eq!(table.capacity(), 8);
        let table: HashTable<u32, (), Sip> = HashTable::with_capacity(0);
        assert_eq!(table.capacity(), 0);
        let table: HashTable<u32, (), Sip> = HashTable::with_capacity(1);
        assert_eq!(table.capacity(), 1);
    }

    #[test]
    fn with_config_overflow() {
        let result = HashTable::<u64, u64, Sip>::try_with_config(
            usize::MAX / 2,
            LoadFactor::DEFAULT,
            Sip::default(),
        );
        assert_eq!(result.err(), Some(Error::CapacityOverflow));
    }

    #[test]
    fn remove_head_of_collision_chain() {
        let mut table: HashTable<Placed, char, ByHome> = HashTable::with_capacity(16);
        let (a, b, c) = (placed(7, 1), placed(7, 2), placed(7, 3));
        table.insert(a, 'a').unwrap();
        table.insert(b, 'b').unwrap();
        table.insert(c, 'c').unwrap();
        assert_eq!(table.find(&a), Some(7));
        assert_eq!(table.find(&b), Some(8));
        assert_eq!(table.find(&c), Some(9));

        assert_eq!(table.remove(&a), Some((a, 'a')));
        assert_eq!(table.find(&b), Some(7));
        assert_eq!(table.find(&c), Some(8));
        assert_eq!(table.key_at(9), None);
        assert_eq!(table.get(&b), Some(&'b'));
        assert_eq!(table.get(&c), Some(&'c'));
        assert_consistent(&table);
    }

    #[test]
    fn shift_skips_entries_at_home() {
        let mut table: HashTable<Placed, (), ByHome> = HashTable::with_capacity(16);
        let a = placed(7, 1);
        let x = placed(8, 2);
        let b = placed(7, 3);
        table.insert(a, ()).unwrap();
        table.insert(x, ()).unwrap();
        table.insert(b, ()).unwrap();
        assert_eq!(table.find(&b), Some(9));

        table.remove(&a);
        assert_eq!(table.find(&b), Some(7));
        assert_eq!(table.find(&x), Some(8));
        assert_eq!(table.key_at(9), None);
        assert_consistent(&table);
    }

    #[test]
    fn shift_wraps_around() {
        let mut table: HashTable<Placed, u8, ByHome> = HashTable::with_capacity(16);
        let a = placed(15, 1);
        let b = placed(15, 2);
        let c = placed(31, 3);
        table.insert(a, 1).unwrap();
        table.insert(b, 2).unwrap();
        table.insert(c, 3).unwrap();
        assert_eq!(table.find(&b), Some(0));
        assert_eq!(table.find(&c), Some(1));

        table.remove(&a);
        assert_eq!(table.find(&b), Some(15));
        assert_eq!(table.find(&c), Some(0));
        assert_eq!(table.get(&c), Some(&3));
        assert_consistent(&table);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut table: HashTable<u64, u64, Sip> = HashTable::new();
        for k in 0..20 {
            table.insert(k, k).unwrap();
        }
        let before: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();

        assert_eq!(table.remove(&100), None);
        assert_eq!(table.remove_at(usize::MAX), None);

        let after: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
        assert_eq!(table.len(), 20);
    }

    #[test]
    fn churn_keeps_probes_short() {
        let mut table: HashTable<u64, (), Sip> = HashTable::with_capacity(256);
        for k in 0..150u64 {
            table.insert(k, ()).unwrap();
        }
        let capacity = table.capacity();

        for round in 0..50u64 {
            for k in 0..150u64 {
                table.remove(&(round * 150 + k));
                table.insert((round + 1) * 150 + k, ()).unwrap();
            }
        }

        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.len(), 150);
        let stats = table.probe_stats();
        assert_eq!(stats.histogram.iter().sum::<usize>(), 150);
        assert!(stats.max_probe_length < 64, "{stats:?}");
        assert_consistent(&table);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table: HashTable<u64, String, Sip> = HashTable::new();
        for k in 0..100 {
            table.insert(k, k.to_string()).unwrap();
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.get(&5), None);

        table.insert(5, "five".to_string()).unwrap();
        assert_eq!(table.get(&5), Some(&"five".to_string()));
    }

    #[test]
    fn leaked_drain_leaves_table_usable() {
        let mut table = HashTable::with_strategy(ByHome);
        for id in 0..200u32 {
            table.insert(placed(u64::from(id % 16), id), id).unwrap();
        }
        let capacity = table.capacity();

        let mut drain = table.drain();
        assert_eq!(drain.len(), 200);
        assert!(drain.next().is_some());
        assert_eq!(drain.len(), 199);
        core::mem::forget(drain);

        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);
        assert_consistent(&table);

        for id in 0..200u32 {
            let (_, inserted) = table.insert(placed(u64::from(id % 16), id), id).unwrap();
            assert!(inserted);
        }
        assert_eq!(table.len(), 200);
        assert_eq!(table.capacity(), capacity);
        assert_consistent(&table);

        let mut drain = table.drain();
        drop(drain.next());
        drop(drain);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_consistent(&table);
    }

    #[test]
    fn drops_every_value_once() {
        struct Counted<'a>(&'a Cell<usize>);

        impl Drop for Counted<'_> {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Cell::new(0);
        {
            let mut table: HashTable<u32, Counted<'_>, Sip> = HashTable::new();
            for k in 0..40 {
                table.insert(k, Counted(&drops)).unwrap();
            }
            // Rejected duplicate drops its value immediately.
            table.insert(0, Counted(&drops)).unwrap();
            assert_eq!(drops.get(), 1);

            drop(table.remove(&1));
            assert_eq!(drops.get(), 2);

            table.retain(|k, _| k % 2 == 0);
            assert_eq!(drops.get(), 2 + 19);

            let mut drain = table.drain();
            drop(drain.next());
            drop(drain);
            assert_eq!(drops.get(), 41);
            assert!(table.is_empty());

            for k in 0..10 {
                table.insert(k, Counted(&drops)).unwrap();
            }
            table.clear();
            assert_eq!(drops.get(), 51);

            for k in 0..5 {
                table.insert(k, Counted(&drops)).unwrap();
            }
        }
        assert_eq!(drops.get(), 56);
    }

    #[test]
    fn retain_visits_each_entry_once() {
        let mut table: HashTable<Placed, u32, ByHome> = HashTable::with_capacity(16);
        // A cluster wrapping from the end of the array to its start.
        for id in 0..6u32 {
            table.insert(placed(13, id), 0).unwrap();
        }
        table.insert(placed(1, 100), 0).unwrap();

        let mut visits = 0;
        table.retain(|key, count| {
            *count += 1;
            visits += 1;
            key.id % 2 == 1
        });
        assert_eq!(visits, 7);
        assert_eq!(table.len(), 3);
        for (key, count) in table.iter() {
            assert_eq!(key.id % 2, 1);
            assert_eq!(*count, 1);
        }
        assert_consistent(&table);
    }

    #[test]
    fn entry_api() {
        let mut table: HashTable<&str, u32, Sip> = HashTable::new();
        *table.entry("a").unwrap().or_insert(0) += 1;
        *table.entry("a").unwrap().or_insert(0) += 1;
        *table.entry("b").unwrap().or_default() += 5;
        assert_eq!(table.get(&"a"), Some(&2));
        assert_eq!(table.get(&"b"), Some(&5));

        match table.entry("a").unwrap() {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &"a");
                assert_eq!(entry.insert(10), 2);
                assert_eq!(entry.remove_entry(), ("a", 10));
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }
        assert!(!table.contains(&"a"));

        match table.entry("z").unwrap() {
            Entry::Vacant(entry) => {
                assert_eq!(entry.into_key(), "z");
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(table.len(), 1);
        assert_consistent(&table);
    }

    #[test]
    fn rejected_key_leaves_table_untouched() {
        let mut table: HashTable<*const u8, (), crate::strategy::Identity> =
            HashTable::with_strategy(crate::strategy::Identity);
        assert_eq!(
            table.insert(core::ptr::null(), ()).err(),
            Some(Error::InvalidKey)
        );
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), 0);
    }

    #[test]
    fn allocate_and_shrink() {
        let mut table: HashTable<u64, u64, Sip> = HashTable::new();
        table.allocate(100).unwrap();
        let capacity = table.capacity();
        assert_eq!(capacity, 256);

        for k in 0..100 {
            table.insert(k, k).unwrap();
        }
        assert_eq!(table.capacity(), capacity);

        for k in 10..100 {
            table.remove(&k);
        }
        table.shrink_to_fit();
        assert_eq!(table.capacity(), 16);
        for k in 0..10 {
            assert_eq!(table.get(&k), Some(&k));
        }

        table.allocate(0).unwrap();
        assert_eq!(table.capacity(), 16);

        table.clear();
        table.shrink_to_fit();
        assert_eq!(table.capacity(), 0);
        table.insert(1, 1).unwrap();
        assert_eq!(table.capacity(), 4);
    }

    #[test]
    fn reserve_avoids_growth() {
        let mut table: HashTable<u64, (), Sip> = HashTable::new();
        table.reserve(500);
        let capacity = table.capacity();
        for k in 0..500 {
            table.insert(k, ()).unwrap();
        }
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
        assert_eq!(table.len(), 500);
    }

    #[test]
    fn iteration_is_in_storage_order() {
        let mut table: HashTable<Placed, u32, ByHome> = HashTable::with_capacity(16);
        for (home, id) in [(9, 1), (2, 2), (14, 3), (2, 4)] {
            table.insert(placed(home, id), id).unwrap();
        }
        let ids: Vec<u32> = table.iter().map(|(k, _)| k.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
        assert_eq!(table.iter().len(), 4);

        for (_, value) in table.iter_mut() {
            *value *= 10;
        }
        let values: Vec<u32> = (&table).into_iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![20, 40, 10, 30]);

        let owned: Vec<(Placed, u32)> = table.into_iter().collect();
        assert_eq!(owned.len(), 4);
    }

    #[test]
    fn clone_is_independent() {
        let mut table: HashTable<String, Rc<u32>, Sip> = HashTable::new();
        for k in 0..30u32 {
            table.insert(k.to_string(), Rc::new(k)).unwrap();
        }
        let mut copy = table.clone();
        assert_eq!(copy.len(), 30);
        copy.remove(&"3".to_string());
        assert_eq!(copy.len(), 29);
        assert_eq!(table.len(), 30);
        assert_eq!(table.get(&"3".to_string()).map(|v| **v), Some(3));
        assert_consistent(&copy);

        let empty: HashTable<String, u8, Sip> = HashTable::new();
        assert!(empty.clone().is_empty());
    }

    #[test]
    fn debug_output() {
        let mut table: HashTable<Placed, u8, ByHome> = HashTable::with_capacity(4);
        table.insert(placed(1, 9), 3).unwrap();
        let output = alloc::format!("{table:?}");
        assert!(output.contains("len: 1"));
        assert!(output.contains("capacity: 4"));
    }

    #[cfg(feature = "std")]
    #[test]
    fn random_operations_match_model() {
        use rand::Rng;
        use rand::SeedableRng;
        use rand::rngs::SmallRng;

        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut table: HashTable<u16, u32, Sip> = HashTable::new();
        let mut model = std::collections::HashMap::new();

        for step in 0..20_000u32 {
            let key: u16 = rng.random_range(0..512);
            if rng.random_bool(0.55) {
                let inserted = table.insert(key, step).unwrap().1;
                assert_eq!(inserted, !model.contains_key(&key));
                model.entry(key).or_insert(step);
            } else {
                assert_eq!(table.remove(&key).map(|(_, v)| v), model.remove(&key));
            }
            assert_eq!(table.len(), model.len());
        }

        for key in 0..512u16 {
            assert_eq!(table.get(&key), model.get(&key));
        }
        assert_consistent(&table);
    }
}
