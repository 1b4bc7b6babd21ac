use crate::error::Result;
use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use crate::strategy::Identity;
use crate::strategy::IdentityKey;

/// A [`HashMap`] keyed by address.
pub type IdentityMap<K, V> = HashMap<K, V, Identity>;

/// A [`HashSet`] keyed by address.
pub type IdentitySet<K> = HashSet<K, Identity>;

impl<K: IdentityKey, V> HashMap<K, V, Identity> {
    /// Copies the entries of another identity map, sizing storage once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::IdentityMap;
    ///
    /// let (a, b) = (String::from("x"), String::from("x"));
    /// let mut map = IdentityMap::new();
    /// map.insert(&a, 1);
    /// map.insert(&b, 2);
    ///
    /// let copy = IdentityMap::from_map(&map).unwrap();
    /// assert_eq!(copy.len(), 2);
    /// assert_eq!(copy.get(&&b), Some(&2));
    /// ```
    pub fn from_map(source: &HashMap<K, V, Identity>) -> Result<Self>
    where
        K: Clone,
        V: Clone,
    {
        Self::from_entries(source.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Builds a map from an iterator of known length, allocating storage for
    /// all of its entries up front.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`](crate::Error::InvalidKey) if a key is null.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let entries = entries.into_iter();
        let mut map = Self::new();
        map.allocate(entries.len())?;
        for (key, value) in entries {
            map.try_insert(key, value)?;
        }
        Ok(map)
    }
}

impl<K: IdentityKey> HashSet<K, Identity> {
    /// Copies the keys of another identity set, sizing storage once.
    pub fn from_set(source: &HashSet<K, Identity>) -> Result<Self>
    where
        K: Clone,
    {
        Self::from_collection(source.iter().cloned())
    }

    /// Builds a set from a collection of known length, allocating storage for
    /// all of its keys up front.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKey`](crate::Error::InvalidKey) if a key is null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_hash::IdentitySet;
    ///
    /// let items = [String::from("a"), String::from("a")];
    /// let set = IdentitySet::from_collection(items.iter()).unwrap();
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&&items[0]));
    /// ```
    pub fn from_collection<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        I::IntoIter: ExactSizeIterator,
    {
        let keys = keys.into_iter();
        let mut set = Self::new();
        set.allocate(keys.len())?;
        for key in keys {
            set.try_insert(key)?;
        }
        Ok(set)
    }
}
