use alloc::boxed::Box;
use alloc::rc::Rc;
#[cfg(target_has_atomic = "ptr")]
use alloc::sync::Arc;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ptr::NonNull;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used by [`Natural`] when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used by [`Natural`] when none is given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

/// A hash and equality policy for keys of type `K`.
///
/// Implementations must be consistent: keys that are equal under
/// [`equals`](Self::equals) must produce the same [`hash`](Self::hash).
/// Both methods must be pure. A table never mutates its strategy, and the
/// strategy bound to a table cannot change for the table's lifetime.
///
/// # Examples
///
/// A case-insensitive strategy for ASCII strings:
///
/// ```rust
/// use shift_hash::HashSet;
/// use shift_hash::HashStrategy;
///
/// #[derive(Default)]
/// struct AsciiCaseless;
///
/// impl HashStrategy<String> for AsciiCaseless {
///     fn hash(&self, key: &String) -> u64 {
///         key.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
///             (h ^ b.to_ascii_lowercase() as u64).wrapping_mul(0x0100_0000_01b3)
///         })
///     }
///
///     fn equals(&self, stored: &String, key: &String) -> bool {
///         stored.eq_ignore_ascii_case(key)
///     }
/// }
///
/// let mut set = HashSet::with_strategy(AsciiCaseless);
/// assert!(set.insert("Hello".to_string()));
/// assert!(!set.insert("HELLO".to_string()));
/// assert_eq!(set.len(), 1);
/// ```
pub trait HashStrategy<K> {
    /// Hashes `key`.
    fn hash(&self, key: &K) -> u64;

    /// Compares a key already stored in the table with a probe key.
    ///
    /// Only called when the cached hash of `stored` equals the hash of `key`.
    fn equals(&self, stored: &K, key: &K) -> bool;

    /// Returns `false` for keys reserved as the empty-slot sentinel.
    ///
    /// Inserting such a key fails with
    /// [`Error::InvalidKey`](crate::Error::InvalidKey).
    fn accepts(&self, key: &K) -> bool {
        let _ = key;
        true
    }
}

/// Uses the key's own [`Hash`] and [`Eq`] implementations, hashing through a
/// [`BuildHasher`].
#[derive(Debug, Clone, Default)]
pub struct Natural<S> {
    hash_builder: S,
}

impl<S> Natural<S> {
    /// Creates a natural strategy hashing with `hash_builder`.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns the wrapped hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> HashStrategy<K> for Natural<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn equals(&self, stored: &K, key: &K) -> bool {
        stored == key
    }
}

/// Compares keys by the address they refer to, ignoring any `Hash` or `Eq`
/// implementation of the pointee.
///
/// Two keys are the same under this strategy only if they point at the same
/// object. The address of a key must stay stable for as long as the key is
/// stored, which every [`IdentityKey`] implementor guarantees while the
/// pointee is alive. The null address is reserved and rejected.
///
/// Distinct allocations of a zero-sized type, such as two `Box<()>`, share one
/// dangling address and therefore collapse into a single key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Keys with a stable address usable by the [`Identity`] strategy.
///
/// For unsized pointees only the data address takes part; metadata such as
/// slice length or vtable is ignored. Zero-sized pointees do not get unique
/// addresses, so boxes or `Rc`s of zero-sized values are not told apart.
pub trait IdentityKey {
    /// The address this key refers to.
    fn address(&self) -> usize;
}

impl<T: ?Sized> IdentityKey for &T {
    #[inline]
    fn address(&self) -> usize {
        (*self as *const T).cast::<()>().addr()
    }
}

impl<T: ?Sized> IdentityKey for &mut T {
    #[inline]
    fn address(&self) -> usize {
        (&**self as *const T).cast::<()>().addr()
    }
}

impl<T: ?Sized> IdentityKey for *const T {
    #[inline]
    fn address(&self) -> usize {
        self.cast::<()>().addr()
    }
}

impl<T: ?Sized> IdentityKey for *mut T {
    #[inline]
    fn address(&self) -> usize {
        self.cast::<()>().addr()
    }
}

impl<T: ?Sized> IdentityKey for NonNull<T> {
    #[inline]
    fn address(&self) -> usize {
        self.as_ptr().cast::<()>().addr()
    }
}

impl<T: ?Sized> IdentityKey for Box<T> {
    #[inline]
    fn address(&self) -> usize {
        (&**self as *const T).cast::<()>().addr()
    }
}

impl<T: ?Sized> IdentityKey for Rc<T> {
    #[inline]
    fn address(&self) -> usize {
        Rc::as_ptr(self).cast::<()>().addr()
    }
}

#[cfg(target_has_atomic = "ptr")]
impl<T: ?Sized> IdentityKey for Arc<T> {
    #[inline]
    fn address(&self) -> usize {
        Arc::as_ptr(self).cast::<()>().addr()
    }
}

/// Spreads an address over all 64 bits with the murmur3 `fmix64` finalizer.
///
/// Addresses are aligned, so their low bits carry little information. Every
/// input bit must reach the bits the slot mask keeps.
#[inline(always)]
fn mix_address(address: usize) -> u64 {
    let mut h = address as u64;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

impl<K: IdentityKey> HashStrategy<K> for Identity {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        mix_address(key.address())
    }

    #[inline]
    fn equals(&self, stored: &K, key: &K) -> bool {
        stored.address() == key.address()
    }

    #[inline]
    fn accepts(&self, key: &K) -> bool {
        key.address() != 0
    }
}
