//! Structural fragment hashes.
//!
//! A [`FragmentHash`] identifies everything that influences how a fragment
//! renders: its type name, its own fields, and the hashes of its children. Two
//! fragments with the same hash compile to the same text for a given
//! template, which is what makes the hash usable as a cache key.
//!
//! The digest is 128 bits wide (two independently keyed SipHash states fed the
//! same canonical byte stream). Every variable-length field is length-prefixed
//! so that adjacent fields can't alias (`("ab", "c")` vs `("a", "bc")`).

use std::fmt;
use std::hash::{DefaultHasher, Hasher};
use std::sync::{Arc, OnceLock};

/// The structural identity of a fragment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentHash(Arc<str>);

impl FragmentHash {
    /// Start hashing a fragment of the given type.
    pub fn builder(type_name: &'static str) -> HashBuilder {
        HashBuilder::new(type_name)
    }

    /// The hash as a string (`<type>:<32 hex digits>`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fragment type name this hash was computed for.
    pub fn type_name(&self) -> &str {
        self.0.split_once(':').map_or(&self.0, |(name, _)| name)
    }
}

impl fmt::Debug for FragmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FragmentHash").field(&&*self.0).finish()
    }
}

impl fmt::Display for FragmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates the canonical encoding of a fragment.
pub struct HashBuilder {
    type_name: &'static str,
    lo: DefaultHasher,
    hi: DefaultHasher,
}

impl HashBuilder {
    fn new(type_name: &'static str) -> Self {
        let lo = DefaultHasher::new();
        let mut hi = DefaultHasher::new();
        // Different initial state for the high half.
        hi.write_u64(0x9e37_79b9_7f4a_7c15);
        let mut b = Self { type_name, lo, hi };
        b.str(type_name);
        b
    }

    fn write(&mut self, bytes: &[u8]) {
        self.lo.write(bytes);
        self.hi.write(bytes);
    }

    /// A discriminant byte (enum variant, optional-field presence, ...).
    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.write(&[tag]);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.tag(u8::from(v))
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.write(&v.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.u64(v.len() as u64);
        self.write(v);
        self
    }

    pub fn str(&mut self, v: &str) -> &mut Self {
        self.bytes(v.as_bytes())
    }

    /// Mix in a child fragment's hash.
    pub fn child(&mut self, hash: &FragmentHash) -> &mut Self {
        self.str(hash.as_str())
    }

    /// Mix in an optional child; absence and presence hash differently.
    pub fn opt_child(&mut self, hash: Option<&FragmentHash>) -> &mut Self {
        match hash {
            Some(h) => self.tag(1).child(h),
            None => self.tag(0),
        }
    }

    /// Mix in a list of children (length-prefixed).
    pub fn children<'a>(&mut self, hashes: impl IntoIterator<Item = &'a FragmentHash>) -> &mut Self {
        let hashes: Vec<&FragmentHash> = hashes.into_iter().collect();
        self.u64(hashes.len() as u64);
        for h in hashes {
            self.child(h);
        }
        self
    }

    /// Finish the digest.
    pub fn finish(&self) -> FragmentHash {
        let s = format!(
            "{}:{:016x}{:016x}",
            self.type_name,
            self.hi.finish(),
            self.lo.finish()
        );
        FragmentHash(Arc::from(s))
    }
}

/// A write-once cell holding a fragment's memoized hash.
///
/// Fragments are immutable, so the hash is computed at most once per value
/// and never invalidated. Concurrent first reads may both compute it; only one
/// write is stored and both results are identical.
#[derive(Default)]
pub struct HashCell(OnceLock<FragmentHash>);

impl HashCell {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Return the memoized hash, computing it on first use.
    pub fn get_or_init(&self, f: impl FnOnce() -> FragmentHash) -> &FragmentHash {
        self.0.get_or_init(f)
    }

    /// Check whether the hash has been computed yet.
    pub fn is_computed(&self) -> bool {
        self.0.get().is_some()
    }
}

impl Clone for HashCell {
    // A clone has identical content, so a computed hash stays valid.
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some(h) = self.0.get() {
            let _ = cell.set(h.clone());
        }
        Self(cell)
    }
}

impl fmt::Debug for HashCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(h) => write!(f, "HashCell({h})"),
            None => f.write_str("HashCell(<pending>)"),
        }
    }
}

// Content equality ignores memoization state.
impl PartialEq for HashCell {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
