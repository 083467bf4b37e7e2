use std::collections::BTreeMap;

use crate::encrypt::PdfEncrypt;
use crate::error::{PdfError, Result};
use crate::name::Name;
use crate::reference::Reference;
use crate::variant::Variant;
use crate::writer::WriteMode;

/// An ordered mapping from [`Name`] to [`Variant`].
///
/// Keys are kept in sorted byte order (`BTreeMap` provides this natively),
/// which gives both deterministic iteration and O(log n) lookup without
/// extra bookkeeping, matching §3's `Dictionary` contract.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: BTreeMap<Name, Variant>,
    dirty: bool,
    immutable: bool,
}

impl PartialEq for Dictionary {
    /// Lockstep comparison of the (sorted) entry sets only; `dirty` and
    /// `immutable` are bookkeeping, not logical value (§4.4).
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `value` under `name`, replacing any existing value. Returns
    /// a mutable reference to the stored value.
    pub fn add_or_replace(&mut self, name: impl Into<Name>, value: Variant) -> Result<&mut Variant> {
        self.check_mutable()?;
        self.dirty = true;
        let name = name.into();
        self.entries.insert(name.clone(), value);
        Ok(self.entries.get_mut(&name).expect("just inserted"))
    }

    /// Remove `name`, returning whether it was present.
    pub fn remove(&mut self, name: &Name) -> Result<bool> {
        self.check_mutable()?;
        let existed = self.entries.remove(name).is_some();
        if existed {
            self.dirty = true;
        }
        Ok(existed)
    }

    /// Borrow the value stored under `name`, without resolving references.
    pub fn get(&self, name: &Name) -> Option<&Variant> {
        self.entries.get(name)
    }

    /// Resolve the value under `name` against `collection` if it is a
    /// reference, otherwise return it directly.
    pub fn find<'a>(
        &'a self,
        name: &Name,
        collection: &'a crate::collection::ObjectCollection,
    ) -> Option<&'a Variant> {
        let value = self.entries.get(name)?;
        match value.as_reference() {
            Ok(reference) => collection.resolve(reference).map(|obj| obj.value()),
            Err(_) => Some(value),
        }
    }

    /// Like [`Dictionary::find`], but if `name` is absent, walks the
    /// `/Parent` chain (resolved through `collection`) looking for it.
    /// Used for page-tree attribute inheritance.
    pub fn find_with_parent<'a>(
        &'a self,
        name: &Name,
        collection: &'a crate::collection::ObjectCollection,
    ) -> Option<&'a Variant> {
        if let Some(found) = self.find(name, collection) {
            return Some(found);
        }

        let parent_key = Name::from_str("Parent");
        let mut current = self.find(&parent_key, collection)?.as_dictionary().ok()?;
        loop {
            if let Some(found) = current.find(name, collection) {
                return Some(found);
            }
            current = current.find(&parent_key, collection)?.as_dictionary().ok()?;
        }
    }

    /// Iterate over entries in sorted key order, with `/Type` (if present)
    /// emitted first — matches the serialization order in §4.4, so callers
    /// that want write order without writing can reuse it.
    pub fn iter_write_order(&self) -> impl Iterator<Item = (&Name, &Variant)> {
        let type_key = Name::from_str("Type");
        let type_entry = self.entries.get_key_value(&type_key);
        let rest = self.entries.iter().filter(move |(k, _)| **k != type_key);
        type_entry.into_iter().chain(rest)
    }

    /// Whether this dictionary or any descendant has been mutated since
    /// the last `set_dirty(false)`.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.entries.values().any(Variant::is_dirty)
    }

    /// Set the dirty bit; clearing it clears every descendant's too.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        if !dirty {
            for value in self.entries.values_mut() {
                value.set_dirty(false);
            }
        }
    }

    /// Whether this dictionary is currently immutable.
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Mark immutable (propagating to every value currently held) or
    /// clear the flag on this dictionary alone.
    pub fn set_immutable(&mut self, immutable: bool) {
        self.immutable = immutable;
        if immutable {
            for value in self.entries.values_mut() {
                value.set_immutable(true);
            }
        }
    }

    fn check_mutable(&self) -> Result<()> {
        if self.immutable {
            #[cfg(feature = "log")]
            log::debug!("attempted mutation of immutable dictionary");
            Err(PdfError::ChangeOnImmutable)
        } else {
            Ok(())
        }
    }

    pub(crate) fn write(
        &self,
        buf: &mut Vec<u8>,
        mode: WriteMode,
        reference: Reference,
        encrypt: Option<&dyn PdfEncrypt>,
        key_stop: Option<&Name>,
    ) {
        buf.extend_from_slice(b"<<");
        for (name, value) in self.iter_write_order() {
            if let Some(stop) = key_stop {
                if name == stop {
                    break;
                }
            }
            if mode.is_clean() {
                buf.push(b'\n');
            }
            name.write(buf);
            if mode.is_clean() || value.starts_ambiguous() {
                buf.push(b' ');
            }
            value.write(buf, mode, reference, encrypt);
        }
        if mode.is_clean() && !self.entries.is_empty() {
            buf.push(b'\n');
        }
        buf.extend_from_slice(b">>");
    }
}

impl FromIterator<(Name, Variant)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (Name, Variant)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect(), dirty: false, immutable: false }
    }
}
