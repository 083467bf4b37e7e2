use crate::encrypt::PdfEncrypt;
use crate::error::{PdfError, Result};
use crate::reference::Reference;
use crate::variant::Variant;
use crate::writer::WriteMode;

/// An ordered sequence of [`Variant`] values.
///
/// Mutating methods require the array itself to be mutable (see
/// [`Array::set_immutable`]) and mark it dirty.
#[derive(Debug, Clone, Default)]
pub struct Array {
    items: Vec<Variant>,
    dirty: bool,
    immutable: bool,
}

impl PartialEq for Array {
    /// Compares content only; the `dirty`/`immutable` bookkeeping bits are
    /// not part of an array's logical value.
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the element at `index`, without resolving references.
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.items.get(index)
    }

    /// Resolve the element at `index` against `collection` if it is a
    /// [`Reference`](crate::Reference), otherwise return it directly.
    ///
    /// Grounded on the `find_at` contract in §4.4: array elements that are
    /// references are transparently dereferenced through the owning
    /// collection.
    pub fn find_at<'a>(
        &'a self,
        index: usize,
        collection: &'a crate::collection::ObjectCollection,
    ) -> Result<Option<&'a Variant>> {
        let Some(value) = self.items.get(index) else { return Ok(None) };
        match value.as_reference() {
            Ok(reference) => Ok(collection.resolve(reference).map(|obj| obj.value())),
            Err(_) => Ok(Some(value)),
        }
    }

    /// Append a value to the end of the array.
    pub fn append(&mut self, value: Variant) -> Result<()> {
        self.check_mutable()?;
        self.items.push(value);
        self.dirty = true;
        Ok(())
    }

    /// Insert a value at `index`, shifting later elements up.
    pub fn insert_at(&mut self, index: usize, value: Variant) -> Result<()> {
        self.check_mutable()?;
        if index > self.items.len() {
            return Err(PdfError::ValueOutOfRange);
        }
        self.items.insert(index, value);
        self.dirty = true;
        Ok(())
    }

    /// Remove and return the value at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Variant> {
        self.check_mutable()?;
        if index >= self.items.len() {
            return Err(PdfError::ValueOutOfRange);
        }
        self.dirty = true;
        Ok(self.items.remove(index))
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.items.iter()
    }

    /// Whether this array or any descendant has been mutated since the
    /// last time `set_dirty(false)` was called on it.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.items.iter().any(Variant::is_dirty)
    }

    /// Set the dirty bit. Clearing it (`false`) clears every descendant's
    /// dirty bit too, per invariant I2.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        if !dirty {
            for item in &mut self.items {
                item.set_dirty(false);
            }
        }
    }

    /// Whether this array is currently immutable.
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Mark immutable (propagating to every element currently held) or
    /// clear the flag on this array alone.
    pub fn set_immutable(&mut self, immutable: bool) {
        self.immutable = immutable;
        if immutable {
            for item in &mut self.items {
                item.set_immutable(true);
            }
        }
    }

    fn check_mutable(&self) -> Result<()> {
        if self.immutable {
            #[cfg(feature = "log")]
            log::debug!("attempted mutation of immutable array");
            Err(PdfError::ChangeOnImmutable)
        } else {
            Ok(())
        }
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>, mode: WriteMode, reference: Reference, encrypt: Option<&dyn PdfEncrypt>) {
        // A single separating space between every element, regardless of
        // mode: several kinds (`Reference`'s trailing `R`, back-to-back
        // numbers) would otherwise fuse with whatever follows.
        buf.push(b'[');
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            item.write(buf, mode, reference, encrypt);
        }
        buf.push(b']');
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Variant> for Array {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect(), dirty: false, immutable: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_sets_dirty() {
        let mut array = Array::new();
        assert!(!array.is_dirty());
        array.append(Variant::integer(1)).unwrap();
        assert!(array.is_dirty());
    }

    #[test]
    fn immutable_array_rejects_mutation() {
        let mut array = Array::new();
        array.set_immutable(true);
        assert_eq!(array.append(Variant::integer(1)), Err(PdfError::ChangeOnImmutable));
    }

    #[test]
    fn clearing_dirty_clears_descendants() {
        let mut inner = Array::new();
        inner.append(Variant::integer(1)).unwrap();
        let mut outer = Array::new();
        outer.append(Variant::array(inner)).unwrap();
        assert!(outer.is_dirty());
        outer.set_dirty(false);
        assert!(!outer.is_dirty());
    }

    #[test]
    fn immutable_propagates_to_current_children() {
        let mut inner = Array::new();
        inner.append(Variant::integer(1)).unwrap();
        let mut outer = Array::new();
        outer.append(Variant::array(inner)).unwrap();
        outer.set_immutable(true);
        let child = outer.get(0).unwrap().as_array().unwrap();
        assert!(child.is_immutable());
    }
}
