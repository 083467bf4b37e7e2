use std::sync::{Mutex, OnceLock};
use std::thread::{self, ThreadId};

use crate::array::Array;
use crate::dict::Dictionary;
use crate::encrypt::PdfEncrypt;
use crate::error::{PdfError, Result};
use crate::name::Name;
use crate::reference::Reference;
use crate::string::PdfString;
use crate::writer::WriteMode;

/// The kind tag of a loaded [`Variant`].
///
/// Eleven kinds exist per the data model; the source's twelfth `Unknown`
/// kind is omitted here — a `Variant` handle is always one of these, or
/// carries an unresolved delayed-load hook that has not produced one yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Integer,
    Real,
    String,
    HexString,
    Name,
    Array,
    Dictionary,
    Reference,
    RawData,
}

#[derive(Debug, Clone, PartialEq)]
enum Data {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    HexString(PdfString),
    Name(Name),
    Array(Array),
    Dictionary(Dictionary),
    Reference(Reference),
    RawData(Vec<u8>),
}

impl Data {
    fn kind(&self) -> Kind {
        match self {
            Data::Null => Kind::Null,
            Data::Bool(_) => Kind::Bool,
            Data::Integer(_) => Kind::Integer,
            Data::Real(_) => Kind::Real,
            Data::String(_) => Kind::String,
            Data::HexString(_) => Kind::HexString,
            Data::Name(_) => Kind::Name,
            Data::Array(_) => Kind::Array,
            Data::Dictionary(_) => Kind::Dictionary,
            Data::Reference(_) => Kind::Reference,
            Data::RawData(_) => Kind::RawData,
        }
    }
}

type LoadHook = Box<dyn FnOnce() -> Result<Data> + Send>;

/// At-most-once materialization of a variant's content from a hook.
///
/// Safe to call `get` from multiple threads: the first caller to take the
/// hook runs it while every other caller blocks on `hook` until it is
/// done, then observes the cached result. A caller that re-enters `get`
/// from *inside* the hook on the same thread (forbidden reentrancy, §5)
/// is detected via `loader` before it would otherwise deadlock on the
/// already-held mutex.
struct DelayedLoad {
    result: OnceLock<std::result::Result<Data, PdfError>>,
    hook: Mutex<Option<LoadHook>>,
    loader: Mutex<Option<ThreadId>>,
}

impl DelayedLoad {
    fn new(hook: impl FnOnce() -> Result<Data> + Send + 'static) -> Self {
        Self {
            result: OnceLock::new(),
            hook: Mutex::new(Some(Box::new(hook))),
            loader: Mutex::new(None),
        }
    }

    fn get(&self) -> Result<&Data> {
        if let Some(result) = self.result.get() {
            return result.as_ref().map_err(|e| *e);
        }

        if *self.loader.lock().unwrap() == Some(thread::current().id()) {
            #[cfg(feature = "log")]
            log::debug!("delayed-load hook reentered from its own thread");
            return Err(PdfError::InternalLogic);
        }

        let mut slot = self.hook.lock().unwrap();
        if let Some(result) = self.result.get() {
            return result.as_ref().map_err(|e| *e);
        }

        let hook = slot.take().expect("delayed-load hook already consumed");
        *self.loader.lock().unwrap() = Some(thread::current().id());
        drop(slot);

        #[cfg(feature = "log")]
        log::trace!("running delayed-load hook");
        let computed = hook();

        *self.loader.lock().unwrap() = None;
        let _ = self.result.set(computed);
        self.result.get().unwrap().as_ref().map_err(|e| *e)
    }

    fn get_mut(&mut self) -> Result<&mut Data> {
        self.get()?;
        self.result.get_mut().unwrap().as_mut().map_err(|e| *e)
    }
}

impl std::fmt::Debug for DelayedLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedLoad").field("resolved", &self.result.get().is_some()).finish()
    }
}

enum State {
    Loaded(Data),
    Delayed(DelayedLoad),
}

/// A PDF value: one of eleven tagged kinds, plus dirty/immutable
/// bookkeeping and an optional delayed-load hook (§3, §4.1).
#[derive(Debug)]
pub struct Variant {
    state: State,
    dirty: bool,
    immutable: bool,
}

impl Variant {
    fn loaded(data: Data) -> Self {
        Self { state: State::Loaded(data), dirty: false, immutable: false }
    }

    /// Create a variant whose content is produced lazily by `hook`.
    ///
    /// `hook` must be idempotent and must not read or mutate the same
    /// variant it is materializing (reentrancy is a caller error, reported
    /// as [`PdfError::InternalLogic`]).
    pub fn delayed_with(hook: impl FnOnce() -> Result<Variant> + Send + 'static) -> Self {
        Self {
            state: State::Delayed(DelayedLoad::new(move || hook().map(|v| v.into_data()))),
            dirty: false,
            immutable: false,
        }
    }

    fn into_data(self) -> Data {
        match self.state {
            State::Loaded(data) => data,
            State::Delayed(hook) => hook.get().map(Data::clone).unwrap_or(Data::Null),
        }
    }

    /// The `Null` variant.
    pub fn null() -> Self {
        Self::loaded(Data::Null)
    }

    /// A `Bool` variant.
    pub fn bool(value: bool) -> Self {
        Self::loaded(Data::Bool(value))
    }

    /// An `Integer` variant.
    pub fn integer(value: i64) -> Self {
        Self::loaded(Data::Integer(value))
    }

    /// A `Real` variant.
    pub fn real(value: f64) -> Self {
        Self::loaded(Data::Real(value))
    }

    /// A literal `String` variant.
    pub fn string(value: PdfString) -> Self {
        Self::loaded(Data::String(value))
    }

    /// A `HexString` variant.
    pub fn hex_string(value: PdfString) -> Self {
        Self::loaded(Data::HexString(value))
    }

    /// A `Name` variant.
    pub fn name(value: Name) -> Self {
        Self::loaded(Data::Name(value))
    }

    /// An `Array` variant.
    pub fn array(value: Array) -> Self {
        Self::loaded(Data::Array(value))
    }

    /// A `Dictionary` variant.
    pub fn dictionary(value: Dictionary) -> Self {
        Self::loaded(Data::Dictionary(value))
    }

    /// A `Reference` variant.
    pub fn reference(value: Reference) -> Self {
        Self::loaded(Data::Reference(value))
    }

    /// Opaque, pre-serialized bytes used for round-tripping content this
    /// crate does not interpret. Unwritable as a standalone token; callers
    /// that need to emit it do so via [`Variant::raw_bytes`].
    pub fn raw_data(bytes: impl Into<Vec<u8>>) -> Self {
        Self::loaded(Data::RawData(bytes.into()))
    }

    fn data(&self) -> Result<&Data> {
        match &self.state {
            State::Loaded(data) => Ok(data),
            State::Delayed(hook) => hook.get(),
        }
    }

    /// Borrow the content mutably, without marking dirty: callers decide
    /// whether to set the dirty bit once they know the kind match (and
    /// therefore the mutation) actually succeeded.
    fn data_mut(&mut self) -> Result<&mut Data> {
        if self.immutable {
            #[cfg(feature = "log")]
            log::debug!("attempted mutation of immutable variant");
            return Err(PdfError::ChangeOnImmutable);
        }
        match &mut self.state {
            State::Loaded(data) => Ok(data),
            State::Delayed(hook) => hook.get_mut(),
        }
    }

    /// Like [`Self::data`]/[`Self::data_mut`], but never fails on
    /// immutability: used by the dirty/immutable bookkeeping below, which
    /// is state propagation rather than a content mutation.
    fn traverse_mut(&mut self) -> Option<&mut Data> {
        match &mut self.state {
            State::Loaded(data) => Some(data),
            State::Delayed(hook) => hook.get_mut().ok(),
        }
    }

    /// The kind of this variant, running the delayed-load hook if needed.
    pub fn kind(&self) -> Result<Kind> {
        self.data().map(Data::kind)
    }

    /// Read as a `Bool`.
    pub fn as_bool(&self) -> Result<bool> {
        match self.data()? {
            Data::Bool(v) => Ok(*v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as an `Integer`. Reading a `Real` truncates toward zero and
    /// raises [`PdfError::ValueOutOfRange`] on overflow or non-finite
    /// values (§4.1's numeric leniency rule).
    pub fn as_integer(&self) -> Result<i64> {
        match self.data()? {
            Data::Integer(v) => Ok(*v),
            Data::Real(v) => {
                if !v.is_finite() {
                    return Err(PdfError::ValueOutOfRange);
                }
                let truncated = v.trunc();
                if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
                    Err(PdfError::ValueOutOfRange)
                } else {
                    Ok(truncated as i64)
                }
            }
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as a `Real`. Reading an `Integer` converts losslessly for any
    /// value representable in a `f64` mantissa, with ordinary `f64`
    /// rounding beyond that range (§4.1's numeric leniency rule).
    pub fn as_real(&self) -> Result<f64> {
        match self.data()? {
            Data::Real(v) => Ok(*v),
            Data::Integer(v) => Ok(*v as f64),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as a literal `String`.
    pub fn as_string(&self) -> Result<&PdfString> {
        match self.data()? {
            Data::String(v) => Ok(v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as a `HexString`.
    pub fn as_hex_string(&self) -> Result<&PdfString> {
        match self.data()? {
            Data::HexString(v) => Ok(v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as a `Name`.
    pub fn as_name(&self) -> Result<&Name> {
        match self.data()? {
            Data::Name(v) => Ok(v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as an `Array`.
    pub fn as_array(&self) -> Result<&Array> {
        match self.data()? {
            Data::Array(v) => Ok(v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as a `Dictionary`.
    pub fn as_dictionary(&self) -> Result<&Dictionary> {
        match self.data()? {
            Data::Dictionary(v) => Ok(v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read as a `Reference`.
    pub fn as_reference(&self) -> Result<Reference> {
        match self.data()? {
            Data::Reference(v) => Ok(*v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Read the raw bytes of a `RawData` variant.
    pub fn as_raw_data(&self) -> Result<&[u8]> {
        match self.data()? {
            Data::RawData(v) => Ok(v),
            _ => Err(PdfError::InvalidDataType),
        }
    }

    /// Mutably borrow the contained `Array`.
    pub fn as_array_mut(&mut self) -> Result<&mut Array> {
        match self.data_mut()? {
            Data::Array(_) => {}
            _ => return Err(PdfError::InvalidDataType),
        }
        self.dirty = true;
        match self.data_mut()? {
            Data::Array(v) => Ok(v),
            _ => Err(PdfError::InternalLogic),
        }
    }

    /// Mutably borrow the contained `Dictionary`.
    pub fn as_dictionary_mut(&mut self) -> Result<&mut Dictionary> {
        match self.data_mut()? {
            Data::Dictionary(_) => {}
            _ => return Err(PdfError::InvalidDataType),
        }
        self.dirty = true;
        match self.data_mut()? {
            Data::Dictionary(v) => Ok(v),
            _ => Err(PdfError::InternalLogic),
        }
    }

    /// Overwrite a literal `String` variant's content. Fails with
    /// [`PdfError::InvalidDataType`] if this variant is not already a
    /// literal `String` (a hex value may not be assigned this way, and a
    /// `String` variant may not become a `HexString` in place).
    pub fn set_string(&mut self, value: PdfString) -> Result<()> {
        if value.is_hex() {
            return Err(PdfError::InvalidDataType);
        }
        match self.data_mut()? {
            Data::String(_) => {}
            _ => return Err(PdfError::InvalidDataType),
        }
        self.dirty = true;
        match self.data_mut()? {
            Data::String(slot) => {
                *slot = value;
                Ok(())
            }
            _ => Err(PdfError::InternalLogic),
        }
    }

    /// Overwrite an `Integer` variant's content.
    pub fn set_integer(&mut self, value: i64) -> Result<()> {
        match self.data_mut()? {
            Data::Integer(_) => {}
            _ => return Err(PdfError::InvalidDataType),
        }
        self.dirty = true;
        match self.data_mut()? {
            Data::Integer(slot) => {
                *slot = value;
                Ok(())
            }
            _ => Err(PdfError::InternalLogic),
        }
    }

    /// Overwrite a `Real` variant's content.
    pub fn set_real(&mut self, value: f64) -> Result<()> {
        match self.data_mut()? {
            Data::Real(_) => {}
            _ => return Err(PdfError::InvalidDataType),
        }
        self.dirty = true;
        match self.data_mut()? {
            Data::Real(slot) => {
                *slot = value;
                Ok(())
            }
            _ => Err(PdfError::InternalLogic),
        }
    }

    /// Overwrite a `Reference` variant's content. Per the documented
    /// contract (§9 Open Questions), this only succeeds when the variant
    /// already *is* a `Reference`.
    pub fn set_reference(&mut self, value: Reference) -> Result<()> {
        match self.data_mut()? {
            Data::Reference(_) => {}
            _ => return Err(PdfError::InvalidDataType),
        }
        self.dirty = true;
        match self.data_mut()? {
            Data::Reference(slot) => {
                *slot = value;
                Ok(())
            }
            _ => Err(PdfError::InternalLogic),
        }
    }

    /// Whether this variant or any owned child has been mutated since the
    /// last `set_dirty(false)` (invariant I2).
    pub fn is_dirty(&self) -> bool {
        if self.dirty {
            return true;
        }
        match self.data() {
            Ok(Data::Array(a)) => a.is_dirty(),
            Ok(Data::Dictionary(d)) => d.is_dirty(),
            _ => false,
        }
    }

    /// Set the dirty bit; clearing it clears every descendant's too. Runs
    /// the delayed-load hook if one is still pending, since a materialized
    /// child's dirty bit needs visiting regardless of whether the wrapping
    /// variant itself has since been re-tagged `Loaded`.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        if !dirty {
            if let Some(data) = self.traverse_mut() {
                match data {
                    Data::Array(a) => a.set_dirty(false),
                    Data::Dictionary(d) => d.set_dirty(false),
                    _ => {}
                }
            }
        }
    }

    /// Whether this variant is currently immutable.
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Mark immutable (propagating to every descendant currently held) or
    /// clear the flag on this variant alone (invariant I3).
    pub fn set_immutable(&mut self, immutable: bool) {
        if immutable {
            if let Some(data) = self.traverse_mut() {
                match data {
                    Data::Array(a) => a.set_immutable(true),
                    Data::Dictionary(d) => d.set_immutable(true),
                    _ => {}
                }
            }
        }
        self.immutable = immutable;
    }

    /// Deep-copy this variant, first running its delayed-load hook if one
    /// is still pending (a clone needs owned content, not a hook).
    pub fn try_clone(&self) -> Result<Variant> {
        let data = self.data()?.clone();
        Ok(Variant { state: State::Loaded(data), dirty: self.dirty, immutable: self.immutable })
    }

    /// Structural (non-fallible) equality, ignoring `dirty`/`immutable`.
    ///
    /// The spec's documented comparison operation is fallible (comparing
    /// an unmaterialized or `RawData` variant raises
    /// [`PdfError::InvalidDataType`]); `std::cmp::PartialEq` cannot return
    /// a `Result`, so that contract is exposed separately as
    /// [`Variant::compare`]. This `PartialEq` impl is the total, practical
    /// analogue used by containers and tests.
    pub fn compare(&self, other: &Variant) -> Result<bool> {
        let a = self.data()?;
        let b = other.data()?;
        if matches!(a, Data::RawData(_)) || matches!(b, Data::RawData(_)) {
            return Err(PdfError::InvalidDataType);
        }
        Ok(a == b)
    }

    /// Whether this value's first written byte is a non-delimiter
    /// (digit, minus sign, or the letter starting `true`/`false`/`null`)
    /// that could fuse with whatever immediately precedes it — `Bool`,
    /// `Integer`, `Real`, `Null`, and `Reference` all qualify; `Name`,
    /// `String`, `HexString`, `Array`, and `Dictionary` all start with a
    /// PDF delimiter byte and never need a preceding space.
    pub(crate) fn starts_ambiguous(&self) -> bool {
        matches!(
            self.data(),
            Ok(Data::Bool(_) | Data::Integer(_) | Data::Real(_) | Data::Null | Data::Reference(_))
        )
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>, mode: WriteMode, reference: Reference, encrypt: Option<&dyn PdfEncrypt>) {
        let data = match self.data() {
            Ok(data) => data,
            Err(_) => {
                buf.extend_from_slice(b"null");
                return;
            }
        };
        match data {
            Data::Null => buf.extend_from_slice(b"null"),
            Data::Bool(true) => buf.extend_from_slice(b"true"),
            Data::Bool(false) => buf.extend_from_slice(b"false"),
            Data::Integer(v) => {
                crate::primitive::BufExt::push_int(buf, *v);
            }
            Data::Real(v) => {
                crate::primitive::BufExt::push_real(buf, *v);
            }
            Data::String(s) => s.write(buf, reference, encrypt),
            Data::HexString(s) => s.write(buf, reference, encrypt),
            Data::Name(n) => n.write(buf),
            Data::Array(a) => a.write(buf, mode, reference, encrypt),
            Data::Dictionary(d) => d.write(buf, mode, reference, encrypt, None),
            Data::Reference(r) => r.write(buf),
            Data::RawData(bytes) => buf.extend_from_slice(bytes),
        }
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        self.try_clone().expect("delayed-load hook failed during clone")
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other).unwrap_or(false)
    }
}
