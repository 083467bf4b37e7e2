use std::fmt;

/// The closed error taxonomy raised by this crate.
///
/// Every fallible operation in the object model, the writer, and the font
/// subsetter returns one of these kinds. The core never recovers from an
/// error internally; it always surfaces to the caller (see the crate-level
/// design notes on recovery policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfError {
    /// A read, set, or compare was attempted against the wrong `Variant`
    /// kind (including comparing an `Unknown`/`RawData` variant).
    InvalidDataType,
    /// A null or uninitialized handle was passed where a value was
    /// required.
    InvalidHandle,
    /// A mutation was attempted on a variant (or a descendant of one)
    /// marked immutable.
    ChangeOnImmutable,
    /// A numeric narrowing overflowed, or a parameter fell outside its
    /// allowed set.
    ValueOutOfRange,
    /// The input ended before the operation could complete.
    UnexpectedEOF,
    /// The font subsetter was given a font program it cannot parse.
    UnsupportedFontFormat,
    /// An image collaborator was given a format it cannot decode.
    UnsupportedImageFormat,
    /// A stream collaborator was given a filter it cannot apply.
    UnsupportedFilter,
    /// An invariant the implementation itself is responsible for was
    /// violated (programmer error, not user-data error).
    InternalLogic,
    /// The requested operation is an optional feature not compiled in.
    NotImplemented,
}

impl PdfError {
    fn message(self) -> &'static str {
        match self {
            PdfError::InvalidDataType => "value does not have the expected kind",
            PdfError::InvalidHandle => "handle is null or uninitialized",
            PdfError::ChangeOnImmutable => "cannot mutate an immutable value",
            PdfError::ValueOutOfRange => "value is out of the allowed range",
            PdfError::UnexpectedEOF => "input ended unexpectedly",
            PdfError::UnsupportedFontFormat => "font program is not a supported format",
            PdfError::UnsupportedImageFormat => "image is not a supported format",
            PdfError::UnsupportedFilter => "stream filter is not supported",
            PdfError::InternalLogic => "internal invariant violated",
            PdfError::NotImplemented => "feature not implemented",
        }
    }
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PdfError {}

/// Shorthand for `Result<T, PdfError>`.
pub type Result<T> = std::result::Result<T, PdfError>;
