use thiserror::Error;

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Invariant {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Invariant {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Data-shape problems (missing references, ambiguous candidates, circular graphs) are never
/// reported through this type; they are captured as placeholder symbols and structured
/// diagnostics so that resolution can continue past individual failures. `Error` is reserved
/// for construction-contract violations on the public API surface and for internal invariant
/// breaks that are still representable as values.
///
/// # Error Categories
///
/// ## Construction Errors
/// - [`Error::ArgumentMismatch`] - Generic construction with the wrong type-argument count
/// - [`Error::InvalidArgument`] - An unset or otherwise unusable argument value
///
/// ## Caching and Publication Errors
/// - [`Error::AlreadyPublished`] - A publish-once cell observed a second, different value
/// - [`Error::LockError`] - Thread synchronization failure
///
/// ## Internal Errors
/// - [`Error::Invariant`] - An internal invariant was violated; carries source location
/// - [`Error::RecursionLimit`] - Maximum recursion depth exceeded during a signature walk
#[derive(Error, Debug)]
pub enum Error {
    /// A generic definition was constructed with the wrong number of type arguments.
    ///
    /// The argument list supplied to a `construct` call must match the declared
    /// arity of the generic definition exactly. This is a caller contract error,
    /// not a data error, so it is reported eagerly instead of producing an
    /// error-type symbol.
    #[error("Type argument count mismatch - expected {expected}, got {actual}")]
    ArgumentMismatch {
        /// The declared arity of the generic definition
        expected: u32,
        /// The number of type arguments actually supplied
        actual: u32,
    },

    /// An argument supplied to a construction operation was unset or unusable.
    ///
    /// The annotated-type default sentinel (an unset reference) is the closest
    /// analogue to a null type argument; passing it where a real type is
    /// required fails with this error.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// A publish-once cell observed a second publication with a different value.
    ///
    /// All lazily-computed caches in this crate follow a first-writer-wins
    /// discipline: racing computations are expected and their redundant results
    /// silently dropped, but only when the dropped value is equal to the
    /// published one. A non-equal second publication indicates a logic error.
    #[error("Cell was already published with a different value - {0}")]
    AlreadyPublished(String),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically
    /// when trying to acquire a mutex or rwlock that is in an invalid state.
    #[error("Failed to lock target")]
    LockError,

    /// Recursion limit reached.
    ///
    /// To prevent stack overflow during recursive operations like use-site
    /// diagnostic walks or substitution over deeply nested types, a maximum
    /// recursion depth is enforced. This error indicates that limit was exceeded.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// An internal invariant was violated.
    ///
    /// The error includes the source location where the violation was detected
    /// for debugging purposes. Unlike data errors, an `Invariant` indicates a
    /// missing case in this crate's own logic.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the violated invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invariant - {file}:{line}: {message}")]
    Invariant {
        /// The message to be printed for the Invariant error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping collaborator failures with additional context.
    #[error("{0}")]
    Error(String),
}
