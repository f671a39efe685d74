#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the byte-stream boundary.
pub mod error;

/// Loading and storing planes as raw big-endian pixel data.
///
/// See [`raw::load`] and [`raw::store`].
pub mod raw;

/// Destinations for stored planes.
pub mod sink;

pub use crate::error::IoError;
pub use crate::raw::{load, store};
pub use crate::sink::{HeaderValue, MemorySink, PlaneSink, StoredPlane};
