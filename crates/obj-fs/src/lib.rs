//! Filesystem primitives for the object store
//!
//! Provides filesystem-safe name escaping, normalized path handling and
//! commit-or-discard file writes.

pub mod checksum;
pub mod error;
pub mod escape;
pub mod io;
pub mod path;

pub use checksum::{sha1_hex, truncate_using_hash};
pub use error::{Error, Result};
pub use escape::{HOSTILE_CHARS, escape_name, unescape_name};
pub use io::PendingWrite;
pub use path::{NormalizedPath, validate_path_segment};
