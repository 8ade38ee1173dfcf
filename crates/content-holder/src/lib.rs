// Warn on unused code to catch dead code early
#![warn(unused)]
// Warn on redundant path prefixes (e.g., std::path::Path when Path is imported)
#![warn(unused_qualifications)]
// Use log::* macros instead of println!/eprintln! for proper log level control
#![deny(clippy::print_stdout, clippy::print_stderr)]

//! Uniform browsing over local folders, zip archives, and virtual file collections.
//!
//! Every backing store implements [`ContentHolder`]. Callers list, sort, and
//! mutate through that trait without knowing whether an entry is a real file,
//! a member of a zip, or a query result.

// env_logger is only used by the holder-ls binary
use env_logger as _;

pub mod archive;
pub mod asynchronous;
pub mod cache;
pub mod context;
pub mod error;
pub mod holder;
mod ignore_poison;
pub mod listing;
pub mod media;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use archive::{ArchiveNode, ArchiveRegistry, TreeStatus, ZipTree};
pub use context::{HolderContext, open_path};
pub use error::HolderError;
pub use holder::{ArchiveHolder, ContentHolder, Holder, LocalHolder, RootHolder, VirtualHolder, VirtualKind};
pub use listing::{ContentCount, EntryDescriptor, ListingPreferences, SortMethod};
pub use media::{IndexedFile, MediaCategory, MediaIndex, WalkdirIndex};
pub use settings::{HolderSettings, RecentSettings, load_settings};
