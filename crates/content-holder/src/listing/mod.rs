//! Listing module - entry descriptors, content counts, and the sorting policy.

pub mod entry;
pub mod sorting;

pub use entry::{ContentCount, EntryDescriptor, extension_of, format_details, format_size, is_hidden_name};
pub use sorting::{ListingPreferences, SortMethod, compare_entries, filter_hidden, sort_entries, sort_holders};
