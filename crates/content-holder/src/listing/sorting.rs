//! Sorting configuration and logic for holder listings.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::holder::Holder;
use crate::listing::entry::EntryDescriptor;

// ============================================================================
// Sorting configuration
// ============================================================================

/// Key to sort entries by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortMethod {
    #[default]
    Name,
    Date,
    Size,
    Extension,
}

impl SortMethod {
    /// Parses the short names used on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "date" | "modified" => Some(Self::Date),
            "size" => Some(Self::Size),
            "ext" | "extension" => Some(Self::Extension),
            _ => None,
        }
    }
}

/// Listing preferences passed in by the caller with every sorted listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingPreferences {
    pub method: SortMethod,
    pub folders_first: bool,
    pub reverse: bool,
    pub show_hidden: bool,
}

impl Default for ListingPreferences {
    fn default() -> Self {
        Self {
            method: SortMethod::Name,
            folders_first: true,
            reverse: false,
            show_hidden: false,
        }
    }
}

// ============================================================================
// Sorting logic
// ============================================================================

/// Splits a name for extension sorting.
/// Returns: (is_dotfile, has_extension, extension_lowercase)
fn extract_extension_for_sort(name: &str) -> (bool, bool, String) {
    if name.starts_with('.') && !name[1..].contains('.') {
        return (true, false, String::new());
    }

    if let Some(dot_pos) = name.rfind('.')
        && dot_pos > 0
        && dot_pos < name.len() - 1
    {
        return (false, true, name[dot_pos + 1..].to_lowercase());
    }

    (false, false, String::new())
}

/// Compares two strings using natural (alphanumeric) sort, case-insensitive.
fn compare_names_natural(a: &str, b: &str) -> Ordering {
    alphanumeric_sort::compare_str(a.to_lowercase(), b.to_lowercase())
}

/// Compares two entries by the given method, ascending.
///
/// Equal keys compare as `Equal` (no name tie-break for date and size) so the
/// stable sort keeps the listing's original order for ties.
pub fn compare_entries(a: &EntryDescriptor, b: &EntryDescriptor, method: SortMethod) -> Ordering {
    match method {
        SortMethod::Name => compare_names_natural(&a.display_name, &b.display_name),
        SortMethod::Date => a.last_modified.cmp(&b.last_modified),
        SortMethod::Size => a.size.cmp(&b.size),
        SortMethod::Extension => {
            let (a_dotfile, a_has_ext, a_ext) = extract_extension_for_sort(&a.display_name);
            let (b_dotfile, b_has_ext, b_ext) = extract_extension_for_sort(&b.display_name);

            // Dotfiles first, then no extension, then by extension
            match (a_dotfile, b_dotfile) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (true, true) => compare_names_natural(&a.display_name, &b.display_name),
                (false, false) => match (a_has_ext, b_has_ext) {
                    (false, true) => Ordering::Less,
                    (true, false) => Ordering::Greater,
                    (false, false) => compare_names_natural(&a.display_name, &b.display_name),
                    (true, true) => alphanumeric_sort::compare_str(&a_ext, &b_ext)
                        .then_with(|| compare_names_natural(&a.display_name, &b.display_name)),
                },
            }
        }
    }
}

fn directed(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse { ordering.reverse() } else { ordering }
}

/// Orders items by their descriptors: primary key first, then the
/// folders-first partition.
///
/// The primary key honors `reverse`; the partition ignores it.
fn order_by_descriptor<T>(items: &mut [T], prefs: &ListingPreferences, descriptor: impl Fn(&T) -> &EntryDescriptor) {
    items.sort_by(|a, b| directed(compare_entries(descriptor(a), descriptor(b), prefs.method), prefs.reverse));
    if prefs.folders_first {
        // Stable: keeps the primary order inside each group
        items.sort_by_key(|item| !descriptor(item).is_folder);
    }
}

fn is_visible(entry: &EntryDescriptor, show_hidden: bool) -> bool {
    show_hidden || !entry.is_hidden()
}

/// Sorts descriptors in place. Hidden entries are not touched here, see
/// [`filter_hidden`].
pub fn sort_entries(entries: &mut [EntryDescriptor], prefs: &ListingPreferences) {
    order_by_descriptor(entries, prefs, |entry| entry);
}

/// Sorts holders by their descriptors, then drops hidden ones unless requested.
///
/// Each holder is described exactly once, so a slow `describe()` (a stat call
/// for local files) doesn't multiply with the comparison count.
pub fn sort_holders(holders: Vec<Holder>, prefs: &ListingPreferences) -> Vec<Holder> {
    let mut described: Vec<(EntryDescriptor, Holder)> = holders.into_iter().map(|h| (h.describe(), h)).collect();
    order_by_descriptor(&mut described, prefs, |(entry, _)| entry);

    described
        .into_iter()
        .filter(|(entry, _)| is_visible(entry, prefs.show_hidden))
        .map(|(_, holder)| holder)
        .collect()
}

/// Removes hidden entries unless `show_hidden` is set.
pub fn filter_hidden(entries: Vec<EntryDescriptor>, show_hidden: bool) -> Vec<EntryDescriptor> {
    entries.into_iter().filter(|entry| is_visible(entry, show_hidden)).collect()
}
