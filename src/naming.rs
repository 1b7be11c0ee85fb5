//! Archive entry naming for tiles.
//!
//! Each tile is stored as `{index}.jpg`, where `index` is its 1-based posting
//! position. The names carry no padding, so `10.jpg` sorts after `9.jpg` only
//! when compared numerically. [`sort_entry_names`] does exactly that, and
//! recovers posting order from a bare list of extracted filenames.
//!
//! - `1.jpg` → index 1 (top-left tile, posted first)
//! - `9.jpg` → index 9 (bottom-right tile of a 3×3 grid)
//! - `01.jpg`, `0.jpg`, `1.jpeg`, `cover.jpg` → not a tile entry

use std::cmp::Ordering;

/// File extension used for every tile entry.
pub const TILE_EXTENSION: &str = "jpg";

/// Media type of the encoded tile bytes.
pub const TILE_MEDIA_TYPE: &str = "image/jpeg";

/// Entry name for the tile at the given 1-based posting index.
pub fn tile_entry_name(index: u32) -> String {
    format!("{index}.{TILE_EXTENSION}")
}

/// Parse a tile entry name back into its posting index.
///
/// Only canonical names produced by [`tile_entry_name`] are accepted: a
/// positive integer without leading zeros followed by `.jpg`.
pub fn parse_tile_entry_name(name: &str) -> Option<u32> {
    let stem = name.strip_suffix(TILE_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || stem.starts_with('0') || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Sort entry names into posting order.
///
/// Tile entries come first, ordered by numeric index. Anything else is kept
/// after them in plain string order.
pub fn sort_entry_names<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare_entry_names(a.as_ref(), b.as_ref()));
}

/// Posting-order comparison used by [`sort_entry_names`].
pub fn compare_entry_names(a: &str, b: &str) -> Ordering {
    match (parse_tile_entry_name(a), parse_tile_entry_name(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
