//! libGDX text atlas description writer.
//!
//! ```text
//!
//! game.png
//! size: 256,128
//! format: RGBA8888
//! filter: MipMapLinearLinear,MipMapLinearLinear
//! repeat: none
//! units/Warrior
//!   rotate: false
//!   xy: 2, 2
//!   size: 64, 64
//!   orig: 64, 64
//!   offset: 0, 0
//!   index: -1
//! ```

use crate::settings::FilterMode;
use std::fmt::Write;

/// A packed region as listed in the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionEntry {
    pub name: String,
    pub index: i32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One page block of the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageEntry {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub regions: Vec<RegionEntry>,
}

pub(crate) fn render(pages: &[PageEntry], filter: FilterMode) -> String {
    let mut out = String::new();
    for page in pages {
        // Infallible: writing into a String.
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", page.file_name);
        let _ = writeln!(out, "size: {},{}", page.width, page.height);
        let _ = writeln!(out, "format: RGBA8888");
        let _ = writeln!(out, "filter: {},{}", filter.min, filter.mag);
        let _ = writeln!(out, "repeat: none");
        for region in &page.regions {
            let _ = writeln!(out, "{}", region.name);
            let _ = writeln!(out, "  rotate: false");
            let _ = writeln!(out, "  xy: {}, {}", region.x, region.y);
            let _ = writeln!(out, "  size: {}, {}", region.width, region.height);
            let _ = writeln!(out, "  orig: {}, {}", region.width, region.height);
            let _ = writeln!(out, "  offset: 0, 0");
            let _ = writeln!(out, "  index: {}", region.index);
        }
    }
    out
}

/// Split a trailing `_<digits>` frame index off a region name.
///
/// `walk_3` becomes `("walk", 3)`; names without a numeric suffix get index `-1`.
pub(crate) fn split_index(name: &str) -> (String, i32) {
    if let Some((base, suffix)) = name.rsplit_once('_') {
        if !base.is_empty() && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = suffix.parse::<i32>() {
                return (base.to_string(), index);
            }
        }
    }
    (name.to_string(), -1)
}
