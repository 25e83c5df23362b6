//! Row-based ("shelf") atlas packer backed by the `image` crate.

use super::description::{self, PageEntry, RegionEntry};
use super::staging::Staging;
use super::{PackOutput, Packer};
use crate::error::{Error, Result};
use crate::scanner::{scan_images, ExtensionFilter};
use crate::settings::PackSettings;
use crate::target::page_file_name;
use camino::{Utf8Path, Utf8PathBuf};
use image::{ImageFormat, RgbaImage};
use std::collections::BTreeMap;

/// Packs images into rows, tallest first, starting a new page when a page fills up.
///
/// Region names are the image path relative to the source directory, without
/// its extension and with `/` separators. A trailing `_<digits>` becomes the
/// region index.
///
/// Output is staged and committed atomically; a failure at any point leaves
/// the previous atlas exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct ShelfPacker {
    extensions: ExtensionFilter,
}

impl ShelfPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack only images with these extensions (default: png, jpg, jpeg).
    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }
}

impl Packer for ShelfPacker {
    fn pack(
        &mut self,
        settings: &PackSettings,
        source_dir: &Utf8Path,
        output_dir: &Utf8Path,
        atlas_name: &str,
    ) -> Result<PackOutput> {
        settings.validate()?;

        if !source_dir.is_dir() {
            return Err(Error::MissingSourceDir(source_dir.to_path_buf()));
        }

        let sprites = load_sprites(source_dir, &self.extensions)?;
        if sprites.is_empty() {
            tracing::warn!("No images found in {}, nothing packed", source_dir);
            return Ok(PackOutput::default());
        }

        for sprite in &sprites {
            let (width, height) = sprite.image.dimensions();
            if !fits_on_page(width, height, settings) {
                return Err(Error::ImageTooLarge {
                    path: sprite.source.clone(),
                    width,
                    height,
                    max_width: settings.max_width,
                    max_height: settings.max_height,
                });
            }
        }

        let pages = layout_all(&sprites, settings);

        std::fs::create_dir_all(output_dir)?;
        let staging = Staging::create(output_dir, atlas_name)?;

        let mut entries = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let mut canvas = RgbaImage::new(page.width, page.height);
            let mut regions = Vec::with_capacity(page.placements.len());

            for placement in &page.placements {
                let sprite = &sprites[placement.sprite];
                image::imageops::replace(
                    &mut canvas,
                    &sprite.image,
                    i64::from(placement.x),
                    i64::from(placement.y),
                );
                regions.push(RegionEntry {
                    name: sprite.name.clone(),
                    index: sprite.index,
                    x: placement.x,
                    y: placement.y,
                    width: sprite.image.width(),
                    height: sprite.image.height(),
                });
            }

            canvas.save_with_format(staging.page_path(index), ImageFormat::Png)?;
            entries.push(PageEntry {
                file_name: page_file_name(atlas_name, index),
                width: page.width,
                height: page.height,
                regions,
            });
        }

        let text = description::render(&entries, settings.filter_mode);
        std::fs::write(staging.description_path(), text)?;

        let (description_path, page_paths) = staging.commit(pages.len())?;

        tracing::info!(
            "Packed {} image(s) from {} into {} page(s) at {}",
            sprites.len(),
            source_dir,
            page_paths.len(),
            description_path
        );

        Ok(PackOutput {
            description_path: Some(description_path),
            page_paths,
            regions: sprites.len(),
        })
    }
}

struct Sprite {
    source: Utf8PathBuf,
    name: String,
    index: i32,
    /// Relative parent directory; sprites of one group share pages when
    /// subdirectories are not combined.
    group: String,
    image: RgbaImage,
}

fn load_sprites(source_dir: &Utf8Path, extensions: &ExtensionFilter) -> Result<Vec<Sprite>> {
    let mut sprites = Vec::new();

    for file in scan_images(source_dir, extensions) {
        let relative = file
            .path
            .strip_prefix(source_dir)
            .map_err(|_| format!("Image path is not under {}: {}", source_dir, file.path))?;

        let stem = relative.with_extension("");
        let parts: Vec<&str> = stem.components().map(|c| c.as_str()).collect();
        let (name, index) = description::split_index(&parts.join("/"));
        let group = parts[..parts.len().saturating_sub(1)].join("/");

        let image = image::open(file.path.as_std_path())?.to_rgba8();
        tracing::debug!(
            "Loaded {} ({}x{}) as '{}'",
            file.path,
            image.width(),
            image.height(),
            name
        );

        sprites.push(Sprite {
            source: file.path,
            name,
            index,
            group,
            image,
        });
    }

    Ok(sprites)
}

fn fits_on_page(width: u32, height: u32, settings: &PackSettings) -> bool {
    let border = settings.padding.saturating_mul(2);
    width.saturating_add(border) <= settings.max_width
        && height.saturating_add(border) <= settings.max_height
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    sprite: usize,
    x: u32,
    y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PageLayout {
    width: u32,
    height: u32,
    placements: Vec<Placement>,
}

/// Lay out every sprite, keeping subdirectory groups apart unless combined.
fn layout_all(sprites: &[Sprite], settings: &PackSettings) -> Vec<PageLayout> {
    let groups: Vec<Vec<usize>> = if settings.combine_subdirectories {
        vec![(0..sprites.len()).collect()]
    } else {
        let mut by_group: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, sprite) in sprites.iter().enumerate() {
            by_group.entry(sprite.group.as_str()).or_default().push(idx);
        }
        by_group.into_values().collect()
    };

    let sizes: Vec<(u32, u32)> = sprites.iter().map(|s| s.image.dimensions()).collect();
    let names: Vec<&str> = sprites.iter().map(|s| s.name.as_str()).collect();

    groups
        .into_iter()
        .flat_map(|members| layout_group(&members, &sizes, &names, settings))
        .collect()
}

fn layout_group(
    members: &[usize],
    sizes: &[(u32, u32)],
    names: &[&str],
    settings: &PackSettings,
) -> Vec<PageLayout> {
    let by_height = |a: &usize, b: &usize| {
        sizes[*b]
            .1
            .cmp(&sizes[*a].1)
            .then_with(|| names[*a].cmp(names[*b]))
            .then_with(|| a.cmp(b))
    };
    let by_area = |a: &usize, b: &usize| {
        let area = |i: usize| u64::from(sizes[i].0) * u64::from(sizes[i].1);
        area(*b)
            .cmp(&area(*a))
            .then_with(|| names[*a].cmp(names[*b]))
            .then_with(|| a.cmp(b))
    };

    let mut order = members.to_vec();
    order.sort_by(by_height);
    let mut best = shelf_layout(&order, sizes, settings);

    if !settings.fast {
        let mut order = members.to_vec();
        order.sort_by(by_area);
        let candidate = shelf_layout(&order, sizes, settings);
        if layout_cost(&candidate) < layout_cost(&best) {
            best = candidate;
        }
    }

    best
}

fn layout_cost(pages: &[PageLayout]) -> (usize, u64) {
    let area = pages
        .iter()
        .map(|p| u64::from(p.width) * u64::from(p.height))
        .sum();
    (pages.len(), area)
}

/// Place sprites in `order` on shelves. Every sprite must already fit a page.
fn shelf_layout(order: &[usize], sizes: &[(u32, u32)], settings: &PackSettings) -> Vec<PageLayout> {
    let pad = settings.padding;
    let mut pages = Vec::new();
    let mut current: Vec<Placement> = Vec::new();
    let (mut x, mut shelf_y, mut shelf_height) = (pad, pad, 0u32);
    let (mut used_width, mut used_height) = (0u32, 0u32);

    for &sprite in order {
        let (width, height) = sizes[sprite];

        if x + width + pad > settings.max_width {
            shelf_y += shelf_height + pad;
            x = pad;
            shelf_height = 0;
        }

        if shelf_y + height + pad > settings.max_height {
            pages.push(finish_page(std::mem::take(&mut current), used_width, used_height, settings));
            x = pad;
            shelf_y = pad;
            shelf_height = 0;
            used_width = 0;
            used_height = 0;
        }

        current.push(Placement {
            sprite,
            x,
            y: shelf_y,
        });
        x += width + pad;
        shelf_height = shelf_height.max(height);
        used_width = used_width.max(x);
        used_height = used_height.max(shelf_y + height + pad);
    }

    if !current.is_empty() {
        pages.push(finish_page(current, used_width, used_height, settings));
    }

    pages
}

fn finish_page(
    placements: Vec<Placement>,
    used_width: u32,
    used_height: u32,
    settings: &PackSettings,
) -> PageLayout {
    let (width, height) = if settings.power_of_two {
        (
            used_width.next_power_of_two().min(settings.max_width),
            used_height.next_power_of_two().min(settings.max_height),
        )
    } else {
        (used_width, used_height)
    };

    PageLayout {
        width,
        height,
        placements,
    }
}
