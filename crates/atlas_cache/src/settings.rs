//! Global packing configuration shared by every target in a build pass.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Texture sampling filter recorded in the atlas description.
///
/// Names match the values a libGDX `TextureAtlas` reader expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    MipMap,
    MipMapNearestNearest,
    MipMapLinearNearest,
    MipMapNearestLinear,
    MipMapLinearLinear,
}

impl fmt::Display for TextureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureFilter::Nearest => "Nearest",
            TextureFilter::Linear => "Linear",
            TextureFilter::MipMap => "MipMap",
            TextureFilter::MipMapNearestNearest => "MipMapNearestNearest",
            TextureFilter::MipMapLinearNearest => "MipMapLinearNearest",
            TextureFilter::MipMapNearestLinear => "MipMapNearestLinear",
            TextureFilter::MipMapLinearLinear => "MipMapLinearLinear",
        };
        f.write_str(name)
    }
}

/// Minification and magnification filters for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterMode {
    pub min: TextureFilter,
    pub mag: TextureFilter,
}

impl Default for FilterMode {
    // Mipmapped linear on both axes so scaled-down icons don't look pixelated.
    fn default() -> Self {
        Self {
            min: TextureFilter::MipMapLinearLinear,
            mag: TextureFilter::MipMapLinearLinear,
        }
    }
}

/// Packing constraints applied to every [`BuildTarget`](crate::BuildTarget).
///
/// The maximum page size should be as large as the target hardware allows:
/// every page switch during rendering costs a texture bind, so fitting all
/// images on one page matters more than the memory held by that page.
///
/// # TOML format
///
/// ```toml
/// max_width = 4096
/// max_height = 4096
/// combine_subdirectories = true
/// power_of_two = true
/// fast = true
/// padding = 2
///
/// [filter_mode]
/// min = "MipMapLinearLinear"
/// mag = "MipMapLinearLinear"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackSettings {
    pub max_width: u32,
    pub max_height: u32,
    /// Pack images from subdirectories onto the same pages as their parent.
    pub combine_subdirectories: bool,
    /// Round page dimensions up to powers of two. Some mobile GPUs cannot
    /// sample non-power-of-two textures.
    pub power_of_two: bool,
    /// Use a single placement pass instead of trying several orderings.
    pub fast: bool,
    pub filter_mode: FilterMode,
    /// Pixels between regions and around the page border.
    pub padding: u32,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            max_width: 4096,
            max_height: 4096,
            combine_subdirectories: true,
            power_of_two: true,
            fast: true,
            filter_mode: FilterMode::default(),
            padding: 2,
        }
    }
}

impl PackSettings {
    /// Reject settings no packer could honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(Error::InvalidSettings(format!(
                "maximum page size must be non-zero, got {}x{}",
                self.max_width, self.max_height
            )));
        }

        if self.power_of_two {
            if !self.max_width.is_power_of_two() {
                return Err(Error::InvalidSettings(format!(
                    "max_width must be a power of two when power_of_two is set, got {}",
                    self.max_width
                )));
            }
            if !self.max_height.is_power_of_two() {
                return Err(Error::InvalidSettings(format!(
                    "max_height must be a power of two when power_of_two is set, got {}",
                    self.max_height
                )));
            }
        }

        if self.padding.saturating_mul(2) >= self.max_width.min(self.max_height) {
            return Err(Error::InvalidSettings(format!(
                "padding {} leaves no room on a {}x{} page",
                self.padding, self.max_width, self.max_height
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PackSettings::default();
        assert_eq!(settings.max_width, 4096);
        assert_eq!(settings.max_height, 4096);
        assert!(settings.combine_subdirectories);
        assert!(settings.power_of_two);
        assert!(settings.fast);
        assert_eq!(settings.filter_mode.min, TextureFilter::MipMapLinearLinear);
        assert_eq!(settings.filter_mode.mag, TextureFilter::MipMapLinearLinear);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_size() {
        let settings = PackSettings {
            max_width: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn test_validate_power_of_two() {
        let settings = PackSettings {
            max_height: 3000,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));

        let settings = PackSettings {
            max_height: 3000,
            power_of_two: false,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_padding() {
        let settings = PackSettings {
            max_width: 8,
            max_height: 8,
            padding: 4,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(
            TextureFilter::MipMapLinearLinear.to_string(),
            "MipMapLinearLinear"
        );
        assert_eq!(TextureFilter::Nearest.to_string(), "Nearest");
    }
}
