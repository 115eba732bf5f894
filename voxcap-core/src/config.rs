/// Grid resolution and batching configuration
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, VoxelizeError};

/// Smallest grid side accepted by default.
pub const MIN_GRID_SIZE: usize = 12;
/// Largest grid side accepted by default.
pub const MAX_GRID_SIZE: usize = 120;
/// Hard upper bound on any configured grid side. A 512³ grid of RGBA sums
/// is 2 GiB, and larger sides overflow or exhaust memory on allocation.
pub const GRID_SIZE_LIMIT: usize = 512;
/// Index ceiling for a single emitted mesh.
pub const MAX_INDICES_PER_BATCH: usize = 2048;
/// Size control position used when the driver is initialized.
pub const DEFAULT_PROGRESS: f32 = 0.2;

/// Voxelizer settings, loadable from a TOML file.
///
/// Missing keys fall back to the defaults above, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VoxelizerConfig {
    pub min_size: usize,
    pub max_size: usize,
    pub default_progress: f32,
    pub max_indices_per_batch: usize,
}

impl VoxelizerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(VoxelizeError::InvalidConfig(
                "min_size must be at least 1".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(VoxelizeError::InvalidConfig(format!(
                "min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        if self.max_size > GRID_SIZE_LIMIT {
            return Err(VoxelizeError::InvalidConfig(format!(
                "max_size {} exceeds the limit of {}",
                self.max_size, GRID_SIZE_LIMIT
            )));
        }
        if !(0.0..=1.0).contains(&self.default_progress) {
            return Err(VoxelizeError::InvalidConfig(format!(
                "default_progress {} outside [0, 1]",
                self.default_progress
            )));
        }
        if self.max_indices_per_batch == 0 {
            return Err(VoxelizeError::InvalidConfig(
                "max_indices_per_batch must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that an explicit grid size lies in the configured range.
    pub fn validate_size(&self, size: usize) -> Result<usize> {
        if size < self.min_size || size > self.max_size {
            return Err(VoxelizeError::SizeOutOfRange {
                size,
                min: self.min_size,
                max: self.max_size,
            });
        }
        Ok(size)
    }

    /// Map a size control position in `[0, 1]` onto a grid size.
    ///
    /// The mapping truncates, so `1.0` is the only position that reaches
    /// `max_size`.
    pub fn size_from_progress(&self, progress: f32) -> Result<usize> {
        if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
            return Err(VoxelizeError::InvalidProgress(progress));
        }
        let span = (self.max_size - self.min_size) as f32;
        Ok((progress * span) as usize + self.min_size)
    }

    pub fn default_size(&self) -> usize {
        let span = (self.max_size - self.min_size) as f32;
        (self.default_progress.clamp(0.0, 1.0) * span) as usize + self.min_size
    }
}

impl Default for VoxelizerConfig {
    fn default() -> Self {
        Self {
            min_size: MIN_GRID_SIZE,
            max_size: MAX_GRID_SIZE,
            default_progress: DEFAULT_PROGRESS,
            max_indices_per_batch: MAX_INDICES_PER_BATCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_mapping_endpoints() {
        let config = VoxelizerConfig::default();
        assert_eq!(config.size_from_progress(0.0).unwrap(), 12);
        assert_eq!(config.size_from_progress(1.0).unwrap(), 120);
        assert_eq!(config.size_from_progress(0.5).unwrap(), 66);
    }

    #[test]
    fn test_default_size() {
        assert_eq!(VoxelizerConfig::default().default_size(), 33);
    }

    #[test]
    fn test_progress_out_of_range() {
        let config = VoxelizerConfig::default();
        assert!(matches!(
            config.size_from_progress(1.5),
            Err(VoxelizeError::InvalidProgress(_))
        ));
        assert!(config.size_from_progress(-0.1).is_err());
        assert!(config.size_from_progress(f32::NAN).is_err());
    }

    #[test]
    fn test_validate_size() {
        let config = VoxelizerConfig::default();
        assert_eq!(config.validate_size(12).unwrap(), 12);
        assert_eq!(config.validate_size(120).unwrap(), 120);
        assert!(matches!(
            config.validate_size(11),
            Err(VoxelizeError::SizeOutOfRange { size: 11, min: 12, max: 120 })
        ));
        assert!(config.validate_size(121).is_err());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = VoxelizerConfig::from_toml_str("max_size = 64\n").unwrap();
        assert_eq!(config.min_size, 12);
        assert_eq!(config.max_size, 64);
        assert_eq!(config.max_indices_per_batch, 2048);
    }

    #[test]
    fn test_toml_rejects_inverted_range() {
        let result = VoxelizerConfig::from_toml_str("min_size = 50\nmax_size = 20\n");
        assert!(matches!(result, Err(VoxelizeError::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_rejects_oversized_max() {
        let result = VoxelizerConfig::from_toml_str("max_size = 3000000\n");
        assert!(matches!(result, Err(VoxelizeError::InvalidConfig(_))));

        let at_limit = VoxelizerConfig::from_toml_str("max_size = 512\n").unwrap();
        assert_eq!(at_limit.validate_size(512).unwrap(), 512);
    }

    #[test]
    fn test_toml_syntax_error() {
        let result = VoxelizerConfig::from_toml_str("min_size = ");
        assert!(matches!(result, Err(VoxelizeError::ConfigParse(_))));
    }
}
