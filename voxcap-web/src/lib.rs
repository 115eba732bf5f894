/// Voxcap Web - wasm-bindgen host for the slice-capture voxelizer
///
/// JavaScript drives the capture loop from `requestAnimationFrame`, calling
/// `tick()` once per frame, and uploads the finished batches to its own
/// renderer using the position (3 x f32) and color (4 x f32) layout.

use voxcap_core::{
    stl, Mesh, MeshBatch, SoftwareCapture, TickOutcome, UnitTemplate, Voxelizer, VoxelizerConfig,
};
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Completion notice: browser console on wasm, the `log` facade everywhere.
fn report(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(message));
    log::info!("{}", message);
}

#[wasm_bindgen]
pub struct WebVoxelizer {
    voxelizer: Voxelizer<SoftwareCapture>,
    batches: Vec<MeshBatch>,
}

#[wasm_bindgen]
impl WebVoxelizer {
    /// Start voxelizing a built-in sphere at the default resolution.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebVoxelizer, JsValue> {
        let model = Mesh::uv_sphere(0.5, 24, 12).painted([230, 120, 40, 255]);
        Self::with_model(model, VoxelizerConfig::default())
    }

    /// Start voxelizing an STL model, optionally configured from TOML text.
    pub fn from_stl(data: &[u8], config_toml: Option<String>) -> Result<WebVoxelizer, JsValue> {
        let model = stl::parse_stl(data).map_err(js_error)?;
        let config = match config_toml {
            Some(text) => VoxelizerConfig::from_toml_str(&text).map_err(js_error)?,
            None => VoxelizerConfig::default(),
        };
        Self::with_model(model, config)
    }

    /// Size slider handler: `progress` in `[0, 1]`. Returns the new grid size.
    pub fn set_size(&mut self, progress: f32) -> Result<usize, JsValue> {
        self.voxelizer
            .request_progress(progress, &mut self.batches)
            .map_err(js_error)
    }

    /// Capture one slice; returns `true` on the tick that finishes the run.
    pub fn tick(&mut self) -> Result<bool, JsValue> {
        let outcome = self.voxelizer.tick(&mut self.batches).map_err(js_error)?;
        if let TickOutcome::Completed(stats) = outcome {
            report(&format!(
                "voxcap: {} voxels in {} meshes",
                stats.voxels, stats.batches
            ));
        }
        Ok(outcome.is_complete())
    }

    pub fn grid_size(&self) -> usize {
        self.voxelizer.size()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn batch_positions(&self, index: usize) -> Option<Vec<f32>> {
        self.batches.get(index).map(|b| b.positions.clone())
    }

    pub fn batch_colors(&self, index: usize) -> Option<Vec<f32>> {
        self.batches.get(index).map(|b| b.colors.clone())
    }

    pub fn batch_indices(&self, index: usize) -> Option<Vec<u32>> {
        self.batches.get(index).map(|b| b.indices.clone())
    }

    /// Release the grid; the instance idles until the next `set_size`.
    pub fn shutdown(&mut self) {
        self.voxelizer.shutdown();
    }
}

impl WebVoxelizer {
    fn with_model(model: Mesh, config: VoxelizerConfig) -> Result<WebVoxelizer, JsValue> {
        let capture = SoftwareCapture::new(model.fit_unit_cube(0.05));
        let voxelizer =
            Voxelizer::new(config, capture, UnitTemplate::cube()).map_err(js_error)?;
        let mut web = WebVoxelizer {
            voxelizer,
            batches: Vec::new(),
        };
        web.voxelizer
            .initialize(&mut web.batches)
            .map_err(js_error)?;
        Ok(web)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_emits_batches() {
        let mut web = WebVoxelizer::new().unwrap();
        assert_eq!(web.grid_size(), 33);
        web.set_size(0.0).unwrap();
        assert_eq!(web.grid_size(), 12);

        let mut ticks = 0;
        while !web.tick().unwrap() {
            ticks += 1;
        }
        assert_eq!(ticks, 11);
        assert!(web.batch_count() > 0);
        let positions = web.batch_positions(0).unwrap();
        let colors = web.batch_colors(0).unwrap();
        assert_eq!(positions.len() / 3, colors.len() / 4);
        assert!(web.batch_indices(web.batch_count()).is_none());
    }
}
