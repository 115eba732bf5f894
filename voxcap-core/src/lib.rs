/// Voxcap Core - slice-capture voxelization and batched voxel meshes
///
/// Three orthographic cameras sweep a one-voxel clip window through the unit
/// cube. Each captured slice is summed into an RGBA voxel grid, and the
/// finished grid is compiled into merged, draw-ready mesh batches.

pub mod accumulator;
pub mod capture;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod projection;
pub mod raster;
pub mod slice;
pub mod stl;
pub mod template;
pub mod transform;

// Re-export commonly used types
pub use accumulator::VoxelAccumulator;
pub use capture::{Axis, CaptureRig, ClipWindow, RasterCapture};
pub use compiler::{BatchCompiler, CompileStats, MeshBatch, MeshSink, VoxelInstance};
pub use config::VoxelizerConfig;
pub use driver::{DriverState, TickOutcome, Voxelizer};
pub use error::{Result, StlError, VoxelizeError};
pub use geometry::{Bounds, Mesh, Rgba8, Triangle, Vertex};
pub use grid::{Cell, VoxelGrid};
pub use projection::{Camera, ProjectionMode};
pub use raster::SoftwareCapture;
pub use slice::SliceBuffer;
pub use template::UnitTemplate;
pub use transform::{Transform, ViewRotation};
