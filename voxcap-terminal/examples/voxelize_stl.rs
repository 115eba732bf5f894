/// Example: voxelize an STL file without a terminal UI
///
/// Usage: cargo run --example voxelize_stl -- path/to/file.stl [size]

use std::env;
use std::fs;
use std::io;
use voxcap_core::{
    stl, Mesh, MeshBatch, SoftwareCapture, UnitTemplate, Voxelizer, VoxelizerConfig,
};
use voxcap_terminal::voxelize_error;

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mesh = match args.get(1) {
        Some(path) => {
            let data = fs::read(path)?;
            stl::parse_stl(&data)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        }
        None => {
            eprintln!("Usage: {} <stl-file> [size]", args[0]);
            eprintln!("\nNo STL file provided, using default cube...");
            Mesh::cube(1.0)
        }
    };
    let size = match args.get(2) {
        Some(s) => Some(
            s.parse::<usize>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?,
        ),
        None => None,
    };

    let capture = SoftwareCapture::new(mesh.fit_unit_cube(0.05));
    let mut voxelizer = Voxelizer::new(VoxelizerConfig::default(), capture, UnitTemplate::cube())
        .map_err(voxelize_error)?;

    let mut batches: Vec<MeshBatch> = Vec::new();
    let started = match size {
        Some(size) => voxelizer.request_size(size, &mut batches),
        None => voxelizer.initialize(&mut batches),
    };
    started.map_err(voxelize_error)?;

    let stats = voxelizer
        .run_to_completion(&mut batches)
        .map_err(voxelize_error)?
        .unwrap_or_default();

    println!("grid:     {}^3", voxelizer.size());
    println!("voxels:   {}", stats.voxels);
    println!("meshes:   {}", stats.batches);
    println!("vertices: {}", stats.vertices);
    println!("indices:  {}", stats.indices);
    Ok(())
}
