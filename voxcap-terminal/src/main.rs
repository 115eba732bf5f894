/// Voxcap terminal viewer
///
/// Usage: voxcap-terminal [MODEL.stl] [--size N] [--config FILE]
///
/// Controls:
///   - +/-: Change grid resolution (restarts capture)
///   - WASD / Arrow Keys: Rotate the view
///   - M: Toggle source model / voxel output
///   - Q/ESC: Quit

use std::env;
use std::fs;
use std::io;
use voxcap_core::{stl, Mesh, VoxelizerConfig};
use voxcap_terminal::{voxelize_error, TerminalApp};

struct Args {
    model: Option<String>,
    size: Option<usize>,
    config: Option<String>,
}

fn parse_args() -> io::Result<Args> {
    let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidInput, msg);
    let mut args = Args {
        model: None,
        size: None,
        config: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--size" {
            let value = iter.next().ok_or_else(|| invalid("--size needs a value".into()))?;
            let size = value
                .parse()
                .map_err(|e| invalid(format!("invalid --size {}: {}", value, e)))?;
            args.size = Some(size);
        } else if arg == "--config" {
            args.config = Some(iter.next().ok_or_else(|| invalid("--config needs a path".into()))?);
        } else if args.model.is_none() {
            args.model = Some(arg);
        } else {
            return Err(invalid(format!("unexpected argument: {}", arg)));
        }
    }
    Ok(args)
}

fn load_model(path: Option<&str>) -> io::Result<Mesh> {
    let Some(path) = path else {
        return Ok(Mesh::uv_sphere(0.5, 24, 12).painted([230, 120, 40, 255]));
    };
    let data = fs::read(path).map_err(|e| {
        io::Error::new(io::ErrorKind::NotFound, format!("Failed to read STL file: {}", e))
    })?;
    let mesh = stl::parse_stl(&data).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Failed to parse STL: {}", e))
    })?;
    log::info!("loaded {} triangles from {}", mesh.triangles.len(), path);
    Ok(mesh.painted([180, 200, 230, 255]))
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => VoxelizerConfig::load(path).map_err(voxelize_error)?,
        None => VoxelizerConfig::default(),
    };
    let model = load_model(args.model.as_deref())?;

    let mut app = TerminalApp::new(model, config, args.size)?;
    app.run()
}
