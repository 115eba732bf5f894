/// Terminal host for the slice-capture voxelizer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use voxcap_core::{
    Camera, Mesh, MeshBatch, SoftwareCapture, TickOutcome, UnitTemplate, ViewRotation,
    VoxelizeError, Voxelizer, VoxelizerConfig,
};

const KEY_HELP: &str = "+/- size  WASD rotate  M model/voxels  Q quit";

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Size control step applied by `+` and `-`.
const PROGRESS_STEP: f32 = 0.05;

/// Tint of the source model while slices are being captured.
const MODEL_TINT: [u8; 4] = [120, 120, 120, 255];

pub fn voxelize_error(e: VoxelizeError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
}

/// Which mesh set the viewer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Model,
    Voxels,
}

/// Main application: captures one slice per frame and previews the result
pub struct TerminalApp {
    voxelizer: Voxelizer<SoftwareCapture>,
    batches: Vec<MeshBatch>,
    preview: Vec<Mesh>,
    model_preview: Mesh,
    view: ViewMode,
    progress: f32,
    status: String,
    rotation: ViewRotation,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Fit `model` into the capture volume and start the first run, at
    /// `size` if given or the configured default otherwise.
    pub fn new(model: Mesh, config: VoxelizerConfig, size: Option<usize>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let model = model.fit_unit_cube(0.05);
        let model_preview = model.clone().painted(MODEL_TINT);

        let progress = config.default_progress;
        let voxelizer = Voxelizer::new(config, SoftwareCapture::new(model), UnitTemplate::cube())
            .map_err(voxelize_error)?;

        let mut app = Self {
            voxelizer,
            batches: Vec::new(),
            preview: Vec::new(),
            model_preview,
            view: ViewMode::Model,
            progress,
            status: String::new(),
            rotation: ViewRotation::new(0.4, 0.6),
            camera: Camera::new(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };

        let started = match size {
            Some(size) => app.voxelizer.request_size(size, &mut app.batches),
            None => app.voxelizer.initialize(&mut app.batches),
        };
        started.map_err(voxelize_error)?;
        app.restarted();
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        self.voxelizer.shutdown();
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            self.update()?;
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_size(PROGRESS_STEP),
                KeyCode::Char('-') | KeyCode::Char('_') => self.adjust_size(-PROGRESS_STEP),
                KeyCode::Char('m') => {
                    self.view = match self.view {
                        ViewMode::Model => ViewMode::Voxels,
                        ViewMode::Voxels => ViewMode::Model,
                    };
                }
                KeyCode::Char('w') | KeyCode::Up => self.rotation.rotate(0.1, 0.0),
                KeyCode::Char('s') | KeyCode::Down => self.rotation.rotate(-0.1, 0.0),
                KeyCode::Char('a') | KeyCode::Left => self.rotation.rotate(0.0, -0.1),
                KeyCode::Char('d') | KeyCode::Right => self.rotation.rotate(0.0, 0.1),
                _ => {}
            },
            Event::Resize(width, height) => {
                self.camera = Camera::new(width as u32, height as u32);
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
        Ok(())
    }

    /// Move the size control and restart capture at the new resolution.
    fn adjust_size(&mut self, delta: f32) {
        let progress = (self.progress + delta).clamp(0.0, 1.0);
        match self.voxelizer.request_progress(progress, &mut self.batches) {
            Ok(_) => {
                self.progress = progress;
                self.restarted();
            }
            Err(e) => {
                log::warn!("size change rejected: {}", e);
                self.status = e.to_string();
            }
        }
    }

    fn restarted(&mut self) {
        self.preview.clear();
        self.view = ViewMode::Model;
        self.status = format!("capturing 0/{}", self.voxelizer.size());
    }

    /// One capture step per frame.
    fn update(&mut self) -> io::Result<()> {
        match self.voxelizer.tick(&mut self.batches).map_err(voxelize_error)? {
            TickOutcome::Idle => {}
            TickOutcome::Captured { cursor, size } => {
                self.status = format!("capturing {}/{}", cursor, size);
            }
            TickOutcome::Completed(stats) => {
                self.preview = self.batches.iter().map(MeshBatch::to_mesh).collect();
                self.view = ViewMode::Voxels;
                self.status = format!(
                    "{} voxels, {} meshes, {} vertices",
                    stats.voxels, stats.batches, stats.vertices
                );
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let model = self.rotation.matrix();

        self.renderer.clear();
        match self.view {
            ViewMode::Model => self.renderer.render_mesh(&self.model_preview, &model, &self.camera),
            ViewMode::Voxels => {
                for mesh in &self.preview {
                    self.renderer.render_mesh(mesh, &model, &self.camera);
                }
            }
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Voxcap | grid {}^3 | {} | FPS: {:.1} | {}",
                self.voxelizer.size(),
                self.status,
                self.fps,
                KEY_HELP
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
