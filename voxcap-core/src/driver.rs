//! Tick-driven capture → compile state machine.
//!
//! The host calls [`Voxelizer::tick`] once per frame. Each tick captures one
//! depth slice; the tick that captures the last slice also compiles the grid
//! and emits every batch before returning. A size request at any point
//! discards the current run and restarts capture from slice 0.

use crate::accumulator::VoxelAccumulator;
use crate::capture::RasterCapture;
use crate::compiler::{BatchCompiler, CompileStats, MeshSink};
use crate::config::VoxelizerConfig;
use crate::error::Result;
use crate::grid::VoxelGrid;
use crate::template::UnitTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Capturing { cursor: usize },
    Compiling,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do.
    Idle,
    /// Captured slice `cursor - 1`; more slices remain.
    Captured { cursor: usize, size: usize },
    /// Captured the last slice and emitted all batches.
    Completed(CompileStats),
}

impl TickOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, TickOutcome::Completed(_))
    }
}

pub struct Voxelizer<C: RasterCapture> {
    config: VoxelizerConfig,
    capture: C,
    template: UnitTemplate,
    accumulator: VoxelAccumulator,
    compiler: BatchCompiler,
    state: DriverState,
    last_stats: Option<CompileStats>,
}

impl<C: RasterCapture> Voxelizer<C> {
    /// Validate the configuration and check that one template stamp fits in
    /// a batch.
    pub fn new(config: VoxelizerConfig, capture: C, template: UnitTemplate) -> Result<Self> {
        config.validate()?;
        let compiler = BatchCompiler::new(config.max_indices_per_batch);
        compiler.check_template(&template)?;
        Ok(Self {
            config,
            capture,
            template,
            accumulator: VoxelAccumulator::new(),
            compiler,
            state: DriverState::Idle,
            last_stats: None,
        })
    }

    /// Start the first run at the configured default size.
    pub fn initialize<S: MeshSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let size = self.config.default_size();
        self.request_size(size, sink)
    }

    /// Restart capture on a freshly allocated `size³` grid.
    ///
    /// Previously emitted output is cleared from `sink`; an in-flight run is
    /// abandoned without emitting anything. Out-of-range sizes leave the
    /// current run untouched.
    pub fn request_size<S: MeshSink + ?Sized>(
        &mut self,
        size: usize,
        sink: &mut S,
    ) -> Result<usize> {
        let size = self.config.validate_size(size)?;
        if let DriverState::Capturing { cursor } = self.state {
            log::debug!(
                "abandoning capture at slice {cursor} of {}",
                self.accumulator.size()
            );
        }
        sink.clear();
        let rig = self.accumulator.begin_capture(size);
        self.capture.configure(&rig);
        self.last_stats = None;
        self.state = DriverState::Capturing { cursor: 0 };
        Ok(size)
    }

    /// Size control entry point: map a `[0, 1]` position to a grid size and
    /// restart.
    pub fn request_progress<S: MeshSink + ?Sized>(
        &mut self,
        progress: f32,
        sink: &mut S,
    ) -> Result<usize> {
        let size = self.config.size_from_progress(progress)?;
        self.request_size(size, sink)
    }

    /// Advance one step.
    pub fn tick<S: MeshSink + ?Sized>(&mut self, sink: &mut S) -> Result<TickOutcome> {
        match self.state {
            DriverState::Idle | DriverState::Compiling => Ok(TickOutcome::Idle),
            DriverState::Capturing { .. } => {
                let done = self.accumulator.capture_one_slice(&mut self.capture);
                let cursor = self.accumulator.cursor();
                if !done {
                    self.state = DriverState::Capturing { cursor };
                    return Ok(TickOutcome::Captured {
                        cursor,
                        size: self.accumulator.size(),
                    });
                }

                self.state = DriverState::Compiling;
                self.capture.deactivate();
                let result = self
                    .compiler
                    .compile(self.accumulator.grid(), &self.template, sink);
                self.state = DriverState::Idle;
                let stats = result?;
                self.last_stats = Some(stats);
                Ok(TickOutcome::Completed(stats))
            }
        }
    }

    /// Tick until the current run completes. Returns `None` when idle.
    pub fn run_to_completion<S: MeshSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<Option<CompileStats>> {
        loop {
            match self.tick(sink)? {
                TickOutcome::Idle => return Ok(None),
                TickOutcome::Captured { .. } => {}
                TickOutcome::Completed(stats) => return Ok(Some(stats)),
            }
        }
    }

    /// Stop capturing and release the grid.
    pub fn shutdown(&mut self) {
        self.capture.deactivate();
        self.accumulator.release();
        self.state = DriverState::Idle;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn size(&self) -> usize {
        self.accumulator.size()
    }

    pub fn grid(&self) -> &VoxelGrid {
        self.accumulator.grid()
    }

    pub fn last_stats(&self) -> Option<CompileStats> {
        self.last_stats
    }

    pub fn config(&self) -> &VoxelizerConfig {
        &self.config
    }

    pub fn template(&self) -> &UnitTemplate {
        &self.template
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }
}
