//! Voxel-to-mesh compilation.
//!
//! Every occupied cell becomes one stamped copy of the unit template, scaled
//! to one voxel edge, moved to the cell position and painted with the cell's
//! average color. Stamps are merged into [`MeshBatch`]es whose index count
//! never exceeds the configured ceiling.

use nalgebra::Vector3;

use crate::error::{Result, VoxelizeError};
use crate::geometry::{Mesh, Triangle, Vertex};
use crate::grid::VoxelGrid;
use crate::template::UnitTemplate;

/// Vertex attribute names understood by the host mesh utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeName {
    Position,
    Color,
}

/// Component format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Rgb32F,
    Rgba32F,
}

impl Format {
    pub fn components(self) -> usize {
        match self {
            Format::Rgb32F => 3,
            Format::Rgba32F => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: AttributeName,
    pub format: Format,
}

/// Layout declared for every emitted batch.
pub const VERTEX_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        name: AttributeName::Position,
        format: Format::Rgb32F,
    },
    VertexAttribute {
        name: AttributeName::Color,
        format: Format::Rgba32F,
    },
];

/// One merged mesh: parallel position/color streams plus triangle indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBatch {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBatch {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / Format::Rgb32F.components()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn layout(&self) -> &'static [VertexAttribute] {
        &VERTEX_LAYOUT
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.indices.clear();
    }

    /// Expand into flat-colored triangles for renderers that draw `Mesh`.
    pub fn to_mesh(&self) -> Mesh {
        let vertex = |i: u32| {
            let p = &self.positions[i as usize * 3..i as usize * 3 + 3];
            Vertex::new(p[0], p[1], p[2], 0.0, 0.0, 0.0)
        };
        let color = |i: u32| {
            let c = &self.colors[i as usize * 4..i as usize * 4 + 3];
            let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            [byte(c[0]), byte(c[1]), byte(c[2]), 255]
        };

        let mut mesh = Mesh::with_capacity(self.indices.len() / 3);
        for tri in self.indices.chunks_exact(3) {
            let mut triangle = Triangle::new(vertex(tri[0]), vertex(tri[1]), vertex(tri[2]))
                .with_color(color(tri[0]));
            let normal = triangle.calculate_normal();
            for v in &mut triangle.vertices {
                v.normal = normal;
            }
            mesh.add_triangle(triangle);
        }
        mesh
    }
}

/// Receiver of finished batches (the host's mesh/node submission).
pub trait MeshSink {
    fn emit(&mut self, batch: MeshBatch);

    /// Drop everything emitted so far.
    fn clear(&mut self) {}
}

impl MeshSink for Vec<MeshBatch> {
    fn emit(&mut self, batch: MeshBatch) {
        self.push(batch);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Placement of one occupied voxel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelInstance {
    pub cell: [usize; 3],
    /// World translation: `cell * voxel_len - 0.5`.
    pub offset: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// `(r/a, g/a, b/a, 1)`.
    pub color: [f32; 4],
}

/// Per-axis scale fitting the template into one voxel; a zero template
/// extent gives a zero scale on that axis.
pub fn stamp_scale(template: &UnitTemplate, voxel_len: f32) -> Vector3<f32> {
    template
        .extent()
        .map(|e| if e == 0.0 { 0.0 } else { voxel_len / e })
}

/// Every occupied cell of `grid` as an instance, in x, y, z scan order.
pub fn instances<'a>(
    grid: &'a VoxelGrid,
    template: &UnitTemplate,
) -> impl Iterator<Item = VoxelInstance> + 'a {
    let voxel_len = 1.0 / grid.size().max(1) as f32;
    let scale = stamp_scale(template, voxel_len);
    grid.occupied().filter_map(move |(cell, sums)| {
        let color = sums.average_color()?;
        let offset = Vector3::new(cell[0] as f32, cell[1] as f32, cell[2] as f32) * voxel_len
            - Vector3::repeat(0.5);
        Some(VoxelInstance {
            cell,
            offset,
            scale,
            color,
        })
    })
}

/// Totals for one compile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub voxels: usize,
    pub batches: usize,
    pub vertices: usize,
    pub indices: usize,
}

/// Greedy stamp packer with a hard per-batch index ceiling.
#[derive(Debug)]
pub struct BatchCompiler {
    max_indices: usize,
    batch: MeshBatch,
    stats: CompileStats,
}

impl BatchCompiler {
    pub fn new(max_indices: usize) -> Self {
        Self {
            max_indices,
            batch: MeshBatch::default(),
            stats: CompileStats::default(),
        }
    }

    pub fn max_indices(&self) -> usize {
        self.max_indices
    }

    /// Check that at least one stamp of `template` fits in a batch.
    pub fn check_template(&self, template: &UnitTemplate) -> Result<()> {
        if template.index_count() > self.max_indices {
            return Err(VoxelizeError::TemplateTooLarge {
                indices: template.index_count(),
                max: self.max_indices,
            });
        }
        Ok(())
    }

    /// Stamp every occupied voxel and hand finished batches to `sink`.
    ///
    /// A batch is flushed as soon as one more stamp would push it past the
    /// ceiling, so no batch exceeds it and no empty batch is ever emitted.
    pub fn compile<S: MeshSink + ?Sized>(
        &mut self,
        grid: &VoxelGrid,
        template: &UnitTemplate,
        sink: &mut S,
    ) -> Result<CompileStats> {
        self.check_template(template)?;
        self.batch.clear();
        self.stats = CompileStats::default();

        let stamp_indices = template.index_count();
        for instance in instances(grid, template) {
            self.stamp(template, &instance);
            self.stats.voxels += 1;
            if self.batch.indices.len() + stamp_indices > self.max_indices {
                self.flush(sink);
            }
        }
        if !self.batch.is_empty() {
            self.flush(sink);
        }

        log::info!(
            "compiled {} voxels into {} batches ({} vertices)",
            self.stats.voxels,
            self.stats.batches,
            self.stats.vertices
        );
        Ok(self.stats)
    }

    fn stamp(&mut self, template: &UnitTemplate, instance: &VoxelInstance) {
        let base = self.batch.vertex_count() as u32;
        self.batch
            .indices
            .extend(template.indices().iter().map(|&i| base + i));
        for p in template.positions() {
            let scaled = Vector3::from(*p).component_mul(&instance.scale) + instance.offset;
            self.batch.positions.extend_from_slice(scaled.as_slice());
            self.batch.colors.extend_from_slice(&instance.color);
        }
    }

    fn flush<S: MeshSink + ?Sized>(&mut self, sink: &mut S) {
        let batch = std::mem::take(&mut self.batch);
        self.stats.batches += 1;
        self.stats.vertices += batch.vertex_count();
        self.stats.indices += batch.index_count();
        log::debug!(
            "emitting batch {} with {} indices",
            self.stats.batches,
            batch.index_count()
        );
        sink.emit(batch);
    }
}
