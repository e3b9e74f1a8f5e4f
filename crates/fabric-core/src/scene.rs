//! CPU-side state for one visualizer instance: the current graph
//! generation, the grid lines and their retarget scheduler.
//!
//! The web front-end shares a `Scene` between its frame callback and its
//! retarget timer; both run on the same thread and never overlap.

use crate::audio::FrequencySource;
use crate::error::BuildError;
use crate::field::{FieldParams, FrequencyField};
use crate::graph::{Graph, GraphParams};
use crate::grid::{GridLines, RetargetScheduler};
use crate::pipeline::{
    Background, BloomParams, BlurParams, Frame, GridFrame, MeshFrame, Presented, RenderBackend,
};
use crate::settings::{Change, Settings};

pub struct Scene {
    settings: Settings,
    bin_count: usize,
    field: FrequencyField,
    grid: GridLines,
    scheduler: RetargetScheduler,
    scheduler_seed: u64,
    frequencies: Vec<u8>,
    grid_vertices: Vec<f32>,
    generation: u64,
}

impl Scene {
    pub fn new(
        settings: Settings,
        bin_count: usize,
        now_ms: f64,
        scheduler_seed: u64,
    ) -> Result<Self, BuildError> {
        let (field, grid) = Self::build(&settings, bin_count)?;
        let mut scene = Self {
            scheduler: RetargetScheduler::new(now_ms, scheduler_seed),
            scheduler_seed,
            settings,
            bin_count,
            field,
            grid,
            frequencies: Vec::with_capacity(bin_count),
            grid_vertices: Vec::new(),
            generation: 1,
        };
        scene.grid.write_vertices(&mut scene.grid_vertices);
        scene.log_generation();
        Ok(scene)
    }

    fn build(
        settings: &Settings,
        bin_count: usize,
    ) -> Result<(FrequencyField, GridLines), BuildError> {
        let graph = Graph::build(&GraphParams {
            seed: settings.seed,
            total_points: settings.points,
            bin_stride: settings.connected_bins_stride,
            bin_count,
            connected_neighbors: settings.connected_neighbors,
            dampening: settings.dampening,
            stiffness: settings.stiffness,
        })?;
        let grid = GridLines::new(
            settings.grid_lines,
            settings.lines_dampening,
            settings.lines_stiffness,
        );
        Ok((FrequencyField::new(graph), grid))
    }

    /// Full rebuild from the current settings. On error nothing changes.
    pub fn setup(&mut self, now_ms: f64) -> Result<(), BuildError> {
        let (field, grid) = Self::build(&self.settings, self.bin_count)?;
        self.field = field;
        self.grid = grid;
        self.scheduler_seed = self.scheduler_seed.wrapping_add(1);
        self.scheduler = RetargetScheduler::new(now_ms, self.scheduler_seed);
        self.grid.write_vertices(&mut self.grid_vertices);
        self.generation += 1;
        self.log_generation();
        Ok(())
    }

    fn log_generation(&self) {
        let graph = self.field.graph();
        log::info!(
            "[scene] generation={} points={} tracked={} triangles={} grid_lines={}",
            self.generation,
            graph.point_count(),
            graph.tracked_point_count(),
            graph.triangulation.triangle_count(),
            self.grid.len()
        );
    }

    /// Adopt changed settings. Live changes retune springs in place; a
    /// rebuild change runs [`Scene::setup`], keeping the old generation if
    /// the new one cannot be built.
    pub fn apply_settings(
        &mut self,
        settings: &Settings,
        change: Change,
        now_ms: f64,
    ) -> Result<(), BuildError> {
        self.settings = settings.clone();
        match change {
            Change::Live => {
                self.field.retune(settings.dampening, settings.stiffness);
                self.grid.retune(settings.lines_dampening, settings.lines_stiffness);
                Ok(())
            }
            Change::Rebuild => self.setup(now_ms),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn field(&self) -> &FrequencyField {
        &self.field
    }

    pub fn grid(&self) -> &GridLines {
        &self.grid
    }

    pub fn grid_vertices(&self) -> &[f32] {
        &self.grid_vertices
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scheduler(&self) -> &RetargetScheduler {
        &self.scheduler
    }

    /// Timer entry point for the grid retarget scheduler.
    pub fn poll_retargets(&mut self, now_ms: f64) -> usize {
        let stagger = self.settings.lines_animation_offset;
        self.scheduler.poll(now_ms, &mut self.grid, stagger)
    }

    /// Per-frame CPU update: pull the spectrum, diffuse it over the graph and
    /// step the grid lines.
    pub fn update(&mut self, source: &mut dyn FrequencySource) {
        source.frequencies(&mut self.frequencies);
        let params = FieldParams {
            freq_pow: self.settings.freq_pow,
            neighbor_weight: self.settings.neighbor_weight,
        };
        self.field.update(&self.frequencies, &params);
        self.grid.write_vertices(&mut self.grid_vertices);
        self.grid.advance();
    }

    /// Issue the four passes for the current state.
    pub fn render<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        view: [[f32; 4]; 4],
        time: f32,
    ) -> Result<Presented, B::Error> {
        let s = &self.settings;
        let dirty = self.field.take_dirty();
        let mesh = MeshFrame {
            positions: self.field.positions(),
            vertex_count: self.field.vertex_count(),
            dirty,
        };
        let background = Background::new(s.background_rgba(), s.motion_blur, s.motion_blur_amount);
        let grid = GridFrame {
            vertices: &self.grid_vertices,
            vertex_count: self.grid.vertex_count(),
            view,
            time,
            color_offset: s.grid_color_offset,
            max_height: s.grid_max_height,
            basic_opacity: s.grid_basic_opacity,
            segments: s.segments,
        };
        Frame::begin(backend)
            .rasterize(&mesh)?
            .blur(&BlurParams {
                direction: s.blur_direction(),
            })?
            .composite(&background, &grid)?
            .bloom(&BloomParams {
                radius: s.blur_radius,
                blur_weight: s.blur_weight,
                original_weight: s.original_weight,
            })
    }
}
