use glam::Vec2;
use log::{debug, info};

use crate::config::{Config, ConfigError};
use crate::emitter::Emitter;
use crate::renderer::{Canvas, Rgba};

const SEGMENT_WIDTH: f32 = 2.0;
const RAY_WIDTH: f32 = 1.5;
const RAY_COLOR: Rgba = Rgba::new(255, 102, 255, 100);
const EMITTER_COLOR: Rgba = Rgba::new(255, 204, 0, 150);

/// Static line obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub color: Rgba,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2, color: Rgba) -> Self {
        Self { a, b, color }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { emitter: usize },
}

pub struct World {
    segments: Vec<Segment>,
    emitters: Vec<Emitter>,
    drag: DragState,
}

impl World {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut channel = || rng.u8(100..=255);

        let segments = config
            .segments
            .iter()
            .map(|&[a, b]| Segment::new(a, b, Rgba::opaque(channel(), channel(), channel())))
            .collect();

        let emitter = Emitter::new(
            config.emitter_position,
            config.emitter_radius,
            &config.fan,
        )?;
        info!(
            "Emitter at {} with {} rays",
            emitter.position(),
            emitter.rays().len()
        );

        Ok(Self::from_parts(segments, vec![emitter]))
    }

    pub fn from_parts(segments: Vec<Segment>, emitters: Vec<Emitter>) -> Self {
        Self {
            segments,
            emitters,
            drag: DragState::Idle,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Index of the first emitter under `pointer`.
    pub fn hit_test(&self, pointer: Vec2) -> Option<usize> {
        self.emitters
            .iter()
            .position(|emitter| emitter.contains(pointer))
    }

    /// Pointer pressed: start dragging the emitter under it, if any.
    pub fn press(&mut self, pointer: Vec2) -> bool {
        match self.hit_test(pointer) {
            Some(emitter) => {
                debug!("Drag started on emitter {emitter} at {pointer}");
                self.drag = DragState::Dragging { emitter };
                true
            }
            None => false,
        }
    }

    /// Pointer moved with the button held.
    pub fn drag(&mut self, pointer: Vec2) {
        if let DragState::Dragging { emitter } = self.drag {
            if let Some(emitter) = self.emitters.get_mut(emitter) {
                emitter.reposition(pointer);
            }
        }
    }

    pub fn release(&mut self) {
        if self.is_dragging() {
            debug!("Drag released");
        }
        self.drag = DragState::Idle;
    }

    /// Per-frame update: a dragged emitter follows the pointer.
    pub fn update(&mut self, pointer: Vec2) {
        self.drag(pointer);
    }

    pub fn render(&self, canvas: &mut impl Canvas) {
        canvas.clear(Rgba::BLACK);

        for segment in &self.segments {
            canvas.draw_line(segment.a, segment.b, segment.color, SEGMENT_WIDTH);
        }

        for emitter in &self.emitters {
            let hits = emitter.compute_visibility(&self.segments);
            for (ray, hit) in emitter.rays().iter().zip(&hits) {
                let end = ray.origin + ray.direction() * hit.distance;
                canvas.draw_line(ray.origin, end, RAY_COLOR, RAY_WIDTH);
            }

            // the marker is half the grab radius across
            canvas.fill_circle(emitter.position(), emitter.radius() * 0.5, EMITTER_COLOR);
        }
    }
}
