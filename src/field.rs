// The particle field: every particle of the running effect plus read-only
// access to every image's blocks.
// Visual: this is the whole "picture made of squares" you push around.

use std::sync::Arc;

use crate::config::{EffectConfig, MotionModel, SlotAlignment};
use crate::decompose::{ParticleSet, Scene};
use crate::particle::Particle;
use crate::pointer::PointerField;
use crate::transition::TransitionController;
use crate::types::{ColorBlock, GridCell};

pub struct ParticleField {
    sets: Arc<[ParticleSet]>,
    particles: Vec<Particle>,
    alignment: SlotAlignment,
    motion: MotionModel,
    friction: f32,
    ease: f32,
    block_size: u32,
    width: u32,
    height: u32,
}

impl ParticleField {
    /// One particle per block of the first image (sequence alignment), or
    /// one per cell visible in any image (grid-cell alignment). All start
    /// at rest, colored from image 0.
    pub fn new(scene: &Scene, cfg: &EffectConfig) -> Self {
        let particles: Vec<Particle> = match cfg.slot_alignment {
            SlotAlignment::Sequence => scene
                .sets
                .first()
                .map(|set| {
                    set.cells()
                        .iter()
                        .enumerate()
                        .map(|(slot, c)| Particle::new(c.x as i32, c.y as i32, slot, 0))
                        .collect()
                })
                .unwrap_or_default(),
            SlotAlignment::GridCell => {
                let mut cells: Vec<GridCell> =
                    scene.sets.iter().flat_map(|s| s.cells().iter().copied()).collect();
                cells.sort_unstable_by_key(|c| c.scan_key());
                cells.dedup();
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(slot, c)| Particle::new(c.x as i32, c.y as i32, slot, 0))
                    .collect()
            }
        };

        Self {
            sets: Arc::clone(&scene.sets),
            particles,
            alignment: cfg.slot_alignment,
            motion: cfg.motion_model,
            friction: cfg.friction,
            ease: cfg.ease,
            block_size: scene.block_size,
            width: scene.width,
            height: scene.height,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Canvas size in pixels.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// The block a particle currently shows. `None` draws nothing: the
    /// target image has no block for this slot or cell.
    pub fn block_for(&self, p: &Particle) -> Option<&ColorBlock> {
        let set = self.sets.get(p.image)?;
        match self.alignment {
            SlotAlignment::Sequence => set.block(p.slot),
            SlotAlignment::GridCell => {
                set.block_at(GridCell { x: p.origin_x as u32, y: p.origin_y as u32 })
            }
        }
    }

    /// One simulation tick: pointer push, interaction reporting, friction,
    /// integration.
    pub fn step(&mut self, pointer: &PointerField, transition: &TransitionController) {
        let (motion, friction, ease) = (self.motion, self.friction, self.ease);
        for p in &mut self.particles {
            if p.apply_pointer(pointer) {
                transition.note_interaction(p);
            }
            p.integrate(motion, friction, ease);
        }
    }

    /// Every particle back on its origin with zero velocity.
    pub fn reset_motion(&mut self) {
        for p in &mut self.particles {
            p.reset_motion();
        }
    }
}
