// One simulated block.
// Visual: a small colored square that sits on its home cell, gets shoved
// away when the pointer bubble reaches it, and drifts (or springs) back.

use crate::config::MotionModel;
use crate::pointer::PointerField;

/// Squared distances never go below this; keeps the force finite.
pub const MIN_DIST_SQ: f32 = 0.1;

/// Tag owned by the transition controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParticleState {
    #[default]
    Normal,
    /// Counts toward the switch fraction and shows the next image's color.
    Displaced,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub origin_x: i32,
    pub origin_y: i32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Position within the owning particle set.
    pub slot: usize,
    /// Which image's set the color is currently read from.
    pub image: usize,
    pub state: ParticleState,
    /// Has been inside the pointer radius since the last switch.
    pub touched: bool,
}

/// Inverse-square repulsion: `-radius_sq / dist_sq`.
#[inline]
pub fn repulsion(radius_sq: f32, dist_sq: f32) -> f32 {
    -radius_sq / dist_sq
}

impl Particle {
    /// A particle resting on its origin, colored from `image`.
    pub fn new(origin_x: i32, origin_y: i32, slot: usize, image: usize) -> Self {
        Self {
            origin_x,
            origin_y,
            x: origin_x as f32,
            y: origin_y as f32,
            vx: 0.0,
            vy: 0.0,
            slot,
            image,
            state: ParticleState::Normal,
            touched: false,
        }
    }

    /// Same origin, slot and color source; motion and flags reset.
    pub fn at_rest(&self) -> Self {
        Self::new(self.origin_x, self.origin_y, self.slot, self.image)
    }

    /// Snap back home without touching color or flags.
    pub fn reset_motion(&mut self) {
        self.x = self.origin_x as f32;
        self.y = self.origin_y as f32;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Largest axis distance from origin.
    #[inline]
    pub fn displacement(&self) -> f32 {
        (self.x - self.origin_x as f32).abs().max((self.y - self.origin_y as f32).abs())
    }

    /// Adds the pointer's push to the velocity. Returns true when the
    /// particle was inside the radius this tick.
    pub fn apply_pointer(&mut self, pointer: &PointerField) -> bool {
        let Some((px, py)) = pointer.position() else { return false };
        let dx = px - self.x;
        let dy = py - self.y;
        let dist_sq = (dx * dx + dy * dy).max(MIN_DIST_SQ);
        if dist_sq >= pointer.radius_sq() {
            return false;
        }
        let force = repulsion(pointer.radius_sq(), dist_sq);
        let angle = dy.atan2(dx);
        self.vx += force * angle.cos();
        self.vy += force * angle.sin();
        true
    }

    /// Friction, then position update.
    pub fn integrate(&mut self, model: MotionModel, friction: f32, ease: f32) {
        self.vx *= friction;
        self.vy *= friction;
        match model {
            MotionModel::SpringReturn => {
                self.x += self.vx + (self.origin_x as f32 - self.x) * ease;
                self.y += self.vy + (self.origin_y as f32 - self.y) * ease;
            }
            MotionModel::FreeDrift => {
                self.x += self.vx;
                self.y += self.vy;
            }
        }
    }
}
