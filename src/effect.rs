// One running dissolve effect: particles, pointer and switcher wired
// together, advanced one tick per frame.
// Visual: call `observe_pointer` whenever the mouse moves, `tick` once per
// frame, then `composite` to get the picture to show.

use std::time::Duration;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::compositor;
use crate::config::EffectConfig;
use crate::decompose::Scene;
use crate::field::ParticleField;
use crate::pointer::PointerField;
use crate::transition::{SwitchEvent, TransitionController};

/// What one tick produced, for UI feedback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// `min(fraction / threshold, 1)`.
    pub progress: f32,
    /// Holding the "complete" state after a switch.
    pub complete: bool,
    pub switched: Option<SwitchEvent>,
}

pub struct Effect {
    field: ParticleField,
    pointer: PointerField,
    transition: TransitionController,
    pending: Option<(f32, f32)>, // latest input since the last tick
    seen_pointer: bool,
}

impl Effect {
    pub fn new(scene: &Scene, cfg: &EffectConfig) -> Self {
        if cfg.drifts_without_reset() {
            warn!("free-drift without reset_after_switch: particles only return home on an explicit reset");
        }
        let field = ParticleField::new(scene, cfg);
        let transition = TransitionController::new(cfg, scene.image_count(), field.len());
        Self {
            field,
            pointer: PointerField::from_config(cfg),
            transition,
            pending: None,
            seen_pointer: false,
        }
    }

    /// Buffer a pointer position (simulation space). Applied at the start of
    /// the next tick; if several arrive in between, the last one wins. The
    /// radius likewise grows at most once per tick, however many
    /// observations were buffered.
    pub fn observe_pointer(&mut self, x: f32, y: f32) {
        self.pending = Some((x, y));
    }

    /// Advance the simulation to `now` (monotonic time since the effect started).
    pub fn tick(&mut self, now: Duration) -> TickReport {
        self.transition.begin_tick(&mut self.field, now);

        if let Some((x, y)) = self.pending.take() {
            if !self.seen_pointer {
                debug!(x, y, "first pointer contact");
                self.seen_pointer = true;
            }
            self.pointer.observe(x, y);
        }

        self.field.step(&self.pointer, &self.transition);
        self.pointer.decay();
        let switched = self.transition.evaluate(&mut self.field, now);

        TickReport {
            progress: self.transition.progress(),
            complete: self.transition.is_complete(),
            switched,
        }
    }

    /// Draw the current state onto `canvas` (cleared first).
    pub fn composite(&self, canvas: &mut RgbaImage) {
        compositor::composite(&self.field, canvas);
    }

    /// A transparent canvas sized to the simulation.
    pub fn new_canvas(&self) -> RgbaImage {
        let (w, h) = self.field.dimensions();
        RgbaImage::new(w, h)
    }

    /// Snap every particle home (velocity zeroed). Colors are kept.
    pub fn reset_particles(&mut self) {
        self.field.reset_motion();
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> &PointerField {
        &self.pointer
    }

    pub fn transition(&self) -> &TransitionController {
        &self.transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::{decompose_all, with_margin};
    use image::Rgba;

    fn scene() -> Scene {
        let a = RgbaImage::from_pixel(40, 40, Rgba([200, 0, 0, 255]));
        let b = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 200, 255]));
        decompose_all(&[a, b], 10, 0).unwrap()
    }

    #[test]
    fn idle_effect_is_a_still_picture() {
        let scene = scene();
        let mut fx = Effect::new(&scene, &EffectConfig::default());
        for i in 0..30 {
            let r = fx.tick(Duration::from_millis(i * 16));
            assert_eq!(r.progress, 0.0);
            assert_eq!(r.switched, None);
        }
        let mut canvas = fx.new_canvas();
        fx.composite(&mut canvas);
        let img = RgbaImage::from_pixel(40, 40, Rgba([200, 0, 0, 255]));
        assert_eq!(canvas, with_margin(&img, 0).unwrap());
    }

    #[test]
    fn last_buffered_observation_wins() {
        let mut fx = Effect::new(&scene(), &EffectConfig::default());
        fx.observe_pointer(1.0, 1.0);
        fx.observe_pointer(30.0, 25.0);
        assert_eq!(fx.pointer().position(), None);
        fx.tick(Duration::ZERO);
        assert_eq!(fx.pointer().position(), Some((30.0, 25.0)));
        // One growth step (1 → 6), then one decay step (6 - sqrt(6)*2).
        let expect = 6.0 - 6f32.sqrt() * 2.0;
        assert!((fx.pointer().radius_sq() - expect).abs() < 1e-5);
    }

    #[test]
    fn pointer_scatters_and_reveals() {
        let mut fx = Effect::new(&scene(), &EffectConfig::default());
        let mut t = 0;
        // The radius needs a few dozen observations to reach the nearest origins.
        for _ in 0..60 {
            fx.observe_pointer(15.0, 15.0);
            let r = fx.tick(Duration::from_millis(t));
            t += 16;
            assert!(r.progress <= 1.0);
        }
        let moved = fx.field().particles().iter().filter(|p| p.displacement() > 0.5).count();
        assert!(moved > 0);
        assert!(fx.transition().displaced_count() > 0 || fx.transition().switch_count() > 0);
    }
}
