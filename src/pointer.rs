// Pointer influence field.
// Visual: moving the mouse inflates an invisible "push bubble" around the
// cursor; when you stop, the bubble shrinks back to almost nothing.

use crate::config::EffectConfig;

/// Pointer position plus its squared influence radius.
///
/// `radius_sq` always stays in `[1, max_radius_sq]`. Growth is proportional
/// to the current radius, so it accelerates while small and is clamped at the
/// cap; decay mirrors it and floors at 1.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerField {
    position: Option<(f32, f32)>, // None until the first observation
    radius_sq: f32,
    max_radius_sq: f32,
    growth_rate: f32,
    decay_rate: f32,
}

impl PointerField {
    pub fn new(max_radius_sq: f32, growth_rate: f32, decay_rate: f32) -> Self {
        Self {
            position: None,
            radius_sq: 1.0,
            max_radius_sq: max_radius_sq.max(1.0),
            growth_rate,
            decay_rate,
        }
    }

    pub fn from_config(cfg: &EffectConfig) -> Self {
        Self::new(cfg.max_radius_sq(), cfg.radius_growth, cfg.radius_decay)
    }

    /// New pointer input, already in simulation space. Each call is one
    /// growth step; `Effect` calls it at most once per tick.
    pub fn observe(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
        if self.radius_sq < self.max_radius_sq {
            self.radius_sq += self.radius_sq.sqrt() * self.growth_rate;
            self.radius_sq = self.radius_sq.min(self.max_radius_sq);
        }
    }

    /// Passive shrink, once per tick.
    pub fn decay(&mut self) {
        self.radius_sq -= self.radius_sq.sqrt() * self.decay_rate;
        if !(self.radius_sq >= 1.0) {
            self.radius_sq = 1.0;
        }
    }

    /// Last observed position; `None` means the pointer exerts no force.
    #[inline]
    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    #[inline]
    pub fn radius_sq(&self) -> f32 {
        self.radius_sq
    }

    #[inline]
    pub fn max_radius_sq(&self) -> f32 {
        self.max_radius_sq
    }
}

/// Maps viewport coordinates (window / screen) into simulation space:
/// `sim = (viewport - origin) * (sim_width / rendered_width)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMapping {
    pub origin_x: f32,
    pub origin_y: f32,
    pub scale: f32,
}

impl ViewportMapping {
    /// `origin` is where the canvas' top-left lands in the viewport,
    /// `rendered_width` how wide it is drawn there.
    pub fn new(origin: (f32, f32), sim_width: f32, rendered_width: f32) -> Self {
        let scale = if rendered_width > 0.0 { sim_width / rendered_width } else { 1.0 };
        Self { origin_x: origin.0, origin_y: origin.1, scale }
    }

    #[inline]
    pub fn to_sim(&self, vx: f32, vy: f32) -> (f32, f32) {
        ((vx - self.origin_x) * self.scale, (vy - self.origin_y) * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_at_radius_one() {
        let p = PointerField::new(2500.0, 5.0, 2.0);
        assert_eq!(p.position(), None);
        assert_eq!(p.radius_sq(), 1.0);
    }

    #[test]
    fn observe_grows_by_sqrt_times_rate() {
        let mut p = PointerField::new(2500.0, 5.0, 2.0);
        p.observe(3.0, 4.0);
        assert_eq!(p.position(), Some((3.0, 4.0)));
        assert_eq!(p.radius_sq(), 6.0); // 1 + sqrt(1) * 5
        p.observe(3.0, 4.0);
        assert!((p.radius_sq() - (6.0 + 6f32.sqrt() * 5.0)).abs() < 1e-5);
    }

    #[test]
    fn growth_is_capped() {
        let mut p = PointerField::new(100.0, 50.0, 0.0);
        for _ in 0..20 {
            p.observe(0.0, 0.0);
        }
        assert_eq!(p.radius_sq(), 100.0);
    }

    #[test]
    fn decay_floors_at_one() {
        let mut p = PointerField::new(2500.0, 5.0, 2.0);
        for _ in 0..30 {
            p.observe(0.0, 0.0);
        }
        for _ in 0..500 {
            p.decay();
        }
        assert_eq!(p.radius_sq(), 1.0);
        // Position survives decay.
        assert_eq!(p.position(), Some((0.0, 0.0)));
    }

    #[test]
    fn viewport_mapping_offsets_then_scales() {
        let m = ViewportMapping::new((100.0, 50.0), 440.0, 220.0);
        assert_eq!(m.to_sim(100.0, 50.0), (0.0, 0.0));
        assert_eq!(m.to_sim(110.0, 60.0), (20.0, 20.0));
        let identity = ViewportMapping::new((0.0, 0.0), 300.0, 300.0);
        assert_eq!(identity.to_sim(12.5, 7.0), (12.5, 7.0));
    }
}
