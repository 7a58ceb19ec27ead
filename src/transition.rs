// Image switching.
// Visual: as you scatter particles they pick up the next picture's colors;
// once enough of them have, the whole field flips to the next picture and
// ignores you for a short rest before it starts counting again.
//
//   Accumulating ──fraction > threshold──▶ (switch) ──▶ Cooldown ──▶ Accumulating
//                                                 └──▶ Complete ──(reset)──▶ Accumulating

use std::time::Duration;

use tracing::{debug, info};

use crate::config::{DisplacedPredicate, EffectConfig};
use crate::field::ParticleField;
use crate::particle::{Particle, ParticleState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Counting displaced particles.
    Accumulating,
    /// Just switched; marks are suppressed until `until`.
    Cooldown { until: Duration },
    /// Just switched with `reset_after_switch`; shows "complete" until
    /// `until`, then particles snap home.
    Complete { until: Duration },
}

/// One image switch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchEvent {
    pub from: usize,
    pub to: usize,
    pub at: Duration,
    /// Displaced fraction that triggered it.
    pub fraction: f32,
}

pub struct TransitionController {
    active_image: usize,
    image_count: usize,
    threshold: f32,
    cooldown: Duration,
    predicate: DisplacedPredicate,
    pixel_threshold: f32,
    reset_after_switch: bool,
    phase: Phase,
    last_switch: Option<Duration>,
    displaced: usize,
    total: usize,
    switches: u64,
}

impl TransitionController {
    pub fn new(cfg: &EffectConfig, image_count: usize, total_particles: usize) -> Self {
        Self {
            active_image: 0,
            image_count: image_count.max(1),
            threshold: cfg.switch_threshold,
            cooldown: cfg.cooldown(),
            predicate: cfg.displaced_predicate,
            pixel_threshold: cfg.pixel_threshold,
            reset_after_switch: cfg.reset_after_switch,
            phase: Phase::Accumulating,
            last_switch: None,
            displaced: 0,
            total: total_particles,
            switches: 0,
        }
    }

    #[inline]
    pub fn active_image(&self) -> usize {
        self.active_image
    }

    #[inline]
    pub fn next_image(&self) -> usize {
        (self.active_image + 1) % self.image_count
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn last_switch(&self) -> Option<Duration> {
        self.last_switch
    }

    #[inline]
    pub fn switch_count(&self) -> u64 {
        self.switches
    }

    #[inline]
    pub fn displaced_count(&self) -> usize {
        self.displaced
    }

    /// Displaced particles over all particles, as of the last `evaluate`.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.displaced as f32 / self.total as f32
    }

    /// `min(fraction / threshold, 1)`; pinned to 1 while showing "complete".
    pub fn progress(&self) -> f32 {
        if self.is_complete() {
            return 1.0;
        }
        (self.fraction() / self.threshold).min(1.0)
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete { .. })
    }

    /// False during cooldown / complete hold: nothing may be marked.
    #[inline]
    pub fn accepting_marks(&self) -> bool {
        self.phase == Phase::Accumulating
    }

    /// Leave cooldown (or the complete hold) once its time is up. Call at the
    /// start of every tick, before the field steps.
    pub fn begin_tick(&mut self, field: &mut ParticleField, now: Duration) {
        match self.phase {
            Phase::Accumulating => {}
            Phase::Cooldown { until } if now >= until => {
                debug!(image = self.active_image, "cooldown over");
                self.phase = Phase::Accumulating;
            }
            Phase::Complete { until } if now >= until => {
                debug!(image = self.active_image, "complete hold over, resetting particles");
                field.reset_motion();
                self.phase = Phase::Accumulating;
            }
            Phase::Cooldown { .. } | Phase::Complete { .. } => {}
        }
    }

    /// The field reports a particle inside the pointer radius.
    pub fn note_interaction(&self, p: &mut Particle) {
        if !self.accepting_marks() {
            return;
        }
        p.touched = true;
        if self.predicate == DisplacedPredicate::InteractionFlag {
            self.mark(p);
        }
    }

    /// Tag as displaced and show the next image's color.
    fn mark(&self, p: &mut Particle) {
        if p.state == ParticleState::Normal {
            p.state = ParticleState::Displaced;
            p.image = self.next_image();
        }
    }

    /// Count displaced particles and switch when the fraction is over the
    /// threshold. Call once per tick after the field steps.
    pub fn evaluate(&mut self, field: &mut ParticleField, now: Duration) -> Option<SwitchEvent> {
        if self.accepting_marks() && self.predicate == DisplacedPredicate::PixelDistance {
            for p in field.particles_mut() {
                if p.touched && p.displacement() > self.pixel_threshold {
                    self.mark(p);
                }
            }
        }

        self.total = field.len();
        self.displaced =
            field.particles().iter().filter(|p| p.state == ParticleState::Displaced).count();

        if !self.accepting_marks() || self.total == 0 {
            return None;
        }
        let fraction = self.fraction();
        if fraction <= self.threshold {
            return None;
        }
        Some(self.switch(field, now, fraction))
    }

    fn switch(&mut self, field: &mut ParticleField, now: Duration, fraction: f32) -> SwitchEvent {
        let from = self.active_image;
        let to = self.next_image();
        for p in field.particles_mut() {
            p.image = to;
            p.state = ParticleState::Normal;
            p.touched = false;
        }
        self.active_image = to;
        self.last_switch = Some(now);
        self.displaced = 0;
        self.switches += 1;
        let until = now + self.cooldown;
        self.phase = if self.reset_after_switch {
            Phase::Complete { until }
        } else {
            Phase::Cooldown { until }
        };
        info!(from, to, fraction, at_ms = now.as_millis() as u64, "image switch");
        SwitchEvent { from, to, at: now, fraction }
    }
}
