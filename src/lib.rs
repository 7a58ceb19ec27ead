// Pixel-particle image dissolve.
//
// Pipeline, one effect instance:
//   images ──decompose──▶ Scene (one ParticleSet per image)
//   Scene ──▶ Effect { ParticleField, PointerField, TransitionController }
//   every frame: observe_pointer → tick → composite → present
//
// Everything here is single-threaded and frame-driven; a tick runs to
// completion and never fails.

pub mod compositor;
pub mod config;
pub mod decompose;
pub mod draw;
pub mod effect;
pub mod error;
pub mod field;
pub mod particle;
pub mod pointer;
pub mod transition;
pub mod types;

pub use config::{DisplacedPredicate, EffectConfig, MotionModel, SlotAlignment};
pub use decompose::{ParticleSet, Scene, decompose, decompose_all};
pub use effect::{Effect, TickReport};
pub use error::{Error, Result};
pub use field::ParticleField;
pub use particle::{Particle, ParticleState};
pub use pointer::{PointerField, ViewportMapping};
pub use transition::{Phase, SwitchEvent, TransitionController};
