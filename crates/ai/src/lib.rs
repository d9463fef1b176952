//! `allyflow-ai`
//!
//! **Responsibility:** drafting boundary around the external text-generation
//! service.
//!
//! This crate is intentionally **not** part of the lifecycle model:
//! - It must not depend on the partnership/agreement/promotion aggregates.
//! - It must not persist anything. It returns drafts; callers decide what to store.
//! - Parse-shaped failures are recovered here; collaborator failures are not.

pub mod draft;
pub mod generator;
pub mod pipeline;

pub use draft::DraftKind;
pub use generator::{GenerationError, ScriptedGenerator, TextGenerator, TimeoutGenerator};
pub use pipeline::{DraftError, DraftSource, Drafted, DraftingPipeline};
