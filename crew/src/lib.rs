#![deny(missing_docs)]
//! Fact-check and content crews: multi-step prompt pipelines over Rig providers.
//!
//! A crew runs a fixed sequence of roles (researcher, fact checker, writer, editor),
//! threading each reply into the next prompt, and hands the final reply to the
//! `veracity-extract` engine. Backends sit behind the [`StepRunner`] trait so that
//! pipelines can be driven by any provider, or by a scripted runner in tests.

/// Rig provider clients.
pub mod backends;
/// Crew configuration.
pub mod config;
/// The fact-check and content pipelines.
pub mod crew;
/// Error types for the crew.
pub mod errors;
/// Prompt construction and threading.
pub mod prompt;
/// Agent roles.
pub mod roles;
/// Model selection.
pub mod router;
/// The backend seam.
pub mod runner;

pub use config::CrewConfig;
pub use crew::ResearchCrew;
pub use errors::{CrewError, TransportError};
pub use prompt::{PromptSpec, StepOutput};
pub use roles::AgentRole;
pub use router::{select_model, ModelType, ResearchDepth};
pub use runner::{RigRunner, StepRunner};
