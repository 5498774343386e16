#![deny(missing_docs)]
//! Tolerant extraction of structured records from free-text model replies.
//!
//! A model asked for "JSON only" still wraps its answer in prose, markdown fences,
//! or both, sometimes truncates it, and sometimes contradicts itself. This crate
//! turns such a reply into a validated record or a structured failure:
//!
//! - [`locator`] - finds the candidate object inside the reply
//! - [`parser`] - parses it, retrying with cheap normalizations
//! - [`validate`] - checks required fields, coerces and clamps values
//! - [`repair`] - keeps a verification score and its explanation consistent
//! - [`ExtractionEngine`] - runs the stages and downgrades errors to [`FailureRecord`]s
//!
//! ## Example
//!
//! ```
//! use veracity_extract::{ExtractionEngine, RecordContext};
//!
//! let engine = ExtractionEngine::new();
//! let reply = "Sure! ```json\n{\"score\": 150, \"details\": \"All claims hold\"}\n```";
//! let record = engine
//!     .extract_verification(reply, &RecordContext::new("example"))
//!     .unwrap();
//!
//! assert_eq!(record.score, 100.0);
//! assert_eq!(record.details, "Veracity Score: 100 - All claims hold");
//! ```

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod locator;
pub mod metrics;
pub mod parser;
pub mod record;
pub mod repair;
pub mod schema;
pub mod validate;

pub use config::{BoundaryStrategy, ExtractionConfig};
pub use engine::{ExtractionEngine, Stage};
pub use error::{ExtractionError, FailureKind, ParseAttempt};
pub use metrics::{estimate_tokens, ExtractionMetrics};
pub use record::{
    ContentMetadata, ContentRecord, ContentSchemaVariant, FailureRecord, RecordContext,
    RecordShape, RecordStatus, ValidatedRecord, VerificationRecord,
};

/// Common imports for callers of the engine.
pub mod prelude {
    pub use crate::{
        ContentSchemaVariant, ExtractionConfig, ExtractionEngine, FailureRecord, RecordContext,
        RecordShape, ValidatedRecord,
    };
}
