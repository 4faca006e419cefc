//! radstudy-core: assignment engine and response recording for the
//! imaging-guidance survey
//!
//! - **Seeds** - [`derive_seed`] maps an identifier to a stable integer seed
//! - **Assignment** - [`generate_assignment`] draws case order, guidance
//!   flags and the timed condition from a frozen generator ([`rng::StudyRng`])
//! - **Catalog** - [`StudyCatalog`] holds cases, guideline tables and answer options
//! - **Presentation** - [`present_for`] builds the per-participant survey package
//! - **Submissions** - [`record_submission`] parses a posted form and hands it
//!   to the active [`ResponseSink`]
//! - **Identity** - [`issue_identifier`] turns an email into a participant identifier
//!
//! # Quick Start
//!
//! ```
//! use radstudy_core::{derive_seed, generate_assignment};
//!
//! let assignment = generate_assignment(derive_seed("u1"), 4);
//! assert_eq!(assignment.order_string(), "0,1,3,2");
//! assert_eq!(assignment.guidance_bits(), "0110");
//! ```

pub mod assignment;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod presentation;
pub mod rng;
pub mod seed;
pub mod sink;
pub mod submission;

pub use assignment::{Assignment, Condition, generate_assignment};
pub use catalog::{AssetPaths, CatalogError, CategoryPalette, GuidelineOptions, StudyCatalog};
pub use error::{Error, Result};
pub use identity::{IssuedIdentifier, issue_identifier};
pub use presentation::{
    ConditionPolicy, PresentationPackage, assemble_presentation, present_demo, present_for,
};
pub use seed::{Seed, derive_seed};
pub use sink::{FailureKind, ResponseSink, SinkError, StorageConfig, open_sink};
pub use submission::{RawSubmission, RecordingResult, SubmissionError, record_submission};
