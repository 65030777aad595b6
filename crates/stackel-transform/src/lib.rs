//! In-place model transformations for Stackel.
//!
//! A bilevel quadratic program becomes a mixed-integer linear program through
//! an ordered sequence of stages, each rewriting the model in place and
//! recording what it created in a [`TransformationProvenance`]:
//!
//! 1. [`MpecStage`]: replace the lower-level block with its KKT conditions
//! 2. [`DisjunctionStage`]: rewrite complementarities as either-or choices
//! 3. [`BigMStage`] (complementarity pass): linearize those choices
//! 4. [`BilinearStage`]: replace binary-continuous objective products
//! 5. [`BigMStage`] (bilinear pass): linearize the product choices
//!
//! [`TransformationPipeline::standard`] wires the stages in that order; the
//! provenance lets the result reconciler restore the caller's model view
//! afterwards.

mod bigm;
mod bilinear;
mod disjunction;
mod error;
mod mpec;
mod pipeline;
mod provenance;
mod stage;

pub use bigm::BigMStage;
pub use bilinear::BilinearStage;
pub use disjunction::DisjunctionStage;
pub use error::{TransformationError, TransformationErrorKind};
pub use mpec::MpecStage;
pub use pipeline::TransformationPipeline;
pub use provenance::{StageArtifacts, TransformationProvenance};
pub use stage::TransformationStage;
