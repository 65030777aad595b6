//! Bilevel solve orchestration.
//!
//! [`BilevelSolverSession`] drives one solve of a bilevel model: run the
//! transformation pipeline, hand the reformulated model to a leased
//! sub-solver, then reconcile the result back onto the caller's view of the
//! model. The session borrows the model for its lifetime and releases the
//! borrow on every path, success or failure.

mod error;
mod reconcile;
mod result;
mod session;
mod subsession;

pub use error::BilevelError;
pub use reconcile::{Reconciled, ResultReconciler};
pub use result::SolveResult;
pub use session::{BilevelSolverSession, SessionState};
pub use subsession::SubsolverSession;
