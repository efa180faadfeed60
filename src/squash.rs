//! Squashing arbitrary selections of recent commits.
//!
//! A selection that is exactly the newest run of commits is squashed in place
//! with a soft reset. Any other selection is rebuilt on a temporary branch and
//! transplanted back, replaying every unselected commit above it in order.

pub mod error;
pub mod fast_path;
pub mod guard;
pub mod history;
pub mod orchestrator;
pub mod preview;
pub mod reconstruct;
pub mod selection;

pub use error::SquashError;
pub use guard::WorkingTreeGuard;
pub use history::CommitHistory;
pub use orchestrator::{SquashOutcome, Squasher};
pub use preview::{DryRunPreview, PreviewEntry};
pub use reconstruct::{PendingRewrite, Reconstructor, RewriteReport, RewriteStage};
pub use selection::{is_latest_and_contiguous, Selection, SquashPath};
