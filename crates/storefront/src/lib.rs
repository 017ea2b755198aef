mod deletion;
mod error;
mod page;
mod reactions;
pub mod settings;

pub use deletion::{DeleteTarget, DeletionCoordinator, DeletionOutcome, DeletionPhase};
pub use error::ActionError;
pub use page::{PageOptions, ReviewsPage};
pub use reactions::{ReactOutcome, ReactionCoordinator, ReactionTarget};
