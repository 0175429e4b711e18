//! Domain model (ids, states, messages, outcomes, records).

pub mod ids;
pub mod message;
pub mod outcome;
pub mod record;
pub mod state;

pub use ids::TaskId;
pub use message::{Kwargs, Message};
pub use outcome::Outcome;
pub use record::ResultRecord;
pub use state::TaskState;
