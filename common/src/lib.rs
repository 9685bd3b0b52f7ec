pub mod error;
pub mod partition;
pub mod protocol;
pub mod wordcount;

pub use error::TaskError;
pub use partition::{Layout, PartitionTable};
pub use protocol::{
    JobParameters, Phase, PollOutcome, TaskAssignment, TaskCompleteRequest, TaskCompleteResponse,
    TaskId,
};
