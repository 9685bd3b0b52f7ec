pub mod client;
pub mod config;
pub mod connect;
pub mod console;
pub mod error;
pub mod worker;

pub use client::CoordinatorClient;
pub use connect::RetryPolicy;
pub use error::WorkerError;
pub use worker::{PollStep, RunSummary, Worker};
