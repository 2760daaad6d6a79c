//! Transport, subscription lifecycle and session multiplexing

pub mod client;
pub mod clock;
pub mod connection;
pub mod error;
pub mod registry;

pub use client::{GameClient, LogSnapshotSink, Outbound, SessionEvent, SnapshotSink};
pub use clock::ClockDriver;
pub use connection::{connect_and_run, run_connection};
pub use error::{NetworkError, NetworkResult};
pub use registry::{SessionRegistry, SharedSession};
