//! # Remote Entity Models
//!
//! Typed, read-only snapshots of the Brigade resources the exporter samples.
//! Only the fields the aggregation needs are modelled; everything else in the
//! upstream payloads is ignored during deserialization.

pub mod event;
pub mod list;
pub mod phase;

pub use event::{Event, Job, JobStatus, ObjectMeta, Worker, WorkerStatus};
pub use list::{CountOnlyPage, ListMeta, ListOptions, ListPage, SubstrateJobCount};
pub use phase::{JobPhase, WorkerPhase};

/// One page of an event listing
pub type EventPage = ListPage<Event>;
