//! # Gauges
//!
//! The gauge catalogue, the [`GaugeStore`] that owns the live values, and
//! point-in-time snapshots of it.
//!
//! ```text
//!   Aggregator ──writes──▶ GaugeStore ◀──reads── /metrics handler
//! ```

pub mod catalogue;
pub mod snapshot;
pub mod store;

pub use catalogue::{GaugeDef, CATALOGUE};
pub use snapshot::{FamilySnapshot, GaugeSnapshot};
pub use store::{GaugeStore, LabelKey};
