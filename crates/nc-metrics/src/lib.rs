//! nc-metrics: turns serverinfo snapshots into Prometheus metrics.
//!
//! # Architecture
//!
//! ```text
//! Schema (built once at startup)
//!   └── MetricDesc per metric family (name, help, type, label names)
//!
//! map_snapshot(&Schema, &Snapshot) → Vec<Observation>
//!   └── pure, fixed order, skips families whose source is absent
//!
//! map_process(&Schema, &ProcessStats) → Vec<Observation>
//!   └── process_* families of the exporter itself
//!
//! render_prometheus(&[Observation]) → text/plain for /metrics endpoint
//! ```

pub mod mapper;
pub mod process;
pub mod prometheus;
pub mod schema;

pub use mapper::map_snapshot;
pub use process::{map_process, ProcessStats};
pub use prometheus::{render_prometheus, CONTENT_TYPE};
pub use schema::{MetricDesc, MetricKind, Observation, Schema, NAMESPACE};
