//! nc-collector: one fetch-decode-map cycle per scrape.
//!
//! # Architecture
//!
//! ```text
//! Collector (shared across concurrent scrapes)
//!   ├── ServerInfoClient::fetch() → Snapshot   (GET + decode)
//!   ├── map_snapshot() → data observations
//!   ├── result_ok gauge (1 or 0)
//!   ├── requests{status="ok"|"ko"} counters (atomic)
//!   └── ProcessSampler::sample() → process_* families (sysinfo)
//! ```
//!
//! A failed fetch never surfaces as an error to the caller: it is logged,
//! counted, and reported through `result_ok = 0`.

pub mod collector;
pub mod error;
pub mod fetch;
pub mod process;

pub use collector::Collector;
pub use error::ScrapeError;
pub use fetch::ServerInfoClient;
pub use process::ProcessSampler;
