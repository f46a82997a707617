pub mod config;
pub mod decode;
pub mod error;
pub mod snapshot;

pub use config::{Credentials, ExporterConfig};
pub use decode::decode_snapshot;
pub use error::{ConfigError, DecodeError};
pub use snapshot::*;
