//! CSP violation-report pipeline: payload parsing, noise filtering and
//! logging of the reports that remain.

pub mod endpoint;
pub mod filter;
pub mod logger;
pub mod noise;
pub mod report;

pub use endpoint::ViolationReportEndpoint;
pub use filter::Filter;
pub use logger::{LogFormatter, Logger};
pub use noise::NoiseDetector;
pub use report::Report;
