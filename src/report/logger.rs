//! Formatting and logging of accepted violation reports.

use crate::http::Request;
use crate::report::Report;

/// Renders one accepted report as a single log line.
#[derive(Debug, Clone, Default)]
pub struct LogFormatter;

impl LogFormatter {
    pub fn format(&self, request: &Request, report: &Report) -> String {
        let mut line = format!(
            "Content-Security-Policy violation: directive: {}, blocked: {}",
            report.directive().unwrap_or("(none)"),
            report.uri().unwrap_or("(none)"),
        );
        if let Some(sample) = report.script_sample() {
            line.push_str(&format!(", sample: {}", sample));
        }
        if let Some(user_agent) = request.user_agent() {
            line.push_str(&format!(", user-agent: {}", user_agent));
        }
        line
    }
}

/// Writes accepted reports to the `log` facade.
pub struct Logger {
    level: log::Level,
    formatter: LogFormatter,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(log::Level::Info)
    }
}

impl Logger {
    pub fn new(level: log::Level) -> Self {
        Self {
            level,
            formatter: LogFormatter,
        }
    }

    pub fn log(&self, request: &Request, report: &Report) {
        log::log!(self.level, "{}", self.formatter.format(request, report));
    }
}
