//! HTTP contract of the violation-report endpoint.
//!
//! Accepts the browser's `POST {"csp-report": {...}}`, answers 204 whether
//! the report was logged or filtered (the browser does not care), 400 on a
//! malformed payload and 411 on an empty body. Parsing errors never crash
//! the process.

use crate::http::{Request, Response};
use crate::report::{Filter, Logger, Report};

pub struct ViolationReportEndpoint {
    filter: Filter,
    logger: Logger,
}

impl Default for ViolationReportEndpoint {
    fn default() -> Self {
        Self::new(Filter::with_defaults(), Logger::default())
    }
}

impl ViolationReportEndpoint {
    pub fn new(filter: Filter, logger: Logger) -> Self {
        Self { filter, logger }
    }

    pub fn handle(&self, request: &Request) -> Response {
        let report = match Report::from_request(request) {
            Ok(report) => report,
            Err(err) => {
                log::debug!("rejected CSP report: {}", err);
                return match err.status_code() {
                    411 => Response::length_required(Some("No report data sent")),
                    _ => Response::bad_request(Some(&err.to_string())),
                };
            }
        };

        if !self.filter.filter(request, &report) {
            self.logger.log(request, &report);
        }
        Response::no_content()
    }
}
