//! Inbound/Outbound middleware pattern
//!
//! A two-phase middleware seam that separates request processing (inbound)
//! from response processing (outbound). The hosting framework drives both
//! phases, delivering the current request and, for the outbound phase, the
//! response under construction.

use crate::error::Result;
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// Action to take after processing an inbound middleware
#[derive(Debug, Clone)]
pub enum InboundAction {
    /// Continue to the next middleware in the chain
    Continue,

    /// Stop the chain and use the response set by this middleware
    Stop,

    /// Continue processing and ensure this middleware processes the response
    Capture,
}

/// Trait for middleware that processes incoming requests
#[async_trait]
pub trait InboundMiddleware: Send + Sync + 'static {
    /// Process an incoming request
    ///
    /// # Returns
    /// - `Continue`: Pass to next middleware without outbound processing
    /// - `Stop`: Skip the remaining chain
    /// - `Capture`: Continue and guarantee outbound processing
    async fn process_request(&self, req: &Request) -> Result<InboundAction>;

    /// Optional: Get the name of this middleware for debugging
    fn name(&self) -> &'static str {
        "unnamed"
    }

    /// Optional: Get the execution priority (lower numbers execute first)
    fn priority(&self) -> i32 {
        0
    }

    /// Optional: Check if this middleware should run for the given request
    fn should_run(&self, _req: &Request) -> bool {
        true
    }
}

/// Trait for middleware that processes outgoing responses
///
/// Outbound middleware runs after the route handler, in reverse order of
/// inbound processing, and can modify response headers and body.
#[async_trait]
pub trait OutboundMiddleware: Send + Sync + 'static {
    async fn process_response(&self, req: &Request, res: &mut Response) -> Result<()>;
}

// A shared handle behaves like the middleware it wraps. This is what lets a
// single stateful instance serve both phases of a dual registration.
#[async_trait]
impl<M: InboundMiddleware + ?Sized> InboundMiddleware for Arc<M> {
    async fn process_request(&self, req: &Request) -> Result<InboundAction> {
        (**self).process_request(req).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn should_run(&self, req: &Request) -> bool {
        (**self).should_run(req)
    }
}

#[async_trait]
impl<M: OutboundMiddleware + ?Sized> OutboundMiddleware for Arc<M> {
    async fn process_response(&self, req: &Request, res: &mut Response) -> Result<()> {
        (**self).process_response(req, res).await
    }
}

/// Container for a middleware instance with phase information
pub struct MiddlewareInstance {
    pub name: String,
    pub priority: i32,
    pub inbound: Option<Box<dyn InboundMiddleware>>,
    pub outbound: Option<Box<dyn OutboundMiddleware>>,
}

impl MiddlewareInstance {
    /// Create an inbound-only middleware instance
    pub fn inbound<M: InboundMiddleware>(name: &str, middleware: M) -> Self {
        let priority = middleware.priority();
        Self {
            name: name.to_string(),
            priority,
            inbound: Some(Box::new(middleware)),
            outbound: None,
        }
    }

    /// Create an outbound-only middleware instance
    pub fn outbound<M: OutboundMiddleware>(name: &str, middleware: M) -> Self {
        Self {
            name: name.to_string(),
            priority: 0,
            inbound: None,
            outbound: Some(Box::new(middleware)),
        }
    }

    /// Create a dual-phase middleware instance. Both phases hold the same
    /// instance, so state captured inbound is visible outbound.
    pub fn dual<M>(name: &str, middleware: M) -> Self
    where
        M: InboundMiddleware + OutboundMiddleware,
    {
        let shared = Arc::new(middleware);
        let priority = shared.priority();
        Self {
            name: name.to_string(),
            priority,
            inbound: Some(Box::new(shared.clone())),
            outbound: Some(Box::new(shared)),
        }
    }

    pub fn has_inbound(&self) -> bool {
        self.inbound.is_some()
    }

    pub fn has_outbound(&self) -> bool {
        self.outbound.is_some()
    }
}
