//! Middleware system
//!
//! A dual-phase middleware seam separating request processing (inbound)
//! from response processing (outbound). The hosting framework runs the
//! inbound phase before handling and the outbound phase after handling,
//! before the response is sent.

pub mod traits;

pub use traits::{
    InboundAction, InboundMiddleware, MiddlewareInstance, OutboundMiddleware,
};

/// Registry for storing and managing dual-phase middleware instances
#[derive(Default)]
pub struct MiddlewareRegistry {
    middleware: Vec<MiddlewareInstance>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Register an inbound-only middleware
    pub fn register_inbound<M: InboundMiddleware>(&mut self, name: &str, middleware: M) {
        self.middleware
            .push(MiddlewareInstance::inbound(name, middleware));
    }

    /// Register an outbound-only middleware
    pub fn register_outbound<M: OutboundMiddleware>(&mut self, name: &str, middleware: M) {
        self.middleware
            .push(MiddlewareInstance::outbound(name, middleware));
    }

    /// Register a dual-phase middleware; one instance serves both phases
    pub fn register_dual<M>(&mut self, name: &str, middleware: M)
    where
        M: InboundMiddleware + OutboundMiddleware,
    {
        self.middleware
            .push(MiddlewareInstance::dual(name, middleware));
    }

    /// Get all middleware instances sorted by priority
    pub fn get_sorted(&self) -> Vec<&MiddlewareInstance> {
        let mut sorted_refs: Vec<&MiddlewareInstance> = self.middleware.iter().collect();
        sorted_refs.sort_by_key(|m| m.priority);
        sorted_refs
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }
}
