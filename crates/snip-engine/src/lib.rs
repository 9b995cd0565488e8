//! snip-engine — the snippet lifecycle engine for snipbin.
//!
//! Owns every disclosure decision: expiration enforcement, password
//! gating, and burn-after-read accounting. Coordination between
//! concurrent viewers of one snippet happens exclusively through the
//! storage port's atomic view-counter increment, so the engine holds
//! no cross-request state and the service can run as many processes.

pub mod engine;
pub mod password;

pub use engine::{
    CreateError, CreateRequest, Disclosure, LifecycleEngine, ViewError, ViewOutcome,
};
pub use password::{hash_password, verify_password};
