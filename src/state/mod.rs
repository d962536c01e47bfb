//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `RetryState`: attempt counter and current backoff wait for one operation
//! - `EntityState`: lifecycle of one entity inside the batch orchestrator
//! - `EntityTracker`: enforces legal `EntityState` transitions

mod entity_state;
mod retry_state;

// Re-export main types
pub use entity_state::{EntityState, EntityTracker};
pub use retry_state::RetryState;
