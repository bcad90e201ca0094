//! HTTP API handlers

pub mod generation;
pub mod health;
pub mod sse;
pub mod trips;

pub use generation::generation_routes;
pub use health::health_routes;
pub use sse::{event_stream, generation_event_stream};
pub use trips::trip_routes;
