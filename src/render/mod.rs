/// Range rendering with optional frame-level parallelism.
pub mod session;
/// Sinks consuming evaluated frames in order.
pub mod sink;
