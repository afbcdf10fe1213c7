//! Deterministic per-entity random draws.

/// One entity's private random stream.
///
/// The kernel owns one stream per entity, seeded deterministically from
/// the master seed and the entity's global index. Sharing a stream
/// between entities is disallowed: replay correctness depends on each
/// entity consuming its own draws in a fixed order.
///
/// The draw counter is carried in every outgoing message
/// (`rnd_call_count`) so replays can be audited against the original
/// execution.
pub trait EntityRng {
    /// Draw the next uniform value in `[0, 1)`, advancing the stream by
    /// exactly one position.
    fn next_uniform(&mut self) -> f64;

    /// Total draws consumed from this stream since entity creation.
    fn draw_count(&self) -> u64;
}
