//! Error types for the block management engine's fallible operations.

/// Failure modes for the engine's internal, fallible operations.
///
/// These are propagated internally with `?` (through the extender, fit search, and placement)
/// and collapsed to null-pointer / `-1` return conventions at the public API boundary (see
/// [`crate::engine::Heap::init`], [`crate::engine::Heap::allocate`]). A [`HeapError`] is never
/// turned into a panic on the allocation hot path; only contract violations (double free,
/// misaligned pointer) are undefined behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The heap provider refused to grow the region by the requested amount.
    OutOfMemory,
    /// The provider reported bounds or a growth result that would overflow address arithmetic.
    ///
    /// The provider contract (monotonic growth, no shrink) rules this out in a correct
    /// implementation, but the core does not trust it blindly: this variant is what a
    /// misbehaving or exhausted-address-space provider surfaces as instead of wrapping.
    ProviderOverflow,
}
