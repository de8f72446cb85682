/// Config for a collection pass
/// ## Fields
/// - `dedupe_contributions`:
///   If `true`, a set or map contribution whose source method is already part of the container is dropped.
///   This happens when the same module class is reachable through several nested component references.
///
///   If `false` (default), every reachable instance contributes, each with its own accessor path.
/// - `warn_on_shadowed_accessor`:
///   If `true`, a later accessor for a type already requested by an earlier one is recorded as a warning.
///   Only the first accessor is kept either way.
#[derive(Clone, Copy, Default)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Config {
    pub dedupe_contributions: bool,
    pub warn_on_shadowed_accessor: bool,
}
