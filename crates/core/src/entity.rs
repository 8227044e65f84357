//! Entity trait: identity that survives state changes.

/// Something with a stable identity.
///
/// Two entities with the same id are the same thing at different points in
/// time, whatever their other fields say.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> Self::Id;
}
