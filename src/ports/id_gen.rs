//! ID generator port for producing operation identifiers.

/// Generates unique identifiers for audit operations.
///
/// Abstracting ID generation keeps audit entries deterministic under test
/// by substituting a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
