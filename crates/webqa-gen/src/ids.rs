//! Deterministic identifier generation
//!
//! Identifiers are a pure function of a scope (`tc`, `res`, `bug`, `tkt`), the
//! position of the item within its batch, and a kind tag. Identical inputs
//! always yield identical identifiers.

use sha2::{Digest, Sha256};

/// Scope for test specification IDs
pub const SCOPE_SPECIFICATION: &str = "tc";
/// Scope for execution result IDs
pub const SCOPE_RESULT: &str = "res";
/// Scope for defect IDs
pub const SCOPE_DEFECT: &str = "bug";
/// Scope for ticket IDs
pub const SCOPE_TICKET: &str = "tkt";

/// Capability that mints identifiers
pub trait IdGenerator: Send + Sync {
    /// Generate the ID for item `index` of kind `tag` within `scope`
    fn generate(&self, scope: &str, index: usize, tag: &str) -> String;
}

/// Readable `scope-0007-tag` identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIds;

impl IdGenerator for SequentialIds {
    fn generate(&self, scope: &str, index: usize, tag: &str) -> String {
        format!("{scope}-{index:04}-{tag}")
    }
}

/// Opaque content-hash identifiers, optionally namespaced per run
#[derive(Debug, Clone, Default)]
pub struct HashedIds {
    namespace: String,
}

impl HashedIds {
    /// Create a generator whose IDs are salted with `namespace`
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl IdGenerator for HashedIds {
    fn generate(&self, scope: &str, index: usize, tag: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update(b"/");
        hasher.update(scope.as_bytes());
        hasher.update(b"/");
        hasher.update(index.to_le_bytes());
        hasher.update(b"/");
        hasher.update(tag.as_bytes());
        let digest = hasher.finalize();
        format!("{scope}-{}", hex::encode(&digest[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds;
        assert_eq!(ids.generate("tc", 3, "click"), "tc-0003-click");
        assert_eq!(ids.generate("bug", 12, "failure"), "bug-0012-failure");
    }

    #[test]
    fn test_hashed_ids_deterministic() {
        let a = HashedIds::new("run-1");
        let b = HashedIds::new("run-1");
        assert_eq!(a.generate("tc", 0, "fill"), b.generate("tc", 0, "fill"));
    }

    #[test]
    fn test_hashed_ids_vary_by_input() {
        let ids = HashedIds::new("run-1");
        let base = ids.generate("tc", 0, "fill");
        assert_ne!(base, ids.generate("tc", 1, "fill"));
        assert_ne!(base, ids.generate("tc", 0, "fill-empty"));
        assert_ne!(base, HashedIds::new("run-2").generate("tc", 0, "fill"));
    }

    #[test]
    fn test_hashed_ids_shape() {
        let id = HashedIds::default().generate("bug", 0, "visual");
        let hex_part = id.strip_prefix("bug-").expect("scope prefix");
        assert_eq!(hex_part.len(), 16);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
