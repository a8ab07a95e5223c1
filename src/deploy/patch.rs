// ABOUTME: Idempotent textual rewrites on a fetched stack definition.
// ABOUTME: Rewrites a baked-in network alias to the environment's real network.

use std::path::Path;

use crate::registry::RewriteRule;

/// Applies an ordered list of rewrite rules to a definition file in
/// place. Rules whose `from` is absent are no-ops, and rule construction
/// rejects self-referential replacements, so applying the patcher twice
/// always equals applying it once.
pub struct ConfigPatcher {
    rules: Vec<RewriteRule>,
}

impl ConfigPatcher {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Pure rewrite of a definition text.
    pub fn apply(&self, text: &str) -> String {
        let mut patched = text.to_string();
        for rule in &self.rules {
            if patched.contains(rule.from.as_str()) {
                patched = patched.replace(rule.from.as_str(), &rule.to);
            }
        }
        patched
    }

    /// Rewrite `path` in place. Returns whether anything changed; an
    /// already-patched file is left untouched.
    pub fn apply_file(&self, path: &Path) -> std::io::Result<bool> {
        let original = std::fs::read_to_string(path)?;
        let patched = self.apply(&original);
        if patched == original {
            return Ok(false);
        }
        std::fs::write(path, patched)?;
        Ok(true)
    }
}
