//! Path access rule configuration.

use serde::{Deserialize, Serialize};

/// Access rules evaluated by the gate before any handler runs.
///
/// `rules` are evaluated first, in order; `public_paths` follow as
/// permit-all rules. Anything unmatched requires authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Ant-style patterns reachable without authentication.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
    /// Additional ordered rules.
    #[serde(default)]
    pub rules: Vec<AccessRuleConfig>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            public_paths: default_public_paths(),
            rules: Vec::new(),
        }
    }
}

/// One `(pattern, requirement)` pair.
///
/// `requirement` is `"permit_all"`, `"authenticated"`, or `"role:<NAME>"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRuleConfig {
    /// Ant-style path pattern.
    pub pattern: String,
    /// Requirement expression.
    pub requirement: String,
}

fn default_public_paths() -> Vec<String> {
    [
        "/webjars/**",
        "/css/**",
        "/js/**",
        "/images/**",
        "/sbat/index/**",
        "/sbat/error/**",
        "/lang",
        "/h2-console/**",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
