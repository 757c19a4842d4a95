//! Engine error types

use thiserror::Error;

/// One structural problem found while validating a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The token path or condition id at fault, or `theme` for
    /// theme-level problems.
    pub subject: String,
    /// What is wrong.
    pub message: String,
}

impl Violation {
    /// Build a violation.
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Errors surfaced by theme resolution, compilation, and lifecycle calls.
///
/// `Clone` is required so a single in-flight computation can hand the same
/// failure to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThemeError {
    /// No token exists at the requested path in any tier.
    #[error("token not found: {path}")]
    TokenNotFound {
        /// The unresolved path.
        path: String,
    },

    /// A reference chain revisited a path.
    #[error("circular token reference: {}", chain.join(" -> "))]
    CircularReference {
        /// The paths in visit order, ending at the repeat.
        chain: Vec<String>,
    },

    /// A reference chain exceeded the configured hop limit. Treated like a
    /// cycle even if none exists, to bound resolution cost.
    #[error("resolution depth exceeded at {path} (max {max_depth})")]
    DepthExceeded {
        /// Path at which the limit tripped.
        path: String,
        /// The configured limit.
        max_depth: usize,
    },

    /// Static validation rejected the theme. Every violation found is
    /// listed, not just the first.
    #[error("invalid theme: {} violation(s)", violations.len())]
    InvalidTheme {
        /// All structural problems found.
        violations: Vec<Violation>,
    },

    /// A theme with this id is already registered.
    #[error("duplicate theme id: {id}")]
    DuplicateTheme {
        /// The contested id.
        id: String,
    },

    /// No theme registered under this id.
    #[error("theme not found: {id}")]
    ThemeNotFound {
        /// The unknown id.
        id: String,
    },

    /// The theme is still some tenant's default; repoint tenants first.
    #[error("theme {id} is still in use by tenant(s): {}", tenants.join(", "))]
    ThemeInUse {
        /// The theme being unregistered.
        id: String,
        /// Tenants whose default still names it.
        tenants: Vec<String>,
    },

    /// The tenant has no configuration. Informational: an unconfigured
    /// tenant simply gets the theme with no branding overlay.
    #[error("tenant not configured: {tenant_id}")]
    TenantNotConfigured {
        /// The unknown tenant.
        tenant_id: String,
    },

    /// An external collaborator (storage, condition evaluator) timed out.
    #[error("data source timed out: {source_name}")]
    DataSourceTimeout {
        /// Which collaborator.
        source_name: String,
    },

    /// The storage backend failed.
    #[error("storage error: {message}")]
    Storage {
        /// Backend-provided detail.
        message: String,
    },

    /// The call was cancelled via its token.
    #[error("operation cancelled")]
    Cancelled,

    /// A contract between engine components was violated; a bug, not bad
    /// input.
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

/// Result alias for theme engine operations.
pub type Result<T> = std::result::Result<T, ThemeError>;
