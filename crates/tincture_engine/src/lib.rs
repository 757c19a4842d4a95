//! Tincture Engine
//!
//! Theme token resolution and CSS compilation for multi-tenant
//! applications: deterministic, cycle-safe, cacheable, and isolated per
//! tenant, with conditional overrides evaluated against request-time data.
//!
//! # Overview
//!
//! The engine provides:
//! - **Resolution**: follows `{path}` references through a theme's token
//!   tiers with cycle detection and a configurable depth cap
//! - **Conditions**: priority-ordered override sets gated by an external
//!   boolean evaluator (time of day, feature flags, locale)
//! - **Caching**: LRU-bounded token-level and artifact-level caches with
//!   targeted invalidation and singleflight compilation
//! - **Compilation**: deterministic CSS custom properties plus derived
//!   component utility classes, with optional minification
//! - **Lifecycle**: register/unregister themes, configure tenants, observe
//!   changes, persist through a pluggable storage backend
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tincture_core::{CancelToken, EvalContext, Theme, TokenValue};
//! use tincture_engine::{EvalError, ManagerConfig, ThemeManager};
//!
//! // An evaluator that matches nothing; any expression language plugs in here.
//! let evaluator = |_: &str, _: &EvalContext| -> Result<bool, EvalError> { Ok(false) };
//! let manager = ThemeManager::new(ManagerConfig::default(), Arc::new(evaluator));
//!
//! let mut theme = Theme::new("aurora", "Aurora");
//! theme.tokens.primitives.insert(
//!     "color.blue-600".into(),
//!     TokenValue::literal("#3b82f6"),
//! );
//! theme.tokens.semantic.insert(
//!     "colors.primary".into(),
//!     TokenValue::parse("{primitives.color.blue-600}").unwrap(),
//! );
//!
//! let cancel = CancelToken::none();
//! manager.register_theme(theme, &cancel).unwrap();
//! let compiled = manager
//!     .get_compiled_theme("acme", "aurora", &EvalContext::new(), &cancel)
//!     .unwrap();
//! assert!(compiled.css().contains("--semantic-colors-primary: #3b82f6;"));
//! ```

pub mod cache;
pub mod compiler;
pub mod condition;
pub mod manager;
pub mod resolver;
pub mod storage;
pub mod tenant;

// Re-export commonly used types
pub use cache::{ArtifactCache, ArtifactKey, CacheStats, Singleflight, TokenCache, TokenKey};
pub use compiler::{compile, CompiledTheme, CompilerOptions};
pub use condition::{ConditionEvaluator, EvalError, OverridePlan};
pub use manager::{
    InvalidationScope, ManagerConfig, ManagerStats, ThemeEvent, ThemeManager,
};
pub use resolver::{ResolutionScope, Resolver, ResolverConfig};
pub use storage::{MemoryStorage, ThemeStorage};
pub use tenant::TenantRegistry;
