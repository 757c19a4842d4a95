//! Tincture Core
//!
//! Data model for the Tincture theming engine: token paths, values, tiered
//! stores, theme and tenant definitions, evaluation contexts, and the error
//! taxonomy shared across the workspace.
//!
//! # Overview
//!
//! Everything here is an immutable value type. A [`Theme`] owns a
//! [`TokenStore`] of three tiers (`primitives`, `semantic`, `components`)
//! plus an ordered list of [`Condition`] override sets. A [`TenantConfig`]
//! selects a default theme and may carry a [`BrandingOverlay`] that retouches
//! the semantic and component tiers — never the primitives.
//!
//! Token values are either literals or `{path}` references:
//!
//! ```rust
//! use tincture_core::{TokenPath, TokenValue};
//!
//! let reference = TokenValue::parse("{semantic.colors.primary}").unwrap();
//! assert!(reference.as_reference().is_some());
//!
//! let path = TokenPath::parse("components.button.primary.background").unwrap();
//! assert_eq!(path.css_variable(), "--components-button-primary-background");
//! ```
//!
//! Resolution, caching, and CSS compilation live in `tincture_engine`.

pub mod cancel;
pub mod context;
pub mod error;
pub mod path;
pub mod store;
pub mod tenant;
pub mod theme;
pub mod validate;
pub mod value;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use context::EvalContext;
pub use error::{Result, ThemeError, Violation};
pub use path::{PathError, TokenPath};
pub use store::{BrandingOverlay, Tier, TokenStore};
pub use tenant::TenantConfig;
pub use theme::{Condition, Theme};
pub use validate::validate_theme;
pub use value::{Literal, TokenValue};
