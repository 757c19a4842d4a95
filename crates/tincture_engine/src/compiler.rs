//! CSS compilation
//!
//! Turns a fully resolved token map into CSS text: one custom-property
//! declaration per token under a root selector, plus optional utility
//! classes derived from the `components` tier. Output ordering is
//! lexicographic by token path so identical inputs always produce identical
//! text, byte for byte.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use tincture_core::{Literal, Result, ThemeError, TokenPath, TokenValue};

use crate::cache::ArtifactKey;

/// Output options for the compiler.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Selector the custom properties are declared under.
    pub selector: String,
    /// Strip whitespace and comments. No semantic transformation.
    pub minify: bool,
    /// Emit `.component-variant` utility rules for the components tier.
    pub utility_classes: bool,
    /// Comment emitted at the top of unminified output.
    pub banner: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            selector: ":root".into(),
            minify: false,
            utility_classes: true,
            banner: None,
        }
    }
}

/// The immutable output of one compilation: the flat resolved value map,
/// the CSS text, and a content checksum. Identified by
/// `(tenant, theme, context_hash)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTheme {
    tenant_id: String,
    theme_id: String,
    context_hash: String,
    values: BTreeMap<TokenPath, Literal>,
    css: String,
    checksum: String,
}

impl CompiledTheme {
    /// The compiled CSS text.
    pub fn css(&self) -> &str {
        &self.css
    }

    /// SHA-256 hex digest of the CSS text. Stable: recompiling identical
    /// input yields the identical checksum, so callers can detect no-op
    /// recompilations.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Look up one resolved token value, for callers that need individual
    /// values without the full CSS (inline styles, emails).
    pub fn resolve(&self, path: &str) -> Option<&Literal> {
        let path = TokenPath::parse(path).ok()?;
        self.values.get(&path)
    }

    /// The full resolved value map.
    pub fn values(&self) -> &BTreeMap<TokenPath, Literal> {
        &self.values
    }

    /// Tenant this artifact was compiled for.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Source theme id.
    pub fn theme_id(&self) -> &str {
        &self.theme_id
    }

    /// Hash of the evaluation context this artifact was compiled under.
    pub fn context_hash(&self) -> &str {
        &self.context_hash
    }

    /// The artifact cache key for this compilation.
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            tenant_id: self.tenant_id.clone(),
            theme_id: self.theme_id.clone(),
            context_hash: self.context_hash.clone(),
        }
    }
}

/// Compile a resolved token map to CSS.
///
/// Never fails on valid input: every value must already be a literal. A
/// reference in the map means the resolver contract was violated upstream
/// and surfaces as [`ThemeError::Internal`].
pub fn compile(
    key: &ArtifactKey,
    resolved: &BTreeMap<TokenPath, TokenValue>,
    options: &CompilerOptions,
) -> Result<CompiledTheme> {
    let mut values = BTreeMap::new();
    for (path, value) in resolved {
        match value {
            TokenValue::Literal(literal) => {
                values.insert(path.clone(), literal.clone());
            }
            TokenValue::Reference(target) => {
                return Err(ThemeError::Internal {
                    message: format!(
                        "compiler received unresolved reference {path} -> {target}"
                    ),
                });
            }
        }
    }

    let css = emit_css(&values, options);
    let checksum = hex_digest(&css);

    Ok(CompiledTheme {
        tenant_id: key.tenant_id.clone(),
        theme_id: key.theme_id.clone(),
        context_hash: key.context_hash.clone(),
        values,
        css,
        checksum,
    })
}

fn emit_css(values: &BTreeMap<TokenPath, Literal>, options: &CompilerOptions) -> String {
    let mut out = String::new();
    let minify = options.minify;

    if !minify {
        if let Some(banner) = &options.banner {
            out.push_str("/* ");
            out.push_str(banner);
            out.push_str(" */\n");
        }
    }

    // Custom properties, lexicographic by path (BTreeMap iteration order).
    out.push_str(&options.selector);
    out.push_str(if minify { "{" } else { " {\n" });
    for (path, literal) in values {
        if minify {
            out.push_str(&format!("{}:{};", path.css_variable(), literal));
        } else {
            out.push_str(&format!("  {}: {};\n", path.css_variable(), literal));
        }
    }
    out.push_str(if minify { "}" } else { "}\n" });

    if options.utility_classes {
        for (class, declarations) in utility_rules(values) {
            if minify {
                out.push_str(&format!(".{class}{{"));
                for (property, variable) in &declarations {
                    out.push_str(&format!("{property}:var({variable});"));
                }
                out.push('}');
            } else {
                out.push_str(&format!("\n.{class} {{\n"));
                for (property, variable) in &declarations {
                    out.push_str(&format!("  {property}: var({variable});\n"));
                }
                out.push_str("}\n");
            }
        }
    }

    out
}

/// Derive utility rules from components-tier paths. Pure naming convention:
/// for `components.<segments...>.<property>`, the class is the middle
/// segments joined with `-` and the declaration binds `<property>` to the
/// token's custom property. `components.button.primary.background` becomes
/// `.button-primary { background: var(--components-button-primary-background); }`.
fn utility_rules(
    values: &BTreeMap<TokenPath, Literal>,
) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut rules: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for path in values.keys() {
        let segments: Vec<&str> = path.segments().collect();
        // Need at least components.<class>.<property>.
        if segments.len() < 3 || segments[0] != "components" {
            continue;
        }
        let class = segments[1..segments.len() - 1].join("-");
        let property = segments[segments.len() - 1].to_string();
        rules
            .entry(class)
            .or_default()
            .insert(property, path.css_variable());
    }
    rules
}

fn hex_digest(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
