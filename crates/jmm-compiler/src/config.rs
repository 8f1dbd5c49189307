//! Compiler configuration (jmm.toml)
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ```toml
//! [limits]
//! max_depth = 512
//!
//! [optimize]
//! enabled = true
//! max_iterations = 32
//!
//! [codegen]
//! branch_layout = "else-first"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompilerOptions {
    #[serde(default)]
    pub limits: LimitOptions,
    #[serde(default)]
    pub optimize: OptimizeOptions,
    #[serde(default)]
    pub codegen: CodegenOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOptions {
    /// Deepest statement/expression nesting any walk accepts
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    /// Run constant folding and propagation
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fold/propagate rounds per method before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodegenOptions {
    #[serde(default)]
    pub branch_layout: BranchLayout,
}

/// Instruction order used when lowering `if` statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchLayout {
    /// `if (c) goto then; <else> goto end; then: <then> end:`
    #[default]
    ElseFirst,
    /// `if (!c) goto else; <then> goto end; else: <else> end:`
    ThenFirst,
}

impl FromStr for BranchLayout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "else-first" => Ok(BranchLayout::ElseFirst),
            "then-first" => Ok(BranchLayout::ThenFirst),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown branch layout '{}'. Expected 'else-first' or 'then-first'",
                other
            ))),
        }
    }
}

fn default_max_depth() -> usize {
    512
}

fn default_max_iterations() -> usize {
    32
}

fn default_true() -> bool {
    true
}

impl Default for LimitOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: default_max_iterations(),
        }
    }
}

impl CompilerOptions {
    /// Parse options from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let options: CompilerOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_depth must be at least 1".to_string(),
            ));
        }
        if self.optimize.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "optimize.max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn without_optimizations(mut self) -> Self {
        self.optimize.enabled = false;
        self
    }

    pub fn with_branch_layout(mut self, layout: BranchLayout) -> Self {
        self.codegen.branch_layout = layout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let options = CompilerOptions::from_str("").unwrap();
        assert_eq!(options, CompilerOptions::default());
        assert_eq!(options.limits.max_depth, 512);
        assert_eq!(options.optimize.max_iterations, 32);
        assert!(options.optimize.enabled);
        assert_eq!(options.codegen.branch_layout, BranchLayout::ElseFirst);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [limits]
            max_depth = 64

            [optimize]
            enabled = false

            [codegen]
            branch_layout = "then-first"
        "#;
        let options = CompilerOptions::from_str(toml).unwrap();
        assert_eq!(options.limits.max_depth, 64);
        assert!(!options.optimize.enabled);
        assert_eq!(options.optimize.max_iterations, 32);
        assert_eq!(options.codegen.branch_layout, BranchLayout::ThenFirst);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            CompilerOptions::from_str("[limits]\nmax_depth = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            CompilerOptions::from_str("[codegen]\nbranch_layout = \"sideways\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_branch_layout_from_str() {
        assert_eq!("then-first".parse::<BranchLayout>().unwrap(), BranchLayout::ThenFirst);
        assert!("upside-down".parse::<BranchLayout>().is_err());
    }
}
