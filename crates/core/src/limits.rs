//! Size limits enforced by the renderer
//!
//! Templates are externally authored, so their size, placeholder count and
//! markup nesting are bounded before any work proportional to them is done.
//! Violations return `RenderError::LimitExceeded`.

use crate::error::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};

/// Hard ceiling on markup nesting, whatever `max_nesting_depth` says.
/// Lowering the markup tree recurses once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Render limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLimits {
    /// Maximum raw template size in bytes (default: 1MB)
    pub max_template_bytes: usize,

    /// Maximum placeholders in one template (default: 10,000)
    pub max_placeholders: usize,

    /// Maximum nesting depth of the markup tree (default: 64, at most 256)
    pub max_nesting_depth: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        RenderLimits {
            max_template_bytes: 1024 * 1024,
            max_placeholders: 10_000,
            max_nesting_depth: 64,
        }
    }
}

impl RenderLimits {
    /// Small limits for tests that exercise limit enforcement
    pub fn with_small_limits() -> Self {
        RenderLimits {
            max_template_bytes: 256,
            max_placeholders: 4,
            max_nesting_depth: 4,
        }
    }

    /// Validate raw template size
    pub fn check_template_bytes(&self, len: usize) -> RenderResult<()> {
        check("template size", self.max_template_bytes, len)
    }

    /// Validate placeholder count
    pub fn check_placeholders(&self, count: usize) -> RenderResult<()> {
        check("placeholder count", self.max_placeholders, count)
    }

    /// Validate markup nesting depth
    pub fn check_depth(&self, depth: usize) -> RenderResult<()> {
        check("nesting depth", self.max_nesting_depth.min(MAX_NESTING_DEPTH), depth)
    }
}

fn check(limit: &str, max: usize, actual: usize) -> RenderResult<()> {
    if actual > max {
        return Err(RenderError::LimitExceeded {
            limit: limit.to_string(),
            max,
            actual,
        });
    }
    Ok(())
}
