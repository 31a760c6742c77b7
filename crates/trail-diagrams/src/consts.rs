//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default Mermaid theme.
pub const DEFAULT_THEME: &str = "neutral";

/// Placeholder prefix written in place of a diagram until it is rendered.
pub const PLACEHOLDER_PREFIX: &str = "{{DIAGRAM_";
