//! Internal constants for figure rendering.

use std::time::Duration;

/// Default DPI for rendered figures (print quality for the paper).
pub const DEFAULT_DPI: u32 = 300;

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
