//! Display options for the printer.
//!
//! A `PeekOptions` bundle controls whether output is produced at all and
//! which suffixes (type name, identity) are appended to each label. The
//! process-wide copy lives in [`crate::state`]; per-call overrides are built
//! with the same setters.

/// Controls how a printed entry is rendered.
///
/// # Examples
///
/// ```rust
/// use peek::PeekOptions;
/// let opts = PeekOptions::new().with_type(true);
/// assert!(opts.with_type);
/// assert!(opts.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeekOptions {
    /// Append `, <type-name>` to each label.
    pub with_type: bool,
    /// Append `, id[<address>]` to each label.
    pub with_id: bool,
    /// When false, all printing is suppressed.
    pub enabled: bool,
}

impl Default for PeekOptions {
    fn default() -> Self {
        Self {
            with_type: false,
            with_id: false,
            enabled: true,
        }
    }
}

impl PeekOptions {
    /// Default options: output enabled, no suffixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the type name is appended to labels.
    pub fn with_type(mut self, on: bool) -> Self {
        self.with_type = on;
        self
    }

    /// Sets whether the value identity is appended to labels.
    pub fn with_id(mut self, on: bool) -> Self {
        self.with_id = on;
        self
    }

    /// Sets whether output is produced.
    pub fn enabled(mut self, on: bool) -> Self {
        self.enabled = on;
        self
    }
}
