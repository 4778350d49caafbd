//! Runtime support for the `peek!` macro.
//!
//! The macro evaluates each argument once, packages the compile-time
//! captures, and hands them here. The emitter checks the effective options,
//! tries to upgrade the labels to the exact call-site source text, and
//! writes one chunk per invocation to the active sink.

use crate::options::PeekOptions;
use crate::{callsite, render, state};

/// Everything the macro knows about one argument at compile time.
#[derive(Debug)]
pub struct Capture {
    /// The `stringify!` text of the expression, if any. `None` prints the
    /// value without a label.
    pub text: Option<&'static str>,
    /// The value rendered via Display (or Debug as fallback).
    pub rendered: String,
    /// Shortened type name of the value.
    pub type_name: String,
    /// Address of the evaluated value.
    pub addr: usize,
}

/// Emits one `peek!` invocation.
///
/// Labels come from call-site source recovery when it succeeds, from the
/// captured `stringify!` text when it does not, and are omitted entirely
/// when neither exists. Recovery failures are silent by contract.
pub fn emit_call(file: &str, line: u32, column: u32, opts: PeekOptions, captures: &[Capture]) {
    if !opts.enabled || captures.is_empty() {
        return;
    }

    let recovered = callsite::recover(file, line, column, captures.len()).ok();

    let mut entries = Vec::with_capacity(captures.len());
    for (index, capture) in captures.iter().enumerate() {
        let text = recovered
            .as_ref()
            .map(|labels| labels[index].as_str())
            .or(capture.text);
        let entry = match text {
            Some(text) => format!(
                "{}: {}",
                render::format_label(text, &opts, &capture.type_name, capture.addr),
                capture.rendered
            ),
            None => capture.rendered.clone(),
        };
        entries.push(entry);
    }

    state::with_sink(|sink| sink.emit(&entries.join("\n\n")));
}
