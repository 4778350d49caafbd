//! Label and value rendering.
//!
//! Values render through Display when the type implements it and fall back
//! to Debug otherwise, chosen by method resolution over [`Renderable`]
//! (autoref-based: the by-value impl on `Renderable` wins over the impl on
//! `&Renderable` whenever Display is available). This is what makes
//! `peek!("foo")` print the bare value `foo` under the quoted label `"foo"`.

use std::fmt;

use crate::options::PeekOptions;

/// Wrapper that selects Display or Debug rendering at the macro call site.
pub struct Renderable<'a, T: ?Sized>(pub &'a T);

/// Preferred rendering: Display.
pub trait DisplayRender {
    fn render_value(&self) -> String;
}

impl<T: fmt::Display + ?Sized> DisplayRender for Renderable<'_, T> {
    fn render_value(&self) -> String {
        format!("{}", self.0)
    }
}

/// Fallback rendering: Debug.
pub trait DebugRender {
    fn render_value(&self) -> String;
}

impl<T: fmt::Debug + ?Sized> DebugRender for &Renderable<'_, T> {
    fn render_value(&self) -> String {
        format!("{:?}", self.0)
    }
}

/// Formats an entry label: the expression text plus the suffixes the
/// current options ask for.
pub fn format_label(text: &str, opts: &PeekOptions, type_name: &str, addr: usize) -> String {
    match (opts.with_type, opts.with_id) {
        (true, true) => format!("{}, {} id[{:#x}]", text, type_name, addr),
        (true, false) => format!("{}, {}", text, type_name),
        (false, true) => format!("{}, id[{:#x}]", text, addr),
        (false, false) => text.to_string(),
    }
}

/// Strips module paths from a type name, inside and outside generic
/// argument lists: `alloc::vec::Vec<alloc::string::String>` becomes
/// `Vec<String>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        match ch {
            ':' => segment.clear(),
            c if c.is_alphanumeric() || c == '_' => segment.push(c),
            c => {
                out.push_str(&segment);
                segment.clear();
                out.push(c);
            }
        }
    }
    out.push_str(&segment);
    out
}
