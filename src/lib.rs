//! Expression-labeled debug printing.
//!
//! `peek!` prints each argument's literal source text next to its value,
//! so a quick trace reads like the code that produced it:
//!
//! ```rust
//! let total = 3 + 4;
//! let words = vec!["hello", "world"];
//! peek::peek!(total, words);
//! // total: 7
//! //
//! // words: ["hello", "world"]
//! ```
//!
//! Labels come from the call site itself: the macro captures the token text
//! at compile time and, at runtime, re-reads the invocation from the source
//! file so multi-line calls and exact spelling (`3+4`, not `3 + 4`) come
//! through. When the source cannot be read, labels degrade to the captured
//! tokens; label recovery never fails a call.
//!
//! Output can be shaped per call (`peek!(x; with_type = true)`), per scope
//! ([`scoped`], [`disabled`]), or process-wide ([`configure`]). Functions
//! can be wrapped for call-in/result-out tracing with [`traced`].

pub use crate::options::PeekOptions;
pub use crate::sink::{BufferSink, OutputSink, StdoutSink};
pub use crate::state::{configure, current, disabled, scoped, set_sink, with_sink, ScopeGuard};
pub use crate::trace::{traced, Traced, TupleFn};

pub mod callsite;
#[doc(hidden)]
pub mod emit;
mod macros;
pub mod options;
#[doc(hidden)]
pub mod render;
pub mod sink;
pub mod state;
pub mod trace;
