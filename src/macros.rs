//! The `peek!` macro.
//!
//! Each argument expression is evaluated exactly once (the `match` binding
//! keeps temporaries alive), its token text is captured with `stringify!`,
//! and the bundle is handed to the runtime emitter together with the
//! invocation location so labels can be upgraded to the exact source
//! spelling.

/// Prints each argument's source text next to its value.
///
/// With no arguments this does nothing. An optional options tail after `;`
/// overrides the process-wide display options for this call only:
///
/// ```rust
/// let total = 7;
/// peek::peek!(total);                      // total: 7
/// peek::peek!(total; with_type = true);    // total, i32: 7
/// peek::peek!();                           // no output
/// ```
#[macro_export]
macro_rules! peek {
    () => {};
    (@emit $opts:expr, $($value:expr),+) => {{
        $crate::emit::emit_call(
            ::std::file!(),
            ::std::line!(),
            ::std::column!(),
            $opts,
            &[
                $(
                    match &$value {
                        value => $crate::emit::Capture {
                            text: ::std::option::Option::Some(::std::stringify!($value)),
                            rendered: {
                                #[allow(unused_imports)]
                                use $crate::render::{DebugRender as _, DisplayRender as _};
                                (&$crate::render::Renderable(value)).render_value()
                            },
                            type_name: $crate::render::short_type_name(
                                ::std::any::type_name_of_val(value),
                            ),
                            addr: value as *const _ as usize,
                        }
                    }
                ),+
            ],
        );
    }};
    ($($value:expr),+ $(,)?) => {
        $crate::peek!(@emit $crate::current(), $($value),+)
    };
    ($($value:expr),+ ; $($key:ident = $opt:expr),+ $(,)?) => {{
        let mut opts = $crate::current();
        $( opts = opts.$key($opt); )+
        $crate::peek!(@emit opts, $($value),+)
    }};
}
