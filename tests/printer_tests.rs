//! Exact-output tests for the `peek!` macro, captured through a
//! `BufferSink` so assertions can compare whole chunks.

use std::sync::Mutex;

use peek::{peek, BufferSink, PeekOptions};

// Printer options and the sink are process-wide; tests in this binary
// serialize on this lock so captures never interleave.
static LOCK: Mutex<()> = Mutex::new(());

fn capture(f: impl FnOnce()) -> String {
    let _serial = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let sink = BufferSink::new();
    let handle = sink.handle();
    let previous = peek::set_sink(Box::new(sink));
    f();
    peek::set_sink(previous);
    let out = handle.lock().unwrap().clone();
    out
}

#[test]
fn labels_a_simple_variable() {
    let out = capture(|| {
        let x = 7;
        peek!(x);
    });
    assert_eq!(out, "x: 7\n");
}

#[test]
fn string_literal_gets_a_quoted_label_and_a_bare_value() {
    let out = capture(|| {
        peek!("foo");
    });
    assert_eq!(out, "\"foo\": foo\n");
}

#[test]
fn owned_strings_render_without_quotes() {
    let out = capture(|| {
        let s = String::from("bar");
        peek!(s);
    });
    assert_eq!(out, "s: bar\n");
}

#[test]
fn debug_rendering_covers_non_display_types() {
    let out = capture(|| {
        let words = vec!["hello", "world"];
        peek!(words);
    });
    assert_eq!(out, "words: [\"hello\", \"world\"]\n");
}

#[test]
fn two_values_are_separated_by_one_blank_line() {
    let out = capture(|| {
        let a = 1;
        let b = 2;
        peek!(a, b);
    });
    assert_eq!(out, "a: 1\n\nb: 2\n");
}

#[test]
fn expression_labels_keep_the_source_spelling() {
    let out = capture(|| {
        peek!(3+4);
    });
    assert_eq!(out, "3+4: 7\n");
}

#[test]
fn multi_line_calls_are_normalized() {
    let out = capture(|| {
        let a = vec!["hello", "world"];
        peek!(
            a,
            "foo",
        );
    });
    assert_eq!(out, "a: [\"hello\", \"world\"]\n\n\"foo\": foo\n");
}

#[test]
fn with_type_appends_the_type_name() {
    let out = capture(|| {
        let _scope = peek::scoped(PeekOptions::new().with_type(true));
        let x = 7;
        peek!(x);
    });
    assert_eq!(out, "x, i32: 7\n");
}

#[test]
fn with_id_appends_the_identity() {
    let out = capture(|| {
        let _scope = peek::scoped(PeekOptions::new().with_id(true));
        let x = 7;
        peek!(x);
    });
    assert!(out.starts_with("x, id[0x"), "unexpected output: {}", out);
    assert!(out.ends_with(": 7\n"), "unexpected output: {}", out);
}

#[test]
fn type_and_id_combine() {
    let out = capture(|| {
        let _scope = peek::scoped(PeekOptions::new().with_type(true).with_id(true));
        let x = 7;
        peek!(x);
    });
    assert!(out.starts_with("x, i32 id[0x"), "unexpected output: {}", out);
    assert!(out.ends_with(": 7\n"), "unexpected output: {}", out);
}

#[test]
fn per_call_options_override_the_ambient_state() {
    let out = capture(|| {
        let x = 7;
        peek!(x; with_type = true);
    });
    assert_eq!(out, "x, i32: 7\n");
}

#[test]
fn suffixes_apply_to_every_value_of_a_multi_line_call() {
    let out = capture(|| {
        let _scope = peek::scoped(PeekOptions::new().with_type(true));
        let a = 1;
        let b = String::from("two");
        peek!(
            a,
            b,
        );
    });
    assert_eq!(out, "a, i32: 1\n\nb, String: two\n");
}

#[test]
fn turbofish_arguments_keep_exact_labels() {
    let out = capture(|| {
        peek!(std::collections::HashMap::<i32, i32>::new());
    });
    assert_eq!(out, "std::collections::HashMap::<i32, i32>::new(): {}\n");
}

#[test]
fn zero_arguments_print_nothing() {
    let out = capture(|| {
        peek!();
    });
    assert_eq!(out, "");
}

#[test]
fn unreadable_source_falls_back_to_the_token_capture() {
    let out = capture(|| {
        peek::emit::emit_call(
            "no/such/file.rs",
            1,
            1,
            PeekOptions::new(),
            &[peek::emit::Capture {
                text: Some("3 + 4"),
                rendered: "7".to_string(),
                type_name: "i32".to_string(),
                addr: 0,
            }],
        );
    });
    assert_eq!(out, "3 + 4: 7\n");
}

#[test]
fn capture_without_any_text_prints_the_value_alone() {
    let out = capture(|| {
        peek::emit::emit_call(
            "no/such/file.rs",
            1,
            1,
            PeekOptions::new(),
            &[peek::emit::Capture {
                text: None,
                rendered: "7".to_string(),
                type_name: "i32".to_string(),
                addr: 0,
            }],
        );
    });
    assert_eq!(out, "7\n");
}

#[test]
fn identical_calls_produce_identical_output() {
    let first = capture(|| {
        let x = 41;
        peek!(x, "foo");
    });
    let second = capture(|| {
        let x = 41;
        peek!(x, "foo");
    });
    assert_eq!(first, second);
    assert_eq!(first, "x: 41\n\n\"foo\": foo\n");
}
