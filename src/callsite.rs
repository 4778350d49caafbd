//! Call-site source recovery.
//!
//! Recovers the literal source text of each argument expression at a
//! `peek!` invocation: reads the file named by `file!()`, locates the macro
//! invocation head on the invocation line, scans forward until the
//! parenthesized argument list balances (a call may span several physical
//! lines), and splits the argument text on top-level commas. Comments are
//! dropped and string literal contents are kept verbatim.
//!
//! Every failure here is recoverable: the emitter falls back to the
//! compile-time `stringify!` captures and never surfaces these errors.

use std::fs;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Why source recovery failed for a call site.
#[derive(Debug, Error)]
pub enum CallSiteError {
    /// The source file could not be read (deleted, moved, or the process
    /// runs from a different working directory than the build).
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] std::io::Error),
    /// The invocation line does not exist or holds no macro invocation.
    #[error("no macro invocation head found on line {0}")]
    HeadNotFound(u32),
    /// The argument list never balances before the end of the file.
    #[error("unbalanced argument list at call site")]
    Unbalanced,
    /// The number of recovered expressions does not match the number of
    /// values passed.
    #[error("expected {expected} argument expressions, found {found}")]
    ArityMismatch { expected: usize, found: usize },
}

// Matches a (possibly path-qualified) macro invocation head up to and
// including its opening parenthesis, e.g. `peek!(` or `peek::peek! (`.
static HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[A-Za-z_][A-Za-z0-9_]*::)*[A-Za-z_][A-Za-z0-9_]*\s*!\s*\(")
        .expect("invocation head pattern is valid")
});

/// Recovers the normalized source text of each argument expression at the
/// given call site, or reports why it cannot.
///
/// `line` and `column` are the 1-based values of `line!()`/`column!()` at
/// the invocation; `expected` is the number of values passed.
pub fn recover(
    file: &str,
    line: u32,
    column: u32,
    expected: usize,
) -> Result<Vec<String>, CallSiteError> {
    let source = fs::read_to_string(file)?;
    let args_start = find_args_start(&source, line, column)?;
    let fragments = split_arguments(&source[args_start..])?;

    let fragments: Vec<String> = fragments
        .iter()
        .map(|raw| normalize_fragment(raw))
        .filter(|fragment| !fragment.is_empty())
        .collect();

    if fragments.len() != expected {
        return Err(CallSiteError::ArityMismatch {
            expected,
            found: fragments.len(),
        });
    }
    Ok(fragments)
}

/// Byte offset just past the invocation head's opening parenthesis.
fn find_args_start(source: &str, line: u32, column: u32) -> Result<usize, CallSiteError> {
    let line_start = line_offset(source, line).ok_or(CallSiteError::HeadNotFound(line))?;
    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());

    // Preferred: the head sits exactly at the invocation column.
    if let Some(anchor) = column_offset(&source[line_start..], column).map(|i| line_start + i) {
        if let Some(m) = HEAD_RE.find_at(source, anchor) {
            if m.start() == anchor {
                return Ok(m.end());
            }
        }
    }

    // Otherwise scan the line, preferring a head whose macro name is `peek`
    // over whatever invocation happens to come first.
    let mut first = None;
    for m in HEAD_RE.find_iter(&source[line_start..line_end]) {
        if first.is_none() {
            first = Some(m.end());
        }
        if head_name(m.as_str()) == "peek" {
            return Ok(line_start + m.end());
        }
    }
    first
        .map(|end| line_start + end)
        .ok_or(CallSiteError::HeadNotFound(line))
}

/// The final path segment of a matched invocation head.
fn head_name(head: &str) -> &str {
    let ident_end = head.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'));
    let path = &head[..ident_end.unwrap_or(head.len())];
    path.rsplit("::").next().unwrap_or(path)
}

/// Byte offset of the start of the given 1-based line.
fn line_offset(source: &str, line: u32) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut remaining = line - 1;
    if remaining == 0 {
        return Some(0);
    }
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            remaining -= 1;
            if remaining == 0 {
                return Some(idx + 1);
            }
        }
    }
    None
}

/// Byte offset within `line_text` of the given 1-based column.
fn column_offset(line_text: &str, column: u32) -> Option<usize> {
    line_text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line_text.len()))
        .nth(column.checked_sub(1)? as usize)
}

/// Splits the text following an opening parenthesis into raw top-level
/// argument fragments, stopping at the parenthesis that closes the list.
///
/// A top-level `;` ends the argument expressions; anything after it (a
/// per-call options tail) is scanned for balance but not captured. Comments
/// are replaced by a single space so adjacent tokens stay separated.
fn split_arguments(text: &str) -> Result<Vec<String>, CallSiteError> {
    let chars: Vec<char> = text.chars().collect();
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut depth = 1usize;
    // Angle-bracket nesting, entered only through `::<` so comparison and
    // shift operators never start it; commas inside a turbofish are not
    // argument separators.
    let mut angle_depth = 0usize;
    let mut options_tail = false;
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                if !options_tail {
                    current.push(' ');
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i = skip_block_comment(&chars, i + 2)?;
                if !options_tail {
                    current.push(' ');
                }
                prev = None;
                continue;
            }
            '"' => {
                i = copy_quoted(&chars, i, &mut current, options_tail)?;
                prev = Some('"');
                continue;
            }
            'r' | 'b' if !is_ident_char(prev) => {
                if let Some(next) = raw_string_start(&chars, i) {
                    i = copy_raw_string(&chars, i, next, &mut current, options_tail)?;
                    prev = Some('"');
                    continue;
                }
                if c == 'b' && chars.get(i + 1) == Some(&'"') {
                    if !options_tail {
                        current.push('b');
                    }
                    i = copy_quoted(&chars, i + 1, &mut current, options_tail)?;
                    prev = Some('"');
                    continue;
                }
                if !options_tail {
                    current.push(c);
                }
                prev = Some(c);
                i += 1;
                continue;
            }
            '\'' => {
                i = copy_char_or_lifetime(&chars, i, &mut current, options_tail);
                prev = Some('\'');
                continue;
            }
            '<' if angle_depth > 0 || current.ends_with("::") => {
                angle_depth += 1;
                if !options_tail {
                    current.push(c);
                }
            }
            '>' if angle_depth > 0 => {
                angle_depth -= 1;
                if !options_tail {
                    current.push(c);
                }
            }
            '(' | '[' | '{' => {
                depth += 1;
                if !options_tail {
                    current.push(c);
                }
            }
            ')' if depth == 1 => {
                if !options_tail {
                    fragments.push(std::mem::take(&mut current));
                }
                return Ok(fragments);
            }
            ')' | ']' | '}' => {
                if depth <= 1 {
                    return Err(CallSiteError::Unbalanced);
                }
                depth -= 1;
                if !options_tail {
                    current.push(c);
                }
            }
            ',' if depth == 1 && angle_depth == 0 => {
                if !options_tail {
                    fragments.push(std::mem::take(&mut current));
                }
            }
            ';' if depth == 1 => {
                if !options_tail {
                    fragments.push(std::mem::take(&mut current));
                }
                options_tail = true;
            }
            _ => {
                if !options_tail {
                    current.push(c);
                }
            }
        }
        prev = Some(c);
        i += 1;
    }
    Err(CallSiteError::Unbalanced)
}

fn is_ident_char(prev: Option<char>) -> bool {
    matches!(prev, Some(c) if c.is_alphanumeric() || c == '_')
}

/// Detects `r"`, `r#..#"`, `br"` etc. starting at `i`; returns the index of
/// the opening quote.
fn raw_string_start(chars: &[char], i: usize) -> Option<usize> {
    let mut j = i + 1;
    if chars[i] == 'b' {
        if chars.get(j) != Some(&'r') {
            return None;
        }
        j += 1;
    }
    while chars.get(j) == Some(&'#') {
        j += 1;
    }
    (chars.get(j) == Some(&'"')).then_some(j)
}

/// Copies a raw string literal starting at `i` (its `r`/`b`) with the
/// opening quote at `quote`; returns the index after the closing delimiter.
fn copy_raw_string(
    chars: &[char],
    i: usize,
    quote: usize,
    out: &mut String,
    suppress: bool,
) -> Result<usize, CallSiteError> {
    let hashes = chars[i..quote].iter().filter(|&&c| c == '#').count();
    let mut j = quote + 1;
    while j < chars.len() {
        if chars[j] == '"' && chars[j + 1..].iter().take(hashes).filter(|&&c| c == '#').count() == hashes {
            let end = j + 1 + hashes;
            if !suppress {
                out.extend(&chars[i..end]);
            }
            return Ok(end);
        }
        j += 1;
    }
    Err(CallSiteError::Unbalanced)
}

/// Copies a double-quoted string literal starting at `i`; returns the index
/// after the closing quote.
fn copy_quoted(
    chars: &[char],
    i: usize,
    out: &mut String,
    suppress: bool,
) -> Result<usize, CallSiteError> {
    if !suppress {
        out.push('"');
    }
    let mut j = i + 1;
    while j < chars.len() {
        let c = chars[j];
        if c == '\\' {
            if let Some(&escaped) = chars.get(j + 1) {
                if !suppress {
                    out.push(c);
                    out.push(escaped);
                }
                j += 2;
                continue;
            }
            return Err(CallSiteError::Unbalanced);
        }
        if !suppress {
            out.push(c);
        }
        j += 1;
        if c == '"' {
            return Ok(j);
        }
    }
    Err(CallSiteError::Unbalanced)
}

/// Copies a char literal (`'x'`, `'\n'`) or a bare lifetime tick starting
/// at `i`; returns the index after what was consumed.
fn copy_char_or_lifetime(chars: &[char], i: usize, out: &mut String, suppress: bool) -> usize {
    let is_char_literal = match chars.get(i + 1) {
        Some('\\') => true,
        Some(_) => chars.get(i + 2) == Some(&'\''),
        None => false,
    };
    if !is_char_literal {
        // A lifetime: copy the tick alone, the ident follows normally.
        if !suppress {
            out.push('\'');
        }
        return i + 1;
    }
    let mut j = i + 1;
    if !suppress {
        out.push('\'');
    }
    while j < chars.len() {
        let c = chars[j];
        if c == '\\' {
            if let Some(&escaped) = chars.get(j + 1) {
                if !suppress {
                    out.push(c);
                    out.push(escaped);
                }
                j += 2;
                continue;
            }
            return j + 1;
        }
        if !suppress {
            out.push(c);
        }
        j += 1;
        if c == '\'' {
            break;
        }
    }
    j
}

/// Skips a (possibly nested) block comment whose `/*` has already been
/// consumed; returns the index after the final `*/`.
fn skip_block_comment(chars: &[char], mut i: usize) -> Result<usize, CallSiteError> {
    let mut nesting = 1usize;
    while i < chars.len() {
        if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
            nesting += 1;
            i += 2;
        } else if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
            nesting -= 1;
            i += 2;
            if nesting == 0 {
                return Ok(i);
            }
        } else {
            i += 1;
        }
    }
    Err(CallSiteError::Unbalanced)
}

/// Trims a fragment and collapses whitespace runs that cross a line break
/// to a single space; intra-line spacing is the programmer's own spelling
/// and is preserved.
fn normalize_fragment(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains('\n') {
        return trimmed.to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_ws = String::new();
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            pending_ws.push(ch);
            continue;
        }
        if !pending_ws.is_empty() {
            if pending_ws.contains('\n') {
                out.push(' ');
            } else {
                out.push_str(&pending_ws);
            }
            pending_ws.clear();
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<String> {
        split_arguments(text)
            .unwrap()
            .iter()
            .map(|raw| normalize_fragment(raw))
            .filter(|fragment| !fragment.is_empty())
            .collect()
    }

    #[test]
    fn splits_simple_arguments() {
        assert_eq!(split("a, b)"), vec!["a", "b"]);
    }

    #[test]
    fn keeps_commas_inside_nested_delimiters() {
        assert_eq!(split("foo(1, 2), [3, 4])"), vec!["foo(1, 2)", "[3, 4]"]);
    }

    #[test]
    fn keeps_commas_inside_string_literals() {
        assert_eq!(split(r#""a, b", c)"#), vec![r#""a, b""#, "c"]);
    }

    #[test]
    fn keeps_delimiters_inside_string_literals() {
        assert_eq!(split(r#""(((", x)"#), vec!["\"(((\"", "x"]);
    }

    #[test]
    fn preserves_expression_spelling() {
        assert_eq!(split("3+4)"), vec!["3+4"]);
        assert_eq!(split("3 + 4)"), vec!["3 + 4"]);
    }

    #[test]
    fn drops_trailing_comma() {
        assert_eq!(split("a, b,)"), vec!["a", "b"]);
    }

    #[test]
    fn normalizes_multi_line_calls() {
        assert_eq!(split("\n    a,\n    \"foo\",\n)"), vec!["a", "\"foo\""]);
        assert_eq!(split("vec![\n    1,\n    2,\n])"), vec!["vec![ 1, 2, ]"]);
    }

    #[test]
    fn strips_comments() {
        assert_eq!(split("a, // trailing\n b)"), vec!["a", "b"]);
        assert_eq!(split("a /* note */, b)"), vec!["a", "b"]);
    }

    #[test]
    fn char_literal_comma_is_not_a_separator() {
        assert_eq!(split("',', x)"), vec!["','", "x"]);
    }

    #[test]
    fn turbofish_commas_are_not_separators() {
        assert_eq!(
            split("HashMap::<i32, i32>::new())"),
            vec!["HashMap::<i32, i32>::new()"]
        );
        assert_eq!(
            split("HashMap::<i32, Vec<i32>>::new(), x)"),
            vec!["HashMap::<i32, Vec<i32>>::new()", "x"]
        );
    }

    #[test]
    fn comparison_operators_do_not_suppress_splitting() {
        assert_eq!(split("a < b, c > d)"), vec!["a < b", "c > d"]);
        assert_eq!(split("x << 1, y)"), vec!["x << 1", "y"]);
    }

    #[test]
    fn lifetime_tick_does_not_open_a_literal() {
        assert_eq!(split("f::<'static>(v), x)"), vec!["f::<'static>(v)", "x"]);
    }

    #[test]
    fn raw_strings_are_copied_verbatim() {
        assert_eq!(split(r##"r#"a, )b"#, x)"##), vec![r##"r#"a, )b"#"##, "x"]);
    }

    #[test]
    fn options_tail_is_not_an_argument() {
        assert_eq!(split("x; with_type = true)"), vec!["x"]);
        assert_eq!(split("a, b; with_type = true, with_id = true)"), vec!["a", "b"]);
    }

    #[test]
    fn unbalanced_input_is_an_error() {
        assert!(matches!(
            split_arguments("a, (b"),
            Err(CallSiteError::Unbalanced)
        ));
        assert!(matches!(
            split_arguments("a]"),
            Err(CallSiteError::Unbalanced)
        ));
    }

    #[test]
    fn missing_file_reports_source_unavailable() {
        let err = recover("no/such/file.rs", 1, 1, 1).unwrap_err();
        assert!(matches!(err, CallSiteError::SourceUnavailable(_)));
    }

    #[test]
    fn recovers_from_a_real_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("peek_callsite_recover_test.rs");
        std::fs::write(&path, "fn main() {\n    peek!(first, second + 1);\n}\n").unwrap();
        let labels = recover(path.to_str().unwrap(), 2, 5, 2).unwrap();
        assert_eq!(labels, vec!["first", "second + 1"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let dir = std::env::temp_dir();
        let path = dir.join("peek_callsite_arity_test.rs");
        std::fs::write(&path, "    peek!(only_one);\n").unwrap();
        let err = recover(path.to_str().unwrap(), 1, 5, 2).unwrap_err();
        assert!(matches!(
            err,
            CallSiteError::ArityMismatch {
                expected: 2,
                found: 1
            }
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn head_not_found_on_plain_line() {
        let dir = std::env::temp_dir();
        let path = dir.join("peek_callsite_head_test.rs");
        std::fs::write(&path, "let x = 1;\n").unwrap();
        let err = recover(path.to_str().unwrap(), 1, 1, 1).unwrap_err();
        assert!(matches!(err, CallSiteError::HeadNotFound(1)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn prefers_the_peek_head_over_an_earlier_invocation() {
        let dir = std::env::temp_dir();
        let path = dir.join("peek_callsite_prefer_test.rs");
        std::fs::write(&path, "    assert_eq!(1, 1); peek!(value);\n").unwrap();
        // Deliberately wrong column: forces the line-scan path.
        let labels = recover(path.to_str().unwrap(), 1, 1, 1).unwrap();
        assert_eq!(labels, vec!["value"]);
        let _ = std::fs::remove_file(&path);
    }
}
