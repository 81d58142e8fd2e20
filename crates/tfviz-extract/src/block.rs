//! Brace-matched block extraction.

/// Find the byte offset of the `}` closing the brace at `open`.
///
/// `text[open]` must be `{`. Counts nested braces, skipping over quoted
/// strings so that braces inside `"..."` do not affect the balance.
/// Escaped quotes inside strings are not handled; this is best-effort
/// extraction, matching the tool's overall contract.
///
/// Returns `None` when the block never closes.
pub(crate) fn find_closing_brace(text: &str, open: usize) -> Option<usize> {
    debug_assert_eq!(text.as_bytes().get(open), Some(&b'{'));

    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;

    for (offset, &byte) in bytes.iter().enumerate().skip(open) {
        match byte {
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the body between the brace at `open` and its matching close.
///
/// Returns the inner text (exclusive of both braces), or `None` when the
/// block never closes.
pub(crate) fn block_body(text: &str, open: usize) -> Option<&str> {
    let close = find_closing_brace(text, open)?;
    Some(&text[open + 1..close])
}
