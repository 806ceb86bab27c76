// SPDX-License-Identifier: Apache-2.0

//! Escaping for text handed to [`crate::XmlWriter`].
//!
//! The writer takes raw markup-ready text and only validates it. These
//! helpers turn arbitrary strings into such text, borrowing the input when
//! nothing needs to change.

use alloc::borrow::Cow;
use alloc::string::String;

use crate::attribute::Quote;

/// Escapes character data: `&`, `<`, and `>` where it would complete `]]>`.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut p = 0;
    for (i, r) in input.match_indices(['&', '<', '>']) {
        let replacement = match r {
            "&" => "&amp;",
            "<" => "&lt;",
            _ if input[..i].ends_with("]]") => "&gt;",
            _ => continue,
        };
        let out = out.get_or_insert_with(|| String::with_capacity(input.len() + 8));
        out.push_str(&input[p..i]);
        out.push_str(replacement);
        p = i + 1;
    }
    finish(input, out, p)
}

/// Escapes an attribute value for use between `quote`s: `&`, `<` and the
/// quote character itself. The other quote character is left alone.
pub fn escape_attribute_value(input: &str, quote: Quote) -> Cow<'_, str> {
    let (quote_char, quote_ref) = match quote {
        Quote::Double => ('"', "&quot;"),
        Quote::Apostrophe => ('\'', "&apos;"),
    };
    let mut out: Option<String> = None;
    let mut p = 0;
    for (i, r) in input.match_indices(['&', '<', quote_char]) {
        let replacement = match r {
            "&" => "&amp;",
            "<" => "&lt;",
            _ => quote_ref,
        };
        let out = out.get_or_insert_with(|| String::with_capacity(input.len() + 8));
        out.push_str(&input[p..i]);
        out.push_str(replacement);
        p = i + 1;
    }
    finish(input, out, p)
}

fn finish(input: &str, out: Option<String>, p: usize) -> Cow<'_, str> {
    match out {
        Some(mut out) => {
            out.push_str(&input[p..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(input),
    }
}
