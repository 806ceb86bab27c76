// SPDX-License-Identifier: Apache-2.0

//! XML 1.0 character classes and whole-string validators.
//!
//! The predicates classify a single code point. The validators walk a
//! complete string and apply the structural rules of a production on top
//! (no `--` in comments, no `?>` in PI data, references in text and
//! attribute values, ...). The writer uses them to check caller-supplied
//! content; the streaming token parsers apply the same rules incrementally.
//!
//! Each `check_*` function reports the byte offset of the first violation,
//! the matching `validate_*` function is its boolean form.

use alloc::vec::Vec;

use crate::attribute::Quote;
use crate::utf8::{encoded_length, MAX_CODE_POINT};

/// `NameStartChar` ranges outside ASCII
const NAME_START_CHAR_TABLE: &[(char, char)] = &[
    ('\u{C0}', '\u{D6}'),
    ('\u{D8}', '\u{F6}'),
    ('\u{F8}', '\u{2FF}'),
    ('\u{370}', '\u{37D}'),
    ('\u{37F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

/// Additional `NameChar` ranges outside ASCII
const NAME_CHAR_TABLE: &[(char, char)] = &[
    ('\u{B7}', '\u{B7}'),
    ('\u{300}', '\u{36F}'),
    ('\u{203F}', '\u{2040}'),
];

fn search_table(c: char, table: &[(char, char)]) -> bool {
    table.iter().any(|&(lo, hi)| c >= lo && c <= hi)
}

/// `S ::= (#x20 | #x9 | #xD | #xA)+`
#[inline]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// <https://www.w3.org/TR/REC-xml/#NT-NameStartChar>
#[inline]
pub fn is_name_start_char(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphabetic() || c == ':' || c == '_'
    } else {
        search_table(c, NAME_START_CHAR_TABLE)
    }
}

/// <https://www.w3.org/TR/REC-xml/#NT-NameChar>
#[inline]
pub fn is_name_char(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-' | '.')
    } else {
        search_table(c, NAME_START_CHAR_TABLE) || search_table(c, NAME_CHAR_TABLE)
    }
}

/// `Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
#[inline]
pub fn is_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' => true,
        '\u{10000}'..='\u{10FFFF}' => true,
        _ => false,
    }
}

/// Value of a single decimal or hexadecimal digit.
pub(crate) fn digit_value(c: char, hex: bool) -> Option<u32> {
    c.to_digit(if hex { 16 } else { 10 })
}

/// Accumulate one more digit of a character reference. Returns `None` once
/// the value exceeds the highest code point.
pub(crate) fn accumulate_digit(value: u32, digit: u32, hex: bool) -> Option<u32> {
    let radix = if hex { 16 } else { 10 };
    let next = value.checked_mul(radix)?.checked_add(digit)?;
    (next <= MAX_CODE_POINT).then_some(next)
}

/// Length in code points of the reference starting at `chars[start]`
/// (which must be `&`), including the closing `;`.
fn reference_len(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'#') {
        i += 1;
        let hex = chars.get(i) == Some(&'x');
        if hex {
            i += 1;
        }
        let digits_start = i;
        let mut value = 0u32;
        while let Some(digit) = chars.get(i).and_then(|&c| digit_value(c, hex)) {
            value = accumulate_digit(value, digit, hex)?;
            i += 1;
        }
        if i == digits_start || chars.get(i) != Some(&';') {
            return None;
        }
        char::from_u32(value).filter(|&c| is_char(c))?;
    } else {
        if !chars.get(i).is_some_and(|&c| is_name_start_char(c)) {
            return None;
        }
        i += 1;
        while chars.get(i).is_some_and(|&c| is_name_char(c)) {
            i += 1;
        }
        if chars.get(i) != Some(&';') {
            return None;
        }
    }
    Some(i + 1 - start)
}

/// Runs `rule` over every code point. `rule` returns how many code points it
/// consumed, or `None` for a violation at that index.
fn scan<F>(s: &str, mut rule: F) -> Result<(), usize>
where
    F: FnMut(&[char], usize) -> Option<usize>,
{
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match rule(&chars, i) {
            Some(step) => i += step.max(1),
            None => return Err(encoded_length(&chars, 0..i)),
        }
    }
    Ok(())
}

fn starts_with_at(chars: &[char], i: usize, pattern: &str) -> bool {
    let mut j = i;
    for p in pattern.chars() {
        if chars.get(j) != Some(&p) {
            return false;
        }
        j += 1;
    }
    true
}

pub fn check_name(s: &str) -> Result<(), usize> {
    if s.is_empty() {
        return Err(0);
    }
    scan(s, |chars, i| {
        let c = chars[i];
        let ok = if i == 0 {
            is_name_start_char(c)
        } else {
            is_name_char(c)
        };
        ok.then_some(1)
    })
}

/// Comment text must not contain `--` and must not end in `-`.
pub fn check_comment_text(s: &str) -> Result<(), usize> {
    scan(s, |chars, i| {
        let c = chars[i];
        if !is_char(c) {
            return None;
        }
        if c == '-' && (i + 1 == chars.len() || chars[i + 1] == '-') {
            return None;
        }
        Some(1)
    })
}

/// A PI target is a Name other than `xml` in any letter case.
pub fn check_pi_target(s: &str) -> Result<(), usize> {
    check_name(s)?;
    if s.eq_ignore_ascii_case("xml") {
        return Err(0);
    }
    Ok(())
}

/// PI data must not contain `?>`.
pub fn check_pi_value(s: &str) -> Result<(), usize> {
    scan(s, |chars, i| {
        let c = chars[i];
        if !is_char(c) || starts_with_at(chars, i, "?>") {
            return None;
        }
        Some(1)
    })
}

/// Raw attribute value as it appears between `quote`s: no `<`, no bare
/// `&`, no unescaped `quote`. The other quote character is plain content.
pub fn check_att_value(s: &str, quote: Quote) -> Result<(), usize> {
    let quote = quote.as_char();
    scan(s, |chars, i| match chars[i] {
        '<' => None,
        '&' => reference_len(chars, i),
        c if c == quote => None,
        c => is_char(c).then_some(1),
    })
}

/// Raw character data: like an attribute value without quote rules, and
/// `]]>` is not allowed.
pub fn check_text_node(s: &str) -> Result<(), usize> {
    scan(s, |chars, i| match chars[i] {
        '<' => None,
        '&' => reference_len(chars, i),
        ']' if starts_with_at(chars, i, "]]>") => None,
        c => is_char(c).then_some(1),
    })
}

/// CDATA section content: any Char, but not `]]>`.
pub fn check_cdata(s: &str) -> Result<(), usize> {
    scan(s, |chars, i| {
        let c = chars[i];
        if !is_char(c) || starts_with_at(chars, i, "]]>") {
            return None;
        }
        Some(1)
    })
}

pub fn validate_name(s: &str) -> bool {
    check_name(s).is_ok()
}

pub fn validate_comment_text(s: &str) -> bool {
    check_comment_text(s).is_ok()
}

pub fn validate_pi_target(s: &str) -> bool {
    check_pi_target(s).is_ok()
}

pub fn validate_pi_value(s: &str) -> bool {
    check_pi_value(s).is_ok()
}

pub fn validate_att_value(s: &str, quote: Quote) -> bool {
    check_att_value(s, quote).is_ok()
}

pub fn validate_text_node(s: &str) -> bool {
    check_text_node(s).is_ok()
}

pub fn validate_cdata(s: &str) -> bool {
    check_cdata(s).is_ok()
}
