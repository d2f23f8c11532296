//! Frame extractor
//!
//! Locates `struct`/`union` definitions in normalized text and
//! brace-matches their bodies. The extractor deliberately rejects anything
//! it cannot model: a `;` or a disallowed character (`(` `)` `<` `>`)
//! before the opening brace means the keyword belongs to a forward
//! declaration, a plain variable declaration, or a construct outside the
//! supported subset (templates, function pointers, constructors), and the
//! candidate is skipped instead of mis-parsed. A disallowed character
//! inside an otherwise well-formed body rejects the whole frame.

use crate::errors::ParseError;
use crate::model::FrameKind;

/// Characters that never appear in a supported definition.
const DISALLOWED: &[char] = &['(', ')', '<', '>'];

/// One raw struct/union definition sliced out of normalized text.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub kind: FrameKind,
    /// Declared type name, or `_Struct`/`_Union` when anonymous.
    pub type_name: String,
    /// Variable name between the closing brace and the terminating `;`,
    /// empty if absent.
    pub instance_name: String,
    /// Full definition text, from the keyword through the terminating `;`.
    pub text: String,
    /// Content strictly between the outermost braces, trimmed.
    pub body: String,
}

/// Result of scanning a stretch of text for the next definition.
#[derive(Debug)]
pub enum FrameMatch {
    Definition(RawFrame),
    /// A `struct`/`union` keyword was found but did not start a supported
    /// definition; scanning should continue with the remainder.
    Skipped,
    /// No keyword left in the text.
    None,
}

/// Outcome of probing text that starts at a `struct`/`union` keyword.
/// Offsets are relative to the keyword.
#[derive(Debug)]
pub(crate) enum Probe {
    /// Not a definition (forward declaration or plain declaration); resume
    /// keyword scanning at `resume`, leaving the text itself in place.
    NotDefinition { resume: usize },
    /// A complete definition containing unsupported syntax; the whole
    /// region up to `end` must be discarded.
    Rejected { end: usize },
    /// A supported definition occupying `..end`.
    Definition { raw: RawFrame, end: usize },
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find the earliest standalone `struct` or `union` keyword.
pub(crate) fn find_keyword(text: &str) -> Option<(usize, FrameKind)> {
    let s = find_word(text, "struct").map(|p| (p, FrameKind::Struct));
    let u = find_word(text, "union").map(|p| (p, FrameKind::Union));
    match (s, u) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Substring search with identifier-boundary checks, so `my_struct_t`
/// never matches `struct`.
fn find_word(text: &str, word: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(rel) = text[from..].find(word) {
        let pos = from + rel;
        let end = pos + word.len();
        let bounded_left = pos == 0 || !is_ident_byte(bytes[pos - 1]);
        let bounded_right = end >= bytes.len() || !is_ident_byte(bytes[end]);
        if bounded_left && bounded_right {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// Probe text that starts at a `struct`/`union` keyword.
pub(crate) fn probe_definition(text: &str, kind: FrameKind) -> Result<Probe, ParseError> {
    let open = text.find('{');
    let semi = text.find(';');
    let disallowed = text.find(DISALLOWED);

    let open = match open {
        Some(open) => open,
        None => {
            // No body anywhere after the keyword: a trailing forward
            // declaration, or truncated input.
            let resume = semi
                .into_iter()
                .chain(disallowed)
                .min()
                .ok_or_else(|| ParseError::new("no brace enclosure for definition", text))?;
            return Ok(Probe::NotDefinition { resume: resume + 1 });
        }
    };

    let stop = semi.unwrap_or(usize::MAX).min(disallowed.unwrap_or(usize::MAX));
    if stop < open {
        return Ok(Probe::NotDefinition { resume: stop + 1 });
    }

    let mut depth = 0usize;
    let mut close = None;
    let mut saw_disallowed = false;
    for (off, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + off);
                    break;
                }
            }
            '(' | ')' | '<' | '>' => saw_disallowed = true,
            _ => {}
        }
    }
    let close = close.ok_or_else(|| ParseError::new("unbalanced braces in definition", text))?;
    let term = text[close..]
        .find(';')
        .map(|rel| close + rel)
        .ok_or_else(|| ParseError::new("missing ';' after definition", text))?;
    let end = term + 1;

    if saw_disallowed {
        return Ok(Probe::Rejected { end });
    }

    let frame_text = text[..end].trim();
    let type_name = match frame_text.split(' ').nth(1) {
        Some("{") | None => kind.anonymous_name().to_string(),
        Some(name) => name.to_string(),
    };
    // close/term recomputed against the trimmed slice
    let rbrace = frame_text
        .rfind('}')
        .ok_or_else(|| ParseError::new("unbalanced braces in definition", text))?;
    let rsemi = frame_text
        .rfind(';')
        .ok_or_else(|| ParseError::new("missing ';' after definition", text))?;
    let instance_name = frame_text[rbrace + 1..rsemi].trim().to_string();
    let lbrace = frame_text
        .find('{')
        .ok_or_else(|| ParseError::new("no brace enclosure for definition", text))?;
    let body = frame_text[lbrace + 1..rbrace].trim().to_string();

    Ok(Probe::Definition {
        raw: RawFrame {
            kind,
            type_name,
            instance_name,
            text: frame_text.to_string(),
            body,
        },
        end,
    })
}

/// Extract the next struct/union definition from normalized text.
///
/// Returns the match together with the unconsumed remainder. Repeated
/// application until [`FrameMatch::None`] visits every definition in the
/// text exactly once.
pub fn extract_frame(text: &str) -> Result<(FrameMatch, String), ParseError> {
    let Some((pos, kind)) = find_keyword(text) else {
        return Ok((FrameMatch::None, text.to_string()));
    };
    let tail = &text[pos..];

    let (matched, end) = match probe_definition(tail, kind)? {
        Probe::NotDefinition { resume } => (FrameMatch::Skipped, resume),
        Probe::Rejected { end } => (FrameMatch::Skipped, end),
        Probe::Definition { raw, end } => (FrameMatch::Definition(raw), end),
    };
    Ok((matched, tail[end..].trim_start().to_string()))
}
