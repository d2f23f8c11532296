//! Source normalizer
//!
//! Turns raw C/C++ source text into the canonical token stream the frame
//! extractor operates on: comments gone, preprocessor lines gone, default
//! member initializers gone, and exactly one space around every structural
//! token (`{` `}` `[` `]` `;` `*` `,`). The `:` of a bitfield declarator is
//! made tight instead, so `name : 3` survives as the single token `name:3`.
//!
//! The passes are order-sensitive and each is a plain character-cursor
//! scan. Normalizing already-normalized text is a no-op.

use crate::errors::ParseError;

/// Characters that must end up padded with single spaces on both sides.
fn is_structural(ch: char) -> bool {
    matches!(ch, '{' | '}' | '[' | ']' | ';' | '*' | ',')
}

/// Normalize raw source text into the canonical form.
pub fn normalize(source: &str) -> Result<String, ParseError> {
    let text = strip_block_comments(source)?;
    let text = strip_line_comments(&text);
    let text = strip_preprocessor_lines(&text);
    let text = strip_initializers(&text);
    Ok(canonicalize_whitespace(&text))
}

/// Remove every `/* ... */` block. Blocks do not nest: the first `*/`
/// closes the first `/*`.
fn strip_block_comments(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return Err(ParseError::new("unterminated block comment", &rest[start..])),
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Truncate every line at its `//` comment.
fn strip_line_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        match line.find("//") {
            Some(pos) => out.push_str(&line[..pos]),
            None => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

/// Drop lines whose first non-blank character is `#`. Preprocessor
/// conditionals and macro definitions are outside the supported subset;
/// they are removed wholesale rather than interpreted.
fn strip_preprocessor_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.trim_start().starts_with('#') {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Delete every `= ...` initializer up to (but not including) the next
/// `;`. Default member values carry no layout information and their
/// contents would otherwise confuse the brace counter.
fn strip_initializers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skipping = false;

    for ch in text.chars() {
        if skipping {
            if ch == ';' {
                skipping = false;
                out.push(ch);
            }
            continue;
        }
        if ch == '=' {
            skipping = true;
            continue;
        }
        out.push(ch);
    }

    out
}

/// Collapse whitespace runs to single spaces, force single-space padding
/// around structural tokens, and glue `:` tight to both neighbors.
fn canonicalize_whitespace(text: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if is_structural(ch) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    // Structural tokens are always space-separated; a `:` only glues to
    // non-structural neighbors, so `, :6` keeps its comma padding while
    // `a : 10` collapses to `a:10`.
    let single_structural =
        |t: &str| t.len() == 1 && is_structural(t.chars().next().unwrap_or(' '));

    let mut out = String::with_capacity(text.len());
    let mut prev_glue = false;
    let mut prev_structural = false;
    for token in &tokens {
        let structural = single_structural(token);
        let glue = !structural && (prev_glue || (token.starts_with(':') && !prev_structural));
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(token);
        prev_glue = !structural && token.ends_with(':');
        prev_structural = structural;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_comment_removed() {
        let text = "int a; /* hidden { brace */ int b;";
        assert_eq!(normalize(text).unwrap(), "int a ; int b ;");
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = normalize("int a; /* oops").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_line_comment_removed() {
        let text = "int a; // trailing } junk\nint b;";
        assert_eq!(normalize(text).unwrap(), "int a ; int b ;");
    }

    #[test]
    fn test_preprocessor_lines_removed() {
        let text = "#include <stdio.h>\nint a;\n  #define X 1\nint b;";
        assert_eq!(normalize(text).unwrap(), "int a ; int b ;");
    }

    #[test]
    fn test_initializer_removed() {
        let text = "struct S { int a = 5; int b; };";
        assert_eq!(normalize(text).unwrap(), "struct S { int a ; int b ; } ;");
    }

    #[test]
    fn test_structural_padding() {
        let text = "struct S{int a;long long d[4];};";
        assert_eq!(
            normalize(text).unwrap(),
            "struct S { int a ; long long d [ 4 ] ; } ;"
        );
    }

    #[test]
    fn test_bitfield_colon_tightened() {
        let text = "unsigned int a : 10, : 6, c:12;";
        assert_eq!(normalize(text).unwrap(), "unsigned int a:10 , :6 , c:12 ;");
    }

    #[test]
    fn test_scope_colons_glued() {
        let text = "std :: string s;";
        assert_eq!(normalize(text).unwrap(), "std::string s ;");
    }

    #[test]
    fn test_idempotent() {
        let text = "struct S { /* c */ int a = 1; unsigned b : 3; char s[8]; } inst;";
        let once = normalize(text).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }
}
