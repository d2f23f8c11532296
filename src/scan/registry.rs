//! Registration scanner
//!
//! Finds `REGISTER_STRUCT(Type, instance[, pack])` invocations in raw
//! (non-normalized) file text. The macro's own `#define` line is ignored.
//! Malformed invocations are dropped with a diagnostic rather than failing
//! the run; a stray mention in a comment should not kill code generation.

use std::path::Path;

use tracing::warn;

/// The marker macro this tool scans for. Its definition on the C side
/// expands to nothing; it exists purely as a registration request.
pub const MARKER_MACRO: &str = "REGISTER_STRUCT";

/// One deduplicated registration request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Registration {
    pub type_name: String,
    pub instance_name: String,
    /// `#pragma pack` override for the generated instance. `None` when the
    /// invocation had two arguments or passed the `0` sentinel.
    pub packing: Option<u32>,
}

/// Scan one file's raw text for marker invocations.
///
/// Returns requests in source order, possibly with duplicates; the caller
/// owns cross-file deduplication.
pub fn scan_registrations(text: &str, file: &Path) -> Vec<Registration> {
    // Knock out the macro definition so it never matches as an invocation.
    let text = text.replace(&format!("#define {MARKER_MACRO}"), "");

    let mut found = Vec::new();
    let mut from = 0;

    while let Some(rel) = text[from..].find(MARKER_MACRO) {
        let at = from + rel;
        let after = at + MARKER_MACRO.len();
        from = after;

        // An invocation is the marker followed (modulo whitespace) by a
        // parenthesized argument list. Anything else is prose.
        let tail = &text[after..];
        let open = match tail.find(|c: char| !c.is_whitespace()) {
            Some(pos) if tail[pos..].starts_with('(') => pos,
            _ => continue,
        };
        let Some(close) = tail[open..].find(')').map(|rel| open + rel) else {
            warn!(file = %file.display(), "unclosed {} invocation dropped", MARKER_MACRO);
            continue;
        };
        let args_text = &tail[open + 1..close];
        from = after + close + 1;

        match parse_arguments(args_text) {
            Ok(registration) => found.push(registration),
            Err(reason) => {
                warn!(
                    file = %file.display(),
                    args = args_text,
                    "{} invocation dropped: {}",
                    MARKER_MACRO,
                    reason
                );
            }
        }
    }

    found
}

fn parse_arguments(args_text: &str) -> Result<Registration, String> {
    if args_text.contains(&['{', '}', '(', ';'][..]) {
        return Err("argument list contains nested syntax".to_string());
    }

    let args: Vec<&str> = args_text.split(',').map(str::trim).collect();
    if args.len() != 2 && args.len() != 3 {
        return Err(format!("expected 2 or 3 arguments, found {}", args.len()));
    }
    if args.iter().any(|a| a.is_empty()) {
        return Err("empty argument".to_string());
    }

    let packing = match args.get(2) {
        None => None,
        Some(raw) => match raw.parse::<u32>() {
            // 0 is the no-override sentinel
            Ok(0) => None,
            Ok(n) => Some(n),
            Err(_) => return Err(format!("packing override '{raw}' is not an integer")),
        },
    };

    Ok(Registration {
        type_name: args[0].to_string(),
        instance_name: args[1].to_string(),
        packing,
    })
}
