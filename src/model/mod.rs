//! In-memory model of struct/union definitions
//!
//! A [`Frame`] models one definition: its kind, type name, instance name,
//! and an ordered list of [`Member`]s in source declaration order. Nested
//! definitions become child frames owned by their parent, so a source tree
//! of structs becomes a tree of frames.
//!
//! Frames are append-only during construction and read-only afterwards.
//! The ancestor chain is only passed down transiently while building, to
//! derive the two qualified path strings; children hold no back-references.

use crate::errors::ParseError;
use crate::scan::extract::{find_keyword, probe_definition, Probe, RawFrame};

/// Whether a definition is a `struct` or a `union`. Unions are modeled
/// identically to structs; the distinction only survives in the type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Struct,
    Union,
}

impl FrameKind {
    /// Synthesized type name for anonymous definitions.
    pub fn anonymous_name(self) -> &'static str {
        match self {
            FrameKind::Struct => "_Struct",
            FrameKind::Union => "_Union",
        }
    }
}

/// One named bitfield slot. Anonymous padding slots are discarded during
/// classification and never reach the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldField {
    pub name: String,
    /// Width text after the `:`, kept verbatim. May be a named constant
    /// rather than a numeric literal; nothing downstream evaluates it.
    pub width: String,
}

/// A direct member of a frame, in source declaration order.
#[derive(Debug, Clone)]
pub enum Member {
    /// Plain or array variable. `len` is the text between the brackets,
    /// kept verbatim (it may be a named constant); `None` means not an
    /// array.
    Scalar {
        ctype: String,
        name: String,
        len: Option<String>,
    },
    /// All bitfield slots sharing one storage type, in declaration order.
    Bitfield {
        ctype: String,
        fields: Vec<BitfieldField>,
    },
    /// Nested struct/union definition.
    Frame(Frame),
}

/// Ancestor context passed down while building nested frames.
struct Ancestor {
    type_name: String,
    instance_name: String,
}

/// Model of one struct-or-union definition, including nested children.
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub type_name: String,
    pub instance_name: String,
    /// Normalized body text between the outermost braces, reproduced
    /// verbatim in the generated static instance definition.
    pub body: String,
    pub members: Vec<Member>,
    /// Type names of all enclosing frames plus this one, joined with `::`.
    pub type_path: String,
    /// Non-empty instance names of all enclosing frames plus this one,
    /// joined with `.`. Empty only for an outermost frame with no
    /// instance name.
    pub field_path: String,
}

impl Frame {
    /// Build the frame tree for one extracted top-level definition.
    pub fn from_raw(raw: RawFrame) -> Result<Self, ParseError> {
        Self::build(raw, &[])
    }

    fn build(raw: RawFrame, parents: &[Ancestor]) -> Result<Self, ParseError> {
        let type_path = parents
            .iter()
            .map(|a| a.type_name.as_str())
            .chain([raw.type_name.as_str()])
            .collect::<Vec<_>>()
            .join("::");
        let field_path = parents
            .iter()
            .map(|a| a.instance_name.as_str())
            .chain([raw.instance_name.as_str()])
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(".");

        let chain: Vec<Ancestor> = parents
            .iter()
            .map(|a| Ancestor {
                type_name: a.type_name.clone(),
                instance_name: a.instance_name.clone(),
            })
            .chain([Ancestor {
                type_name: raw.type_name.clone(),
                instance_name: raw.instance_name.clone(),
            }])
            .collect();

        let members = classify_members(&raw.body, &chain)?;

        Ok(Frame {
            kind: raw.kind,
            type_name: raw.type_name,
            instance_name: raw.instance_name,
            body: raw.body,
            members,
            type_path,
            field_path,
        })
    }
}

/// Decompose a frame body into members, preserving declaration order.
///
/// Walks the body left to right: nested definitions are built recursively
/// as child frames (rejected ones are dropped wholesale), and the plain
/// text between them splits on `;` into bitfield and scalar declarations.
fn classify_members(body: &str, chain: &[Ancestor]) -> Result<Vec<Member>, ParseError> {
    let mut members: Vec<Member> = Vec::new();

    // plain_from: start of member text not yet classified
    // search: where to look for the next struct/union keyword
    let mut plain_from = 0usize;
    let mut search = 0usize;

    while let Some((rel, kind)) = find_keyword(&body[search..]) {
        let at = search + rel;
        match probe_definition(&body[at..], kind)? {
            Probe::NotDefinition { resume } => {
                // Keyword belongs to a plain declaration (`struct Foo x ;`);
                // leave the text in place for scalar classification.
                search = at + resume;
            }
            Probe::Rejected { end } => {
                classify_plain(&body[plain_from..at], &mut members)?;
                plain_from = at + end;
                search = plain_from;
            }
            Probe::Definition { raw, end } => {
                classify_plain(&body[plain_from..at], &mut members)?;
                let child = Frame::build(raw, chain)?;
                members.push(Member::Frame(child));
                plain_from = at + end;
                search = plain_from;
            }
        }
    }
    classify_plain(&body[plain_from..], &mut members)?;

    Ok(members)
}

/// Split member text on `;` and classify each declaration.
fn classify_plain(text: &str, members: &mut Vec<Member>) -> Result<(), ParseError> {
    for segment in text.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        // `::` is a scope-resolution artifact, not a bitfield declarator.
        if segment.contains(':') && !segment.contains("::") {
            classify_bitfield(segment, members)?;
        } else {
            members.push(parse_scalar(segment)?);
        }
    }
    Ok(())
}

/// Parse one bitfield declaration and merge it into an existing group
/// sharing the same storage type, or start a new group.
fn classify_bitfield(segment: &str, members: &mut Vec<Member>) -> Result<(), ParseError> {
    let mut type_tokens: Vec<&str> = Vec::new();
    let mut fields: Vec<BitfieldField> = Vec::new();

    for token in segment.split(' ') {
        if token.is_empty() || token == "," {
            continue;
        }
        if !token.contains(':') {
            type_tokens.push(token);
            continue;
        }
        let mut parts = token.split(':');
        let (name, width) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(width), None) => (name, width),
            _ => return Err(ParseError::new("invalid bitfield declaration", segment)),
        };
        if width.is_empty() {
            return Err(ParseError::new("bitfield declarator without a width", segment));
        }
        // Anonymous padding slots carry no reflectable metadata.
        if !name.is_empty() {
            fields.push(BitfieldField {
                name: name.to_string(),
                width: width.to_string(),
            });
        }
    }

    let ctype = type_tokens.join(" ");
    if ctype.is_empty() {
        return Err(ParseError::new("bitfield declaration without a type", segment));
    }

    let existing = members.iter_mut().find_map(|member| match member {
        Member::Bitfield {
            ctype: group_type,
            fields: group,
        } if *group_type == ctype => Some(group),
        _ => None,
    });
    match existing {
        Some(group) => group.extend(fields),
        None => members.push(Member::Bitfield { ctype, fields }),
    }
    Ok(())
}

/// Parse one plain or array member declaration. An array length is kept
/// as the verbatim text between the brackets.
fn parse_scalar(segment: &str) -> Result<Member, ParseError> {
    let (decl, len) = match segment.find('[') {
        Some(open) => {
            let close = segment
                .rfind(']')
                .filter(|close| *close > open)
                .ok_or_else(|| ParseError::new("unterminated array declaration", segment))?;
            let len = segment[open + 1..close].trim();
            if len.is_empty() {
                return Err(ParseError::new("array declaration without a length", segment));
            }
            (&segment[..open], Some(len.to_string()))
        }
        None => (segment, None),
    };

    let mut tokens: Vec<&str> = decl.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() < 2 {
        return Err(ParseError::new("invalid member declaration", segment));
    }
    let name = tokens.pop().unwrap_or_default().to_string();
    let ctype = tokens.join(" ");

    Ok(Member::Scalar { ctype, name, len })
}
