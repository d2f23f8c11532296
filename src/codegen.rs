//! Code generator
//!
//! Joins the registration requests against the discovered frame model and
//! produces the text of the generated region: one static instance
//! definition per request, then a single `init_structs` function whose
//! body registers every reflectable leaf with the runtime macro layer.
//!
//! The emitted statement shapes are an external contract consumed by the
//! runtime macros (`REGISTER_INTERNAL_STRUCT`, `REGISTER_VAR`,
//! `REGISTER_ARR`, `REGISTER_BITFIELD`); argument order and quoting must
//! be reproduced exactly.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::model::{Frame, FrameKind, Member};
use crate::types::PrimitiveType;
use crate::workspace::Workspace;

/// Comment sentinel in the output file. Everything from this marker to the
/// end of the file is owned by the generator and replaced wholesale.
pub const GENERATED_MARKER: &str = "//@generated_structs";

/// Produce the full generated region (instances then init function) for
/// every registration in the workspace.
pub fn generate(workspace: &Workspace) -> Result<String> {
    let mut instances = String::new();
    let mut init_body = String::new();

    for registration in &workspace.registrations {
        let definition = workspace
            .definitions
            .get(&registration.type_name)
            .ok_or_else(|| Error::UnresolvedRegistration {
                type_name: registration.type_name.clone(),
                instance_name: registration.instance_name.clone(),
            })?;
        let frame = &definition.frame;
        if frame.kind == FrameKind::Union {
            return Err(Error::UnionRegistration {
                type_name: registration.type_name.clone(),
                instance_name: registration.instance_name.clone(),
            });
        }

        debug!(
            type_name = %registration.type_name,
            instance = %registration.instance_name,
            "generating registration"
        );

        // The instance reproduces the member text verbatim under a fresh
        // type name, so the generated file compiles without the original
        // header.
        if let Some(pack) = registration.packing {
            instances.push_str(&format!("#pragma pack(push, {pack})\n"));
        }
        instances.push_str(&format!(
            "static struct _{} {{ {} }} _{};\n",
            registration.type_name, frame.body, registration.instance_name
        ));
        if registration.packing.is_some() {
            instances.push_str("#pragma pack(pop)\n");
        }

        let owner = format!("_{}", registration.instance_name);
        init_body.push_str(&format!(
            "    REGISTER_INTERNAL_STRUCT(_{}, {});\n",
            registration.type_name, owner
        ));
        emit_frame(frame, &owner, "", &mut init_body);
    }

    info!(
        registrations = workspace.registrations.len(),
        "generated init_structs"
    );
    Ok(format!(
        "{}\nvoid init_structs()\n{{\n{}}}\n",
        instances, init_body
    ))
}

/// Emit one registration statement per reflectable leaf of `frame`, in
/// member order, recursing through nested frames. `prefix` is the dotted
/// field path from the registered root down to (and including) this
/// frame's instance name.
fn emit_frame(frame: &Frame, owner: &str, prefix: &str, out: &mut String) {
    for member in &frame.members {
        match member {
            Member::Frame(child) => {
                let child_prefix = join_path(prefix, &child.instance_name);
                emit_frame(child, owner, &child_prefix, out);
            }
            Member::Scalar { ctype, name, len } => {
                // Lookup miss means the member is not reflectable; it is
                // silently omitted from the generated registrations.
                let Some(kind) = PrimitiveType::from_spelling(ctype) else {
                    continue;
                };
                let path = join_path(prefix, name);
                match len {
                    None => out.push_str(&format!(
                        "    REGISTER_VAR({}, {}, {}, \"{}\", {});\n",
                        owner,
                        path,
                        kind.c_name(),
                        kind.display_format(),
                        kind.parse_function()
                    )),
                    // The length text goes out verbatim; a named constant
                    // resolves when the generated file compiles.
                    Some(len) => out.push_str(&format!(
                        "    REGISTER_ARR({}, {}, {}, {}, \"{}\", {});\n",
                        owner,
                        path,
                        len,
                        kind.c_name(),
                        kind.display_format(),
                        kind.parse_function()
                    )),
                }
            }
            Member::Bitfield { ctype, fields } => {
                let Some(kind) = PrimitiveType::from_spelling(ctype) else {
                    continue;
                };
                for field in fields {
                    let path = join_path(prefix, &field.name);
                    out.push_str(&format!(
                        "    REGISTER_BITFIELD({}, {}, {}, \"{}\", {});\n",
                        owner,
                        path,
                        kind.c_name(),
                        kind.display_format(),
                        kind.parse_function()
                    ));
                }
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        // Anonymous enclosers contribute no path segment.
        prefix.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Replace everything from the generated-region marker onward with the
/// freshly generated text.
pub fn splice(original: &str, generated: &str, file: &Path) -> Result<String> {
    let at = original
        .find(GENERATED_MARKER)
        .ok_or_else(|| Error::MissingMarker {
            file: file.to_path_buf(),
            marker: GENERATED_MARKER.to_string(),
        })?;
    Ok(format!(
        "{}{}\n{}",
        &original[..at],
        GENERATED_MARKER,
        generated
    ))
}

/// Generate and write the output file. Generation happens entirely before
/// the write, so a fatal error never leaves the file half-updated.
pub fn write_output(workspace: &Workspace, path: &Path) -> Result<()> {
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let generated = generate(workspace)?;
    let updated = splice(&original, &generated, path)?;
    fs::write(path, updated).map_err(|e| Error::io(path, e))?;
    info!(file = %path.display(), "output updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn workspace_from(sources: &[(&str, &str)]) -> Workspace {
        use std::io::Write;
        let dir = tempfile::TempDir::new().unwrap();
        let mut ws = Workspace::new();
        for (name, contents) in sources {
            let path = dir.path().join(name);
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            ws.scan_file(&path).unwrap();
        }
        ws
    }

    #[test]
    fn test_flattened_leaf_registrations() {
        let ws = workspace_from(&[(
            "main.c",
            "struct S { int a; struct { int b; } nested; unsigned f1:3; unsigned f2:5; };\n\
             REGISTER_STRUCT(S, mystruct);\n",
        )]);
        let text = generate(&ws).unwrap();

        assert!(text.contains("REGISTER_VAR(_mystruct, a, int32_t, \"%d\", stol);"));
        assert!(text.contains("REGISTER_VAR(_mystruct, nested.b, int32_t, \"%d\", stol);"));
        assert!(text.contains("REGISTER_BITFIELD(_mystruct, f1, uint32_t, \"%u\", stoul_0x);"));
        assert!(text.contains("REGISTER_BITFIELD(_mystruct, f2, uint32_t, \"%u\", stoul_0x);"));

        // Exactly four leaves; the frames themselves produce no entry.
        let leaves = text
            .matches("REGISTER_VAR")
            .count()
            + text.matches("REGISTER_BITFIELD").count()
            + text.matches("REGISTER_ARR").count();
        assert_eq!(leaves, 4);
        assert!(text.contains("REGISTER_INTERNAL_STRUCT(_S, _mystruct);"));
    }

    #[test]
    fn test_static_instance_definition() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { int a; };\nREGISTER_STRUCT(T, t);\n",
        )]);
        let text = generate(&ws).unwrap();
        assert!(text.contains("static struct _T { int a ; } _t;"));
    }

    #[test]
    fn test_packing_override_wraps_instance() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { int a; };\nREGISTER_STRUCT(T, t, 1);\n",
        )]);
        let text = generate(&ws).unwrap();
        let pack_at = text.find("#pragma pack(push, 1)").unwrap();
        let instance_at = text.find("static struct _T").unwrap();
        let pop_at = text.find("#pragma pack(pop)").unwrap();
        assert!(pack_at < instance_at && instance_at < pop_at);
    }

    #[test]
    fn test_array_member_registration() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { long long d[4]; };\nREGISTER_STRUCT(T, t);\n",
        )]);
        let text = generate(&ws).unwrap();
        assert!(text.contains("REGISTER_ARR(_t, d, 4, int64_t, \"%lld\", stol);"));
    }

    #[test]
    fn test_symbolic_lengths_and_widths_survive() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { char buf[BUF_LEN]; unsigned r:NBITS; };\nREGISTER_STRUCT(T, t);\n",
        )]);
        let text = generate(&ws).unwrap();
        assert!(text.contains("REGISTER_ARR(_t, buf, BUF_LEN, int8_t, \"%d\", stol);"));
        assert!(text.contains("REGISTER_BITFIELD(_t, r, uint32_t, \"%u\", stoul_0x);"));
    }

    #[test]
    fn test_unreflectable_member_silently_omitted() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { const char *str; double dd; };\nREGISTER_STRUCT(T, t);\n",
        )]);
        let text = generate(&ws).unwrap();
        assert!(!text.contains("REGISTER_VAR(_t, str"));
        assert!(text.contains("REGISTER_VAR(_t, dd, double, \"%lf\", stod);"));
    }

    #[test]
    fn test_same_type_registered_twice() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { int a; };\nREGISTER_STRUCT(T, one);\nREGISTER_STRUCT(T, two);\n",
        )]);
        let text = generate(&ws).unwrap();
        assert!(text.contains("REGISTER_VAR(_one, a,"));
        assert!(text.contains("REGISTER_VAR(_two, a,"));
    }

    #[test]
    fn test_unresolved_registration_is_fatal() {
        let ws = workspace_from(&[("main.c", "REGISTER_STRUCT(Ghost, g);\n")]);
        let err = generate(&ws).unwrap_err();
        assert!(matches!(err, Error::UnresolvedRegistration { .. }));
    }

    #[test]
    fn test_union_root_rejected() {
        let ws = workspace_from(&[(
            "main.c",
            "union U { int a; };\nREGISTER_STRUCT(U, u);\n",
        )]);
        let err = generate(&ws).unwrap_err();
        assert!(matches!(err, Error::UnionRegistration { .. }));
    }

    #[test]
    fn test_anonymous_encloser_omitted_from_path() {
        let ws = workspace_from(&[(
            "main.c",
            "struct T { union { int raw; }; };\nREGISTER_STRUCT(T, t);\n",
        )]);
        let text = generate(&ws).unwrap();
        assert!(text.contains("REGISTER_VAR(_t, raw, int32_t, \"%d\", stol);"));
    }

    #[test]
    fn test_splice_replaces_tail() {
        let original = "#include \"structs.h\"\n\n//@generated_structs\nold junk\nmore old junk\n";
        let spliced = splice(original, "NEW\n", &PathBuf::from("structs.cpp")).unwrap();
        assert!(spliced.starts_with("#include \"structs.h\""));
        assert!(spliced.contains("//@generated_structs\nNEW"));
        assert!(!spliced.contains("old junk"));
    }

    #[test]
    fn test_splice_requires_marker() {
        let err = splice("no marker here", "NEW\n", &PathBuf::from("structs.cpp")).unwrap_err();
        assert!(matches!(err, Error::MissingMarker { .. }));
    }
}
