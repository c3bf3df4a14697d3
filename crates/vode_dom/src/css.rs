//! Inline style declaration handling.
//!
//! Declarations are kept in source order as `(property, value)` pairs and
//! serialized back in the `cssText` form browsers produce:
//! `color: red; font-size: 12px;`.

use compact_str::CompactString;
use smallvec::SmallVec;

/// Ordered style declarations.
pub type Declarations = SmallVec<[(CompactString, CompactString); 4]>;

/// Parse a `cssText` string into declarations.
///
/// Later declarations of the same property override earlier ones but keep
/// the earlier position. Declarations without a colon or with an empty
/// property name are skipped.
pub fn parse_declarations(text: &str) -> Declarations {
    let mut out = Declarations::new();
    for decl in text.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        set_declaration(&mut out, name, Some(value));
    }
    out
}

/// Serialize declarations to `cssText`.
pub fn serialize_declarations(decls: &Declarations) -> String {
    let mut out = String::new();
    for (name, value) in decls {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}

/// Set (or with `None`, remove) one declaration. Returns whether anything changed.
pub fn set_declaration(decls: &mut Declarations, name: &str, value: Option<&str>) -> bool {
    let pos = decls.iter().position(|(key, _)| key == name);
    match (pos, value.filter(|v| !v.is_empty())) {
        (Some(pos), Some(value)) => {
            if decls[pos].1 == value {
                return false;
            }
            decls[pos].1 = value.into();
            true
        }
        (None, Some(value)) => {
            decls.push((name.into(), value.into()));
            true
        }
        (Some(pos), None) => {
            decls.remove(pos);
            true
        }
        (None, None) => false,
    }
}
