//! Derives Swift identifiers from raw SVD names.

/// Swift keywords that must be backtick-escaped in declaration position.
const KEYWORDS: &[&str] = &[
    "as", "break", "case", "catch", "class", "continue", "default", "defer", "do", "else", "enum",
    "extension", "fallthrough", "false", "for", "func", "guard", "if", "import", "in", "init",
    "inout", "internal", "is", "let", "nil", "operator", "private", "protocol", "public", "repeat",
    "rethrows", "return", "self", "static", "struct", "subscript", "super", "switch", "throw",
    "throws", "true", "try", "typealias", "var", "where", "while",
];

/// Turns a raw schema name into a valid Swift type identifier.
///
/// Array placeholders (`%s`, `[%s]`) are stripped, characters illegal in an
/// identifier become `_`, and a leading digit is prefixed with `_`. Case is
/// preserved.
pub(crate) fn sanitize(name: &str) -> String {
    let name = name.replace("[%s]", "").replace("%s", "");
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Backtick-escapes `name` if it is a Swift keyword.
pub(crate) fn escape(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

/// Derives the type identifier for a field within its register.
///
/// Two collisions are avoided heuristically: a field named like its
/// enclosing register is suffixed with `_FIELD`, and an entirely lowercase
/// name (which would collide with the lowercased instance accessor) is
/// uppercased wholesale.
pub(crate) fn field_type_name(field_name: &str, register_type_name: &str) -> String {
    let mut name = sanitize(field_name);
    if name == register_type_name {
        name.push_str("_FIELD");
    }
    if name == name.to_lowercase() {
        name = name.to_uppercase();
    }
    name
}
