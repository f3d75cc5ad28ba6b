//! Final wrapping of the declaration and definition buffers.

use crate::transform::ImportRegistry;

/// Headers every declaration unit includes
pub const STANDARD_INCLUDES: &[&str] = &[
    "memory", "string", "vector", "iostream", "map", "list", "thread", "functional",
];

/// Include guard macro for a unit. Characters that cannot appear in a
/// macro name become underscores.
pub fn include_guard(unit_name: &str) -> String {
    let mut guard: String = unit_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if guard.starts_with(|c: char| c.is_ascii_digit()) || guard.is_empty() {
        guard.insert(0, '_');
    }
    guard.push_str("_H");
    guard
}

/// Wrap the declaration buffer in an include guard and the standard includes
pub fn finalize_header(unit_name: &str, declarations: &str) -> String {
    let guard = include_guard(unit_name);
    let mut header = format!("#ifndef {guard}\n#define {guard}\n\n");

    for include in STANDARD_INCLUDES {
        header.push_str(&format!("#include <{}>\n", include));
    }
    header.push('\n');

    let body = declarations.trim_end();
    if !body.is_empty() {
        header.push_str(body);
        header.push_str("\n\n");
    }

    header.push_str("#endif\n");
    header
}

/// Prefix the definition buffer with the imported libraries and the unit's own header
pub fn finalize_source(unit_name: &str, imports: &ImportRegistry, definitions: &str) -> String {
    let mut source = String::new();

    for library in imports.iter() {
        source.push_str(&format!("#include <{}.h>\n", library));
    }
    source.push_str(&format!("#include \"{}.h\"\n", unit_name));

    let body = definitions.trim_end();
    if !body.is_empty() {
        source.push('\n');
        source.push_str(body);
        source.push('\n');
    }

    source
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("Player"), "Player_H");
        assert_eq!(include_guard("my-game.v2"), "my_game_v2_H");
        assert_eq!(include_guard("3d"), "_3d_H");
    }

    #[test]
    fn test_empty_units() {
        let header = finalize_header("empty", "");
        assert!(header.starts_with("#ifndef empty_H\n#define empty_H\n\n#include <memory>\n"));
        assert!(header.ends_with("#include <functional>\n\n#endif\n"));

        let source = finalize_source("empty", &ImportRegistry::new(), "");
        assert_eq!(source, "#include \"empty.h\"\n");
    }

    #[test]
    fn test_imports_precede_unit_include() {
        let mut imports = ImportRegistry::new();
        imports.register("math");
        imports.register("glfw");
        let source = finalize_source("game", &imports, "void f();\n\n");
        assert_eq!(
            source,
            "#include <math.h>\n#include <glfw.h>\n#include \"game.h\"\n\nvoid f();\n"
        );
    }
}
