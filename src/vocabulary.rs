//! Closed vocabulary of the FL language.

/// Every word the lexer tags as a keyword. Anything else matching the
/// identifier pattern is an identifier.
const KEYWORDS: &[&str] = &[
    "class", "extends", "operator", "public", "private", "static", "virtual",
    "bool", "int", "float", "double", "string", "Vector2", "Vector3", "void",
    "import", "list", "map", "thread", "lambda", "struct", "enum",
    "return", "if", "else", "for", "while", "break", "continue",
    "new", "delete",
];

/// Keywords that open a type declaration.
const TYPE_DECLARATION_KEYWORDS: &[&str] = &["class", "struct", "enum"];

/// Keywords that open a visibility section inside a type.
const VISIBILITY_KEYWORDS: &[&str] = &["public", "private"];

/// Return types that start a member function declaration.
/// `vector` is not a keyword; it is matched by text.
const MEMBER_TYPES: &[&str] = &[
    "int", "float", "double", "string", "bool", "void", "vector", "map",
];

/// Single-character punctuation recognized by the lexer.
pub const PUNCTUATION: &[char] = &['{', '}', '(', ')', ',', ';', '=', '+', '-', '*', '/'];

/// Identifier that introduces a console output statement.
pub const OUTPUT_STATEMENT: &str = "cout";

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_type_declaration(word: &str) -> bool {
    TYPE_DECLARATION_KEYWORDS.contains(&word)
}

pub fn is_visibility(word: &str) -> bool {
    VISIBILITY_KEYWORDS.contains(&word)
}

pub fn is_member_type(word: &str) -> bool {
    MEMBER_TYPES.contains(&word)
}

pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

/// C++ spelling of a member type. Library types get their `std::` prefix
/// so signatures compile against the standard include block.
pub fn cpp_type(word: &str) -> String {
    match word {
        "string" | "vector" | "map" => format!("std::{}", word),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_types_are_subset_of_words() {
        for ty in MEMBER_TYPES {
            assert!(is_keyword(ty) || *ty == "vector", "{ty} should lex as a keyword");
        }
    }

    #[test]
    fn test_cpp_type() {
        assert_eq!(cpp_type("int"), "int");
        assert_eq!(cpp_type("string"), "std::string");
        assert_eq!(cpp_type("map"), "std::map");
    }

    #[test]
    fn test_classification() {
        assert!(is_type_declaration("struct"));
        assert!(!is_type_declaration("Class"));
        assert!(is_visibility("private"));
        assert!(!is_visibility("protected"));
        assert!(is_punctuation('/'));
        assert!(!is_punctuation('['));
    }
}
