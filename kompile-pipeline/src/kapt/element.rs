//! Declarations found in processing inputs.
//!
//! Elements are recognized textually: a declaration keyword and name,
//! optionally preceded by annotations and modifiers, plus the file's
//! `package` clause. Comments and string or character literals are blanked
//! out first. Annotations with nested parentheses in their arguments are not
//! recognized.

use std::{
    borrow::Cow,
    fmt,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};

static NON_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)//[^\n]*|/\*.*?\*/|""".*?"""|"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#)
        .expect("valid regex")
});

static PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+([\w.]+)").expect("valid regex"));

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<annotations>(?:@[\w.]+(?:\([^)]*\))?\s+)*)
        (?P<modifiers>(?:\b(?:public|private|protected|internal|abstract|final|open|data|sealed|static|inner|value|enum|annotation)\s+)*)
        (?:\b(?P<keyword>class|interface|enum|object|fun|record)|(?P<annotation_type>@interface))
        \s+(?P<name>\w+)",
    )
    .expect("valid regex")
});

static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\w.]+)").expect("valid regex"));

/// What kind of declaration an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Class,
    Interface,
    Enum,
    Object,
    Record,
    Annotation,
    Function,
}

impl ElementKind {
    /// Whether the declaration compiles to a class file of its own.
    pub fn is_type(&self) -> bool {
        !matches!(self, ElementKind::Function)
    }
}

/// A declaration in a processing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub package: Option<String>,
    pub name: String,
    /// Annotation names as written, without `@` and arguments.
    pub annotations: Vec<String>,
    pub source: PathBuf,
}

impl Element {
    /// `package.Name`, or `Name` in the default package.
    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, self.name),
            None => self.name.clone(),
        }
    }

    /// Whether the element carries `annotation`, given as a simple or a
    /// qualified name.
    pub fn is_annotated_with(&self, annotation: &str) -> bool {
        let simple = simple_name(annotation);
        self.annotations
            .iter()
            .any(|written| written == annotation || simple_name(written) == simple)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `content` with comments and literals replaced by spaces. Line breaks are
/// kept so `package` still anchors at a line start.
fn code_only(content: &str) -> Cow<'_, str> {
    NON_CODE.replace_all(content, |caps: &Captures<'_>| {
        caps[0]
            .chars()
            .map(|c| if c == '\n' { '\n' } else { ' ' })
            .collect::<String>()
    })
}

/// Declarations of `content`, in source order.
pub fn parse_elements(source: &Path, content: &str) -> Vec<Element> {
    let code = code_only(content);
    let package = PACKAGE.captures(&code).map(|caps| caps[1].to_string());

    DECLARATION
        .captures_iter(&code)
        .map(|caps| {
            let modifiers = caps.name("modifiers").map_or("", |m| m.as_str());
            let has_modifier = |word: &str| modifiers.split_whitespace().any(|m| m == word);
            let kind = match caps.name("keyword").map(|m| m.as_str()) {
                None => ElementKind::Annotation,
                Some("interface") => ElementKind::Interface,
                Some("enum") => ElementKind::Enum,
                Some("object") => ElementKind::Object,
                Some("record") => ElementKind::Record,
                Some("fun") => ElementKind::Function,
                Some(_) if has_modifier("enum") => ElementKind::Enum,
                Some(_) if has_modifier("annotation") => ElementKind::Annotation,
                Some(_) => ElementKind::Class,
            };
            let annotations = caps
                .name("annotations")
                .map(|m| {
                    ANNOTATION
                        .captures_iter(m.as_str())
                        .map(|a| a[1].to_string())
                        .collect()
                })
                .unwrap_or_default();

            Element {
                kind,
                package: package.clone(),
                name: caps["name"].to_string(),
                annotations,
                source: source.to_path_buf(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_java_declarations() {
        let content = r#"
package com.example;

import com.example.annotations.Builder;

@Builder
@Deprecated(since = "1.2")
public final class Person {
    private String name;
}

interface Named {}

enum Color { RED }

public @interface Marker {}
"#;
        let elements = parse_elements(Path::new("Person.java"), content);

        let summary: Vec<_> = elements
            .iter()
            .map(|e| (e.kind, e.qualified_name()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ElementKind::Class, "com.example.Person".to_string()),
                (ElementKind::Interface, "com.example.Named".to_string()),
                (ElementKind::Enum, "com.example.Color".to_string()),
                (ElementKind::Annotation, "com.example.Marker".to_string()),
            ]
        );
        assert_eq!(elements[0].annotations, vec!["Builder", "Deprecated"]);
    }

    #[test]
    fn test_parse_kotlin_declarations() {
        let content = "@file:JvmName(\"Utils\")\n\n\
            @Serializable data class Point(val x: Int)\n\
            enum class Axis { X, Y }\n\
            object Registry {\n    fun lookup() = Unit\n}\n\
            annotation class Marker\n";
        let elements = parse_elements(Path::new("Point.kt"), content);

        let kinds: Vec<_> = elements.iter().map(|e| (e.kind, e.name.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (ElementKind::Class, "Point"),
                (ElementKind::Enum, "Axis"),
                (ElementKind::Object, "Registry"),
                (ElementKind::Function, "lookup"),
                (ElementKind::Annotation, "Marker"),
            ]
        );
        assert!(elements[0].package.is_none());
        assert!(elements[0].is_annotated_with("kotlinx.serialization.Serializable"));
        assert!(!elements[1].is_annotated_with("Serializable"));
        assert!(!elements[3].kind.is_type());
    }

    #[test]
    fn test_comments_and_literals_are_ignored() {
        let content = r##"
// package com.wrong
package com.example;

/* class Commented {}
   @Builder class AlsoCommented */
/** Javadoc mentioning interface Documented. */
@Builder
public class Real {
    String text = "class InString {}";
    String quote = "a \" class Escaped";
    char c = '"';
    String block = """
        enum InBlock { A }
        """;
}
"##;
        let elements = parse_elements(Path::new("Real.java"), content);

        let names: Vec<_> = elements.iter().map(|e| e.qualified_name()).collect();
        assert_eq!(names, vec!["com.example.Real"]);
        assert_eq!(elements[0].annotations, vec!["Builder"]);
    }

    #[test]
    fn test_code_only_keeps_line_breaks() {
        let code = code_only("a /* x\ny */ b // c\n\"d\" e");
        assert_eq!(code, "a     \n     b     \n    e");
    }

    #[test]
    fn test_subclass_is_not_a_declaration() {
        let elements = parse_elements(Path::new("A.java"), "// a subclass Foo of Bar\n");
        assert!(elements.is_empty());
    }
}
