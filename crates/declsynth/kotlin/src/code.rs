//! Code blocks: fragments of Kotlin source with typed references.
//!
//! A [`CodeBlock`] is a sequence of literal text, type references, member
//! references and indentation markers. Type and member references are kept
//! symbolic until rendering so the renderer can decide between an import
//! plus simple name and a fully-qualified reference.

use crate::names::{escape_identifier, ClassName, MemberName, TypeName};

/// One piece of a [`CodeBlock`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CodePart {
    /// Literal source text. May contain newlines.
    Text(String),
    /// A reference to a type.
    Type(TypeName),
    /// A reference to a top-level member.
    Member(MemberName),
    /// Increase indentation for following lines.
    Indent,
    /// Decrease indentation for following lines.
    Unindent,
}

/// A fragment of Kotlin source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CodeBlock {
    parts: Vec<CodePart>,
}

impl CodeBlock {
    pub fn builder() -> CodeBlockBuilder {
        CodeBlockBuilder::default()
    }

    /// A block made of a single piece of literal text.
    pub fn of(text: impl Into<String>) -> Self {
        Self::builder().add(text).build()
    }

    pub fn parts(&self) -> &[CodePart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The literal text when the block holds nothing but text.
    pub fn as_plain_text(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                CodePart::Text(text) => out.push_str(text),
                _ => return None,
            }
        }
        Some(out)
    }

    /// Every class name referenced by this block.
    pub fn referenced_classes(&self) -> Vec<&ClassName> {
        self.parts
            .iter()
            .flat_map(|part| match part {
                CodePart::Type(ty) => ty.referenced_classes(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Every member name referenced by this block.
    pub fn referenced_members(&self) -> Vec<&MemberName> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                CodePart::Member(member) => Some(member),
                _ => None,
            })
            .collect()
    }
}

/// Builder for [`CodeBlock`].
#[derive(Clone, Debug, Default)]
pub struct CodeBlockBuilder {
    parts: Vec<CodePart>,
}

impl CodeBlockBuilder {
    /// Append literal text.
    pub fn add(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(CodePart::Text(previous)) => previous.push_str(&text),
            _ => self.parts.push(CodePart::Text(text)),
        }
        self
    }

    /// Append literal text followed by a newline.
    pub fn add_line(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.add(text).add("\n")
    }

    /// Append a type reference.
    pub fn add_type(mut self, ty: impl Into<TypeName>) -> Self {
        self.parts.push(CodePart::Type(ty.into()));
        self
    }

    /// Append a top-level member reference.
    pub fn add_member(mut self, member: MemberName) -> Self {
        self.parts.push(CodePart::Member(member));
        self
    }

    /// Append an identifier, escaping it when it is a keyword.
    pub fn add_name(self, name: &str) -> Self {
        self.add(escape_identifier(name))
    }

    /// Append a quoted, escaped string literal.
    pub fn add_string(self, value: &str) -> Self {
        self.add(string_literal(value))
    }

    /// Append every part of another block.
    pub fn add_block(mut self, block: CodeBlock) -> Self {
        for part in block.parts {
            self = match part {
                CodePart::Text(text) => self.add(text),
                other => {
                    self.parts.push(other);
                    self
                }
            };
        }
        self
    }

    pub fn indent(mut self) -> Self {
        self.parts.push(CodePart::Indent);
        self
    }

    pub fn unindent(mut self) -> Self {
        self.parts.push(CodePart::Unindent);
        self
    }

    pub fn build(self) -> CodeBlock {
        CodeBlock { parts: self.parts }
    }
}

/// Quote and escape `value` as a Kotlin string literal.
///
/// `$` is escaped so the literal is never read as a string template.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_text_is_merged() {
        let block = CodeBlock::builder().add("return ").add("this").build();
        assert_eq!(block.parts(), [CodePart::Text("return this".into())]);
        assert_eq!(block.as_plain_text().as_deref(), Some("return this"));
    }

    #[test]
    fn typed_parts_are_kept_symbolic() {
        let direction = ClassName::new("demo", "Direction");
        let block = CodeBlock::builder()
            .add("this == ")
            .add_type(direction.nested("Up"))
            .build();
        assert_eq!(block.parts().len(), 2);
        assert!(block.as_plain_text().is_none());
        assert_eq!(block.referenced_classes()[0].canonical(), "demo.Direction.Up");
    }

    #[test]
    fn string_literal_escapes_templates_and_quotes() {
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(string_literal("$AUTHORITY"), "\"\\$AUTHORITY\"");
        assert_eq!(string_literal(""), "\"\"");
        assert_eq!(string_literal("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn add_name_escapes_keywords() {
        let block = CodeBlock::builder().add_name("in").build();
        assert_eq!(block.as_plain_text().as_deref(), Some("`in`"));
    }

    #[test]
    fn add_block_merges_leading_text() {
        let inner = CodeBlock::builder().add("b").indent().add("c").build();
        let block = CodeBlock::builder().add("a").add_block(inner).build();
        assert_eq!(
            block.parts(),
            [
                CodePart::Text("ab".into()),
                CodePart::Indent,
                CodePart::Text("c".into())
            ]
        );
    }

    #[test]
    fn members_are_collected() {
        let get = MemberName::new("lib.ktx", "get");
        let block = CodeBlock::builder().add_member(get.clone()).add("(NAME)").build();
        assert_eq!(block.referenced_members(), [&get]);
    }
}
