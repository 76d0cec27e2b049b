//! Deterministic Kotlin rendering.
//!
//! Rendering is a pure function of the [`FileSpec`]: two-space indentation,
//! no trailing whitespace, explicit `public` on declarations without a
//! visibility modifier (override members inherit theirs), sorted imports and
//! backtick escaping of identifiers that collide with hard keywords.
//!
//! Import policy: every referenced class claims its top-level simple name,
//! classes declared in or belonging to the file's package first, then the
//! rest in canonical order. A class whose simple name is already claimed is
//! written fully qualified. Members follow the same policy in their own
//! namespace.

use std::collections::{BTreeSet, HashMap};

use crate::code::{CodeBlock, CodePart};
use crate::modifier::KModifier;
use crate::names::{escape_identifier, ClassName, MemberName, TypeName};
use crate::spec::{FileMember, FileSpec, FunSpec, ParameterSpec, PropertySpec, TypeKind, TypeSpec};

const INDENT: &str = "  ";

/// Render a file to source text.
pub fn render_file(file: &FileSpec) -> String {
    let names = NameTable::build(file);
    let mut writer = CodeWriter::new(&names);

    for line in &file.comment {
        writer.emit(&format!("// {}\n", line));
    }
    if !file.package.is_empty() {
        writer.emit(&format!("package {}\n", file.package));
    }
    if !names.imports.is_empty() {
        writer.emit("\n");
        for import in &names.imports {
            writer.emit(&format!("import {}\n", import));
        }
    }
    for member in &file.members {
        writer.emit("\n");
        match member {
            FileMember::Type(ty) => writer.emit_type(ty),
            FileMember::Property(property) => writer.emit_property(property, false),
            FileMember::Function(function) => writer.emit_function(function, false),
        }
    }
    writer.finish()
}

// ── Name Table ───────────────────────────────────────────────────────

/// Decides how each referenced name is spelled and which imports exist.
#[derive(Debug, Default)]
struct NameTable {
    package: String,
    classes: HashMap<String, ClassName>,
    members: HashMap<String, MemberName>,
    imports: BTreeSet<String>,
}

impl NameTable {
    fn build(file: &FileSpec) -> Self {
        let mut table = Self {
            package: file.package.clone(),
            ..Self::default()
        };

        let mut referenced = ReferenceCollector::default();
        referenced.file(file);

        // Declared types own their names.
        for ty in file.types() {
            let declared = ClassName::new(file.package.clone(), ty.name.clone());
            table.classes.insert(ty.name.clone(), declared);
        }

        let mut classes: Vec<ClassName> = referenced
            .classes
            .into_iter()
            .map(|c| c.top_level())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        classes.sort_by_key(|c| (c.package() != file.package, c.canonical()));
        for class in classes {
            let simple = class.simple_name().to_string();
            if table.classes.contains_key(&simple) {
                continue;
            }
            if !class.package().is_empty() && class.package() != file.package {
                table.imports.insert(class.canonical());
            }
            table.classes.insert(simple, class);
        }

        let mut members: Vec<MemberName> = referenced
            .members
            .into_iter()
            .chain(file.imports.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        members.sort_by_key(|m| (m.package() != file.package, m.canonical()));
        for member in members {
            if table.members.contains_key(member.name()) {
                continue;
            }
            if !member.package().is_empty() && member.package() != file.package {
                table.imports.insert(member.canonical());
            }
            table.members.insert(member.name().to_string(), member);
        }

        table
    }

    fn class(&self, class: &ClassName) -> String {
        let top = class.top_level();
        match self.classes.get(top.simple_name()) {
            Some(owner) if *owner == top => class.relative_name(),
            _ if class.package().is_empty() => class.relative_name(),
            _ => class.canonical(),
        }
    }

    fn member(&self, member: &MemberName) -> String {
        if member.package().is_empty() || member.package() == self.package {
            return escape_identifier(member.name());
        }
        match self.members.get(member.name()) {
            Some(owner) if owner == member => escape_identifier(member.name()),
            _ => member.canonical(),
        }
    }

    fn type_name(&self, ty: &TypeName) -> String {
        ty.format_with(&|class: &ClassName| self.class(class))
    }
}

/// Walks a file and records every class and member it mentions, mirroring
/// exactly what the writer prints.
#[derive(Default)]
struct ReferenceCollector {
    classes: Vec<ClassName>,
    members: Vec<MemberName>,
}

impl ReferenceCollector {
    fn file(&mut self, file: &FileSpec) {
        for member in &file.members {
            match member {
                FileMember::Type(ty) => self.type_spec(ty),
                FileMember::Property(property) => self.property(property),
                FileMember::Function(function) => self.function(function),
            }
        }
    }

    fn type_name(&mut self, ty: &TypeName) {
        self.classes.extend(ty.referenced_classes().into_iter().cloned());
    }

    fn block(&mut self, block: &CodeBlock) {
        self.classes
            .extend(block.referenced_classes().into_iter().cloned());
        self.members
            .extend(block.referenced_members().into_iter().cloned());
    }

    fn type_spec(&mut self, ty: &TypeSpec) {
        if let Some(kdoc) = &ty.kdoc {
            self.block(kdoc);
        }
        for superinterface in &ty.superinterfaces {
            self.type_name(superinterface);
        }
        for parameter in &ty.primary_constructor {
            self.parameter(parameter);
        }
        for property in &ty.properties {
            self.property(property);
        }
        for function in &ty.functions {
            self.function(function);
        }
    }

    fn parameter(&mut self, parameter: &ParameterSpec) {
        self.type_name(&parameter.ty);
        if let Some(default) = &parameter.default {
            self.block(default);
        }
    }

    fn property(&mut self, property: &PropertySpec) {
        self.type_name(&property.ty);
        if let Some(receiver) = &property.receiver {
            self.type_name(receiver);
        }
        for block in [&property.kdoc, &property.initializer, &property.getter]
            .into_iter()
            .flatten()
        {
            self.block(block);
        }
    }

    fn function(&mut self, function: &FunSpec) {
        self.classes.extend(function.annotations.iter().cloned());
        if let Some(receiver) = &function.receiver {
            self.type_name(receiver);
        }
        for parameter in &function.parameters {
            self.parameter(parameter);
        }
        if !function.returns.is_unit() {
            self.type_name(&function.returns);
        }
        for block in [&function.kdoc, &function.body].into_iter().flatten() {
            self.block(block);
        }
    }
}

// ── Code Writer ──────────────────────────────────────────────────────

struct CodeWriter<'a> {
    names: &'a NameTable,
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl<'a> CodeWriter<'a> {
    fn new(names: &'a NameTable) -> Self {
        Self {
            names,
            out: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    fn finish(mut self) -> String {
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out
    }

    /// Write text, indenting each non-empty line lazily.
    fn emit(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.out.push('\n');
                self.at_line_start = true;
                continue;
            }
            if self.at_line_start {
                for _ in 0..self.indent {
                    self.out.push_str(INDENT);
                }
                self.at_line_start = false;
            }
            self.out.push(c);
        }
    }

    fn newline_if_needed(&mut self) {
        if !self.at_line_start {
            self.emit("\n");
        }
    }

    fn emit_block(&mut self, block: &CodeBlock) {
        for part in block.parts() {
            match part {
                CodePart::Text(text) => self.emit(text),
                CodePart::Type(ty) => {
                    let text = self.names.type_name(ty);
                    self.emit(&text);
                }
                CodePart::Member(member) => {
                    let text = self.names.member(member);
                    self.emit(&text);
                }
                CodePart::Indent => self.indent += 1,
                CodePart::Unindent => self.indent = self.indent.saturating_sub(1),
            }
        }
    }

    fn emit_kdoc(&mut self, kdoc: &CodeBlock) {
        let mut inner = CodeWriter::new(self.names);
        inner.emit_block(kdoc);
        let text = inner.out;
        self.emit("/**\n");
        for line in text.trim_end_matches('\n').lines() {
            if line.is_empty() {
                self.emit(" *\n");
            } else {
                self.emit(&format!(" * {}\n", line));
            }
        }
        self.emit(" */\n");
    }

    fn emit_modifiers(&mut self, modifiers: &BTreeSet<KModifier>, in_interface: bool) {
        let mut modifiers = modifiers.clone();
        if in_interface {
            modifiers.remove(&KModifier::Abstract);
        }
        let has_visibility = modifiers.iter().any(KModifier::is_visibility);
        if !has_visibility && !modifiers.contains(&KModifier::Override) {
            modifiers.insert(KModifier::Public);
        }
        for modifier in modifiers {
            self.emit(modifier.keyword());
            self.emit(" ");
        }
    }

    fn emit_type_name(&mut self, ty: &TypeName) {
        let text = self.names.type_name(ty);
        self.emit(&text);
    }

    fn emit_parameter(&mut self, parameter: &ParameterSpec) {
        for modifier in &parameter.modifiers {
            self.emit(modifier.keyword());
            self.emit(" ");
        }
        self.emit(&escape_identifier(&parameter.name));
        self.emit(": ");
        self.emit_type_name(&parameter.ty);
        if let Some(default) = &parameter.default {
            self.emit(" = ");
            self.emit_block(default);
        }
    }

    fn emit_parameters(&mut self, parameters: &[ParameterSpec]) {
        let wrap = parameters.len() > 2 || parameters.iter().any(|p| p.default.is_some());
        self.emit("(");
        if wrap {
            self.emit("\n");
            self.indent += 1;
            for parameter in parameters {
                self.emit_parameter(parameter);
                self.emit(",\n");
            }
            self.indent -= 1;
        } else {
            for (i, parameter) in parameters.iter().enumerate() {
                if i > 0 {
                    self.emit(", ");
                }
                self.emit_parameter(parameter);
            }
        }
        self.emit(")");
    }

    fn emit_property(&mut self, property: &PropertySpec, in_interface: bool) {
        if let Some(kdoc) = &property.kdoc {
            self.emit_kdoc(kdoc);
        }
        self.emit_property_head(property, in_interface);
        if let Some(initializer) = &property.initializer {
            self.emit(" = ");
            self.emit_block(initializer);
        }
        self.emit("\n");
        if let Some(getter) = &property.getter {
            self.indent += 1;
            self.emit("get() = ");
            self.emit_block(getter);
            self.newline_if_needed();
            self.indent -= 1;
        }
    }

    fn emit_property_head(&mut self, property: &PropertySpec, in_interface: bool) {
        self.emit_modifiers(&property.modifiers, in_interface);
        self.emit(if property.mutable { "var " } else { "val " });
        if let Some(receiver) = &property.receiver {
            self.emit_type_name(receiver);
            self.emit(".");
        }
        self.emit(&escape_identifier(&property.name));
        self.emit(": ");
        self.emit_type_name(&property.ty);
    }

    fn emit_function(&mut self, function: &FunSpec, in_interface: bool) {
        if let Some(kdoc) = &function.kdoc {
            self.emit_kdoc(kdoc);
        }
        for annotation in &function.annotations {
            let text = self.names.class(annotation);
            self.emit(&format!("@{}\n", text));
        }
        self.emit_modifiers(&function.modifiers, in_interface);
        self.emit("fun ");
        if let Some(receiver) = &function.receiver {
            self.emit_type_name(receiver);
            self.emit(".");
        }
        self.emit(&escape_identifier(&function.name));
        self.emit_parameters(&function.parameters);
        if !function.returns.is_unit() {
            self.emit(": ");
            self.emit_type_name(&function.returns);
        }
        match &function.body {
            Some(body) => {
                self.emit(" {\n");
                self.indent += 1;
                self.emit_block(body);
                self.newline_if_needed();
                self.indent -= 1;
                self.emit("}\n");
            }
            None => self.emit("\n"),
        }
    }

    fn emit_type(&mut self, ty: &TypeSpec) {
        if let Some(kdoc) = &ty.kdoc {
            self.emit_kdoc(kdoc);
        }
        self.emit_modifiers(&ty.modifiers, false);
        self.emit(ty.kind.keyword());
        self.emit(" ");
        self.emit(&escape_identifier(&ty.name));

        // Properties initialised straight from a constructor parameter of the
        // same name and type are declared in the constructor itself.
        let mut inlined: BTreeSet<usize> = BTreeSet::new();
        if !ty.primary_constructor.is_empty() {
            self.emit("(\n");
            self.indent += 1;
            for parameter in &ty.primary_constructor {
                let property = ty.properties.iter().enumerate().find(|(_, p)| {
                    p.ty == parameter.ty
                        && p.initializer.as_ref().and_then(CodeBlock::as_plain_text).as_deref()
                            == Some(parameter.name.as_str())
                });
                match property {
                    Some((index, property)) => {
                        inlined.insert(index);
                        self.emit_property_head(property, false);
                    }
                    None => self.emit_parameter(parameter),
                }
                self.emit(",\n");
            }
            self.indent -= 1;
            self.emit(")");
        }

        if !ty.superinterfaces.is_empty() {
            self.emit(" : ");
            for (i, superinterface) in ty.superinterfaces.iter().enumerate() {
                if i > 0 {
                    self.emit(", ");
                }
                self.emit_type_name(superinterface);
            }
        }

        let in_interface = ty.kind == TypeKind::Interface;
        let properties: Vec<&PropertySpec> = ty
            .properties
            .iter()
            .enumerate()
            .filter(|(i, _)| !inlined.contains(i))
            .map(|(_, p)| p)
            .collect();
        if properties.is_empty() && ty.functions.is_empty() {
            self.emit("\n");
            return;
        }

        self.emit(" {\n");
        self.indent += 1;
        let mut first = true;
        for property in properties {
            if !first {
                self.emit("\n");
            }
            first = false;
            self.emit_property(property, in_interface);
        }
        for function in &ty.functions {
            if !first {
                self.emit("\n");
            }
            first = false;
            self.emit_function(function, in_interface);
        }
        self.indent -= 1;
        self.emit("}\n");
    }
}
