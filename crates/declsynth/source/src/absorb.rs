//! Reading generated files back as declarations for the next round.

use std::collections::BTreeSet;

use declsynth_kotlin::{FileSpec, FunSpec, KModifier, PropertySpec, TypeKind, TypeName, TypeSpec};
use declsynth_types::{
    DeclKind, Declaration, FunctionDecl, Modifier, ParameterDecl, PropertyDecl, TypeRef, Visibility,
};

use crate::error::{SourceError, SourceResult};

/// Declarations for every type declared at the top level of `file`.
///
/// Generated code refers to every type by its canonical name, so the
/// resulting declarations need no imports to resolve.
pub fn declarations_from_file(file: &FileSpec) -> SourceResult<Vec<Declaration>> {
    let context = file.relative_path().display().to_string();
    file.types()
        .map(|ty| declaration_from_type(&file.package, ty, &context))
        .collect()
}

fn declaration_from_type(package: &str, ty: &TypeSpec, file: &str) -> SourceResult<Declaration> {
    let kind = match ty.kind {
        TypeKind::Class => DeclKind::Class,
        TypeKind::Interface => DeclKind::Interface,
        TypeKind::Object => DeclKind::Object,
    };
    let mut declaration = Declaration::new(kind, package, ty.name.clone());
    declaration.visibility = visibility(&ty.modifiers);
    declaration.modifiers = modifiers(&ty.modifiers);
    declaration.supertypes = ty
        .superinterfaces
        .iter()
        .map(|supertype| type_ref(supertype, file))
        .collect::<SourceResult<_>>()?;
    declaration.properties = ty
        .properties
        .iter()
        .map(|property| property_decl(property, file))
        .collect::<SourceResult<_>>()?;
    declaration.functions = ty
        .functions
        .iter()
        .map(|function| function_decl(function, file))
        .collect::<SourceResult<_>>()?;
    Ok(declaration)
}

fn property_decl(property: &PropertySpec, file: &str) -> SourceResult<PropertyDecl> {
    let mut decl = PropertyDecl::new(property.name.clone(), type_ref(&property.ty, file)?);
    decl.mutable = property.mutable;
    decl.visibility = visibility(&property.modifiers);
    decl.modifiers = modifiers(&property.modifiers);
    // Extension properties and getter-only properties have no storage.
    decl.has_backing_field = property.receiver.is_none() && property.getter.is_none();
    Ok(decl)
}

fn function_decl(function: &FunSpec, file: &str) -> SourceResult<FunctionDecl> {
    let mut decl = FunctionDecl::new(function.name.clone());
    decl.visibility = visibility(&function.modifiers);
    decl.modifiers = modifiers(&function.modifiers);
    for parameter in &function.parameters {
        let mut param = ParameterDecl::new(parameter.name.clone(), type_ref(&parameter.ty, file)?);
        param.modifiers = modifiers(&parameter.modifiers);
        decl.parameters.push(param);
    }
    if !function.returns.is_unit() {
        decl.return_type = Some(type_ref(&function.returns, file)?);
    }
    Ok(decl)
}

fn type_ref(ty: &TypeName, file: &str) -> SourceResult<TypeRef> {
    ty.to_string()
        .parse::<TypeRef>()
        .map_err(|e| SourceError::GeneratedUnit {
            file: file.to_string(),
            reason: e.to_string(),
        })
}

fn visibility(modifiers: &BTreeSet<KModifier>) -> Visibility {
    if modifiers.contains(&KModifier::Private) {
        Visibility::Private
    } else if modifiers.contains(&KModifier::Protected) {
        Visibility::Protected
    } else if modifiers.contains(&KModifier::Internal) {
        Visibility::Internal
    } else {
        Visibility::Public
    }
}

fn modifiers(modifiers: &BTreeSet<KModifier>) -> BTreeSet<Modifier> {
    modifiers
        .iter()
        .filter_map(|modifier| match modifier {
            KModifier::Sealed => Some(Modifier::Sealed),
            KModifier::Data => Some(Modifier::Data),
            KModifier::Abstract => Some(Modifier::Abstract),
            KModifier::Open => Some(Modifier::Open),
            KModifier::Final => Some(Modifier::Final),
            KModifier::Override => Some(Modifier::Override),
            KModifier::Suspend => Some(Modifier::Suspend),
            KModifier::Inline => Some(Modifier::Inline),
            KModifier::Operator => Some(Modifier::Operator),
            KModifier::Infix => Some(Modifier::Infix),
            KModifier::Vararg => Some(Modifier::Vararg),
            KModifier::Crossinline => Some(Modifier::Crossinline),
            KModifier::Noinline => Some(Modifier::Noinline),
            KModifier::Const => Some(Modifier::Const),
            KModifier::Lateinit => Some(Modifier::Lateinit),
            KModifier::Value => Some(Modifier::Value),
            KModifier::Inner => Some(Modifier::Inner),
            KModifier::Tailrec => Some(Modifier::Tailrec),
            KModifier::External => Some(Modifier::External),
            KModifier::Fun => Some(Modifier::Fun),
            _ => None,
        })
        .collect()
}
