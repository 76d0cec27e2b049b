//! The [`SymbolSource`] trait.
//!
//! A symbol source owns the declaration graph for the duration of a
//! compilation. Synthesizers only read from it; the driver advances it from
//! one resolution round to the next, feeding generated files back in.

use std::collections::{HashSet, VecDeque};

use declsynth_kotlin::{ClassName, FileSpec, TypeName};
use declsynth_types::{
    Declaration, FunctionDecl, MarkerKind, MarkerVocabulary, PropertyDecl, QualifiedName, TypeRef,
};

use crate::error::SourceResult;

/// A member together with the declaration that declares it.
#[derive(Debug)]
pub struct Member<'a, T> {
    pub owner: &'a Declaration,
    pub member: &'a T,
}

impl<T> Clone for Member<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Member<'_, T> {}

/// Read access to a compilation's declarations, plus round bookkeeping.
pub trait SymbolSource {
    /// Source name, for logging.
    fn name(&self) -> &str;

    /// Current resolution round, starting at 1.
    fn round(&self) -> usize;

    /// Look up any declaration, nested ones included.
    fn declaration(&self, name: &QualifiedName) -> Option<&Declaration>;

    /// Declarations that became visible in the current round, in graph order.
    fn new_declarations(&self) -> Vec<&Declaration>;

    /// Resolve a (possibly dotted) type name as used inside `context`.
    fn resolve_class(&self, context: &Declaration, name: &str) -> Option<ClassName>;

    /// Direct subclasses of a sealed declaration, in graph order.
    fn sealed_subclasses<'a>(&'a self, declaration: &'a Declaration) -> Vec<&'a Declaration>;

    /// Start the next round. Types declared in `generated` become the new
    /// declarations of that round. Returns how many were added.
    fn advance_round(&mut self, generated: &[FileSpec]) -> SourceResult<usize>;

    // ── Provided ─────────────────────────────────────────────────────

    /// New declarations carrying a marker of `kind`.
    fn annotated_with<'a>(
        &'a self,
        vocabulary: &MarkerVocabulary,
        kind: MarkerKind,
    ) -> Vec<&'a Declaration> {
        self.new_declarations()
            .into_iter()
            .filter(|decl| vocabulary.find(&decl.markers, kind).next().is_some())
            .collect()
    }

    /// Resolve every name in `ty`. `None` when any part does not resolve.
    fn resolve(&self, context: &Declaration, ty: &TypeRef) -> Option<TypeName> {
        match ty {
            TypeRef::Named {
                name,
                arguments,
                nullable,
            } => {
                let class = self.resolve_class(context, name)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.resolve(context, argument))
                    .collect::<Option<Vec<_>>>()?;
                Some(
                    TypeName::from(class)
                        .parameterized_by(arguments)
                        .with_nullable(*nullable),
                )
            }
            TypeRef::Function {
                receiver,
                parameters,
                returns,
                nullable,
                suspending,
            } => {
                let receiver = match receiver {
                    Some(receiver) => Some(Box::new(self.resolve(context, receiver)?)),
                    None => None,
                };
                let parameters = parameters
                    .iter()
                    .map(|parameter| self.resolve(context, parameter))
                    .collect::<Option<Vec<_>>>()?;
                Some(TypeName::Lambda {
                    receiver,
                    parameters,
                    returns: Box::new(self.resolve(context, returns)?),
                    nullable: *nullable,
                    suspending: *suspending,
                })
            }
            TypeRef::Star => Some(TypeName::Star),
        }
    }

    /// Like [`SymbolSource::resolve`], but never fails: names that do not
    /// resolve are assumed to live in the context's package (or, if dotted,
    /// to be fully qualified).
    fn type_name(&self, context: &Declaration, ty: &TypeRef) -> TypeName {
        if let Some(resolved) = self.resolve(context, ty) {
            return resolved;
        }
        match ty {
            TypeRef::Named {
                name,
                arguments,
                nullable,
            } => {
                let class = self.resolve_class(context, name).unwrap_or_else(|| {
                    if name.contains('.') {
                        ClassName::parse(name)
                            .unwrap_or_else(|_| ClassName::new(context.package.clone(), name.clone()))
                    } else {
                        ClassName::new(context.package.clone(), name.clone())
                    }
                });
                TypeName::from(class)
                    .parameterized_by(
                        arguments
                            .iter()
                            .map(|argument| self.type_name(context, argument))
                            .collect(),
                    )
                    .with_nullable(*nullable)
            }
            TypeRef::Function {
                receiver,
                parameters,
                returns,
                nullable,
                suspending,
            } => TypeName::Lambda {
                receiver: receiver
                    .as_ref()
                    .map(|receiver| Box::new(self.type_name(context, receiver))),
                parameters: parameters
                    .iter()
                    .map(|parameter| self.type_name(context, parameter))
                    .collect(),
                returns: Box::new(self.type_name(context, returns)),
                nullable: *nullable,
                suspending: *suspending,
            },
            TypeRef::Star => TypeName::Star,
        }
    }

    /// Type names referenced by `declaration` (and its nested declarations)
    /// that do not resolve.
    fn unresolved_references(&self, declaration: &Declaration) -> Vec<String> {
        let mut unresolved = Vec::new();
        let mut check = |ty: &TypeRef| {
            for name in ty.names() {
                if self.resolve_class(declaration, name).is_none() {
                    unresolved.push(name.to_string());
                }
            }
        };
        for supertype in &declaration.supertypes {
            check(supertype);
        }
        for property in &declaration.properties {
            check(&property.ty);
        }
        for function in &declaration.functions {
            for parameter in &function.parameters {
                check(&parameter.ty);
            }
            if let Some(returns) = &function.return_type {
                check(returns);
            }
        }
        for nested in &declaration.nested {
            unresolved.extend(self.unresolved_references(nested));
        }
        unresolved
    }

    /// Whether every type `declaration` references resolves this round.
    fn is_valid(&self, declaration: &Declaration) -> bool {
        self.unresolved_references(declaration).is_empty()
    }

    /// Supertypes of `declaration` that are present in the graph.
    fn supertypes<'a>(&'a self, declaration: &'a Declaration) -> Vec<&'a Declaration> {
        declaration
            .supertypes
            .iter()
            .filter_map(|supertype| match supertype {
                TypeRef::Named { name, .. } => self.resolve_class(declaration, name),
                _ => None,
            })
            .filter_map(|class| self.declaration(&QualifiedName::from(&class)))
            .collect()
    }

    /// Declared and inherited properties. A property declared closer to
    /// `declaration` hides an inherited one with the same name.
    fn all_properties<'a>(&'a self, declaration: &'a Declaration) -> Vec<Member<'a, PropertyDecl>> {
        let mut names = HashSet::new();
        let mut out = Vec::new();
        for owner in self.hierarchy(declaration) {
            for property in &owner.properties {
                if names.insert(property.name.clone()) {
                    out.push(Member {
                        owner,
                        member: property,
                    });
                }
            }
        }
        out
    }

    /// Declared and inherited functions. Overloads are told apart by their
    /// parameter types.
    fn all_functions<'a>(&'a self, declaration: &'a Declaration) -> Vec<Member<'a, FunctionDecl>> {
        let mut signatures = HashSet::new();
        let mut out = Vec::new();
        for owner in self.hierarchy(declaration) {
            for function in &owner.functions {
                let signature = (
                    function.name.clone(),
                    function
                        .parameters
                        .iter()
                        .map(|p| self.type_name(owner, &p.ty).to_string())
                        .collect::<Vec<_>>(),
                );
                if signatures.insert(signature) {
                    out.push(Member {
                        owner,
                        member: function,
                    });
                }
            }
        }
        out
    }

    /// `declaration` followed by its graph supertypes, breadth first, each
    /// visited once.
    fn hierarchy<'a>(&'a self, declaration: &'a Declaration) -> Vec<&'a Declaration> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([declaration]);
        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.qualified_name()) {
                continue;
            }
            out.push(current);
            queue.extend(self.supertypes(current));
        }
        out
    }
}
