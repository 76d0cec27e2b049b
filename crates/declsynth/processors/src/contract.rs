//! Persistence contract synthesis.
//!
//! A data class carrying a persistence marker gets an object
//! `<Name>Contract` implementing the runtime contract interface: column
//! name constants, the content URI, the projection, mapping and cursor
//! codecs, a URI matcher and a matrix cursor factory.
//!
//! ```text
//! Declaration ──► ContractContext ──(with_field per stored property)──► ContractPlan ──► FileSpec
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use declsynth_emit::{CodeEmitter, EmitResult, GeneratedUnit};
use declsynth_kotlin::{
    ClassName, CodeBlock, FileSpec, FunSpec, KModifier, ParameterSpec, PropertySpec, TypeName,
    TypeSpec,
};
use declsynth_source::SymbolSource;
use declsynth_types::{
    ColumnOverride, Declaration, MarkerKind, MarkerVocabulary, PersistenceConfig, PropertyDecl,
    SynthError, SynthResult, Visibility,
};

use crate::codec::ColumnKind;
use crate::config::SynthesisConfig;
use crate::discovery::{discover, Candidate, Discovered, MarkerArguments, ValidityFilter};
use crate::driver::{ProcessOutcome, Round, SymbolProcessor};
use crate::naming;

/// Constants every contract declares before the column constants.
pub const RESERVED_CONSTANTS: [&str; 3] = ["AUTHORITY", "PATH", "CODE"];

// ── Context ──────────────────────────────────────────────────────────

/// Persistence marker arguments together with the column overrides of the
/// stored properties, keyed by property name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractMarkers {
    pub config: PersistenceConfig,
    pub columns: BTreeMap<String, String>,
}

impl MarkerArguments for ContractMarkers {
    const KIND: MarkerKind = MarkerKind::Persistence;

    fn parse(declaration: &Declaration, vocabulary: &MarkerVocabulary) -> SynthResult<Self> {
        let name = declaration.qualified_name().canonical();
        let markers: Vec<_> = vocabulary.find(&declaration.markers, Self::KIND).collect();
        let config = match markers.as_slice() {
            [instance] => PersistenceConfig::from_marker(&name, instance)?,
            [] => {
                return Err(SynthError::InvalidMarker {
                    declaration: name,
                    marker: Self::KIND.to_string(),
                    reason: "not applied".to_string(),
                })
            }
            [instance, ..] => {
                return Err(SynthError::InvalidMarker {
                    declaration: name,
                    marker: instance.simple_name().to_string(),
                    reason: "applied more than once".to_string(),
                })
            }
        };

        let mut columns = BTreeMap::new();
        for property in declaration.stored_properties() {
            let overrides: Vec<_> = vocabulary
                .find(&property.markers, MarkerKind::ColumnName)
                .collect();
            match overrides.as_slice() {
                [] => {}
                [instance] => {
                    let column = ColumnOverride::from_marker(&name, instance)?;
                    columns.insert(property.name.clone(), column.name);
                }
                [instance, ..] => {
                    return Err(SynthError::InvalidMarker {
                        declaration: name,
                        marker: instance.simple_name().to_string(),
                        reason: format!("applied more than once to property '{}'", property.name),
                    })
                }
            }
        }
        Ok(Self { config, columns })
    }
}

/// One stored property as seen by the contract synthesizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeName,
    pub column_override: Option<String>,
}

impl FieldDescriptor {
    pub fn from_property(
        declaration: &Declaration,
        property: &PropertyDecl,
        source: &dyn SymbolSource,
        markers: &ContractMarkers,
    ) -> Self {
        Self {
            name: property.name.clone(),
            ty: source.type_name(declaration, &property.ty),
            column_override: markers.columns.get(&property.name).cloned(),
        }
    }

    /// Name of the constant holding the column name.
    pub fn constant(&self) -> String {
        naming::column_constant(&self.name)
    }

    /// The column name: the override if present, the constant name otherwise.
    pub fn column(&self) -> String {
        self.column_override.clone().unwrap_or_else(|| self.constant())
    }
}

/// State accumulated while walking one aggregate. Each field extends a copy.
#[derive(Clone, Debug)]
pub struct ContractContext<'a> {
    pub declaration: &'a Declaration,
    pub config: PersistenceConfig,
    pub fields: Vec<FieldDescriptor>,
}

impl<'a> ContractContext<'a> {
    pub fn new(declaration: &'a Declaration, config: PersistenceConfig) -> Self {
        Self {
            declaration,
            config,
            fields: Vec::new(),
        }
    }

    pub fn with_field(&self, field: FieldDescriptor) -> Self {
        let mut next = self.clone();
        next.fields.push(field);
        next
    }
}

// ── Plan ─────────────────────────────────────────────────────────────

/// One column of the contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPlan {
    pub property: String,
    pub constant: String,
    pub column: String,
    pub ty: TypeName,
    pub kind: ColumnKind,
    pub nullable: bool,
}

/// Everything a persistence contract is generated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractPlan {
    pub target: ClassName,
    pub visibility: Visibility,
    pub authority: String,
    pub path: String,
    pub code: i32,
    pub writable: bool,
    pub columns: Vec<ColumnPlan>,
}

impl ContractPlan {
    pub fn derive(
        declaration: &Declaration,
        source: &dyn SymbolSource,
        vocabulary: &MarkerVocabulary,
    ) -> SynthResult<Self> {
        let markers = ContractMarkers::parse(declaration, vocabulary)?;
        Self::derive_with(declaration, &markers, source)
    }

    /// Derive from marker arguments parsed at discovery.
    pub fn derive_with(
        declaration: &Declaration,
        markers: &ContractMarkers,
        source: &dyn SymbolSource,
    ) -> SynthResult<Self> {
        if !declaration.is_aggregate() {
            return Err(SynthError::NotAggregate {
                declaration: declaration.qualified_name().canonical(),
                marker: markers.config.marker.clone(),
            });
        }
        let context = declaration.stored_properties().fold(
            ContractContext::new(declaration, markers.config.clone()),
            |context, property| {
                context.with_field(FieldDescriptor::from_property(
                    declaration,
                    property,
                    source,
                    markers,
                ))
            },
        );
        Self::from_context(context)
    }

    pub fn from_context(context: ContractContext<'_>) -> SynthResult<Self> {
        let declaration = context.declaration.qualified_name().canonical();
        if context.fields.is_empty() {
            return Err(SynthError::NoStoredProperties { declaration });
        }

        let mut constants: HashMap<String, &str> = HashMap::new();
        let mut columns: HashMap<String, &str> = HashMap::new();
        for field in &context.fields {
            let constant = field.constant();
            if RESERVED_CONSTANTS.contains(&constant.as_str()) {
                return Err(SynthError::ReservedConstant {
                    declaration,
                    property: field.name.clone(),
                    constant,
                });
            }
            if let Some(first) = constants.insert(constant.clone(), &field.name) {
                return Err(SynthError::DuplicateColumn {
                    declaration,
                    column: constant,
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
            if let Some(first) = columns.insert(field.column(), &field.name) {
                return Err(SynthError::DuplicateColumn {
                    declaration,
                    column: field.column(),
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
        }

        let columns = context
            .fields
            .iter()
            .map(|field| ColumnPlan {
                property: field.name.clone(),
                constant: field.constant(),
                column: field.column(),
                kind: ColumnKind::of(&field.ty),
                nullable: field.ty.is_nullable(),
                ty: field.ty.clone(),
            })
            .collect();

        Ok(Self {
            target: naming::class_name(context.declaration)?,
            visibility: context.declaration.visibility,
            authority: context.config.authority,
            path: context.config.path,
            code: context.config.code,
            writable: context.config.writable,
            columns,
        })
    }

    pub fn to_file(&self, config: &SynthesisConfig) -> FileSpec {
        let runtime = &config.runtime;
        let target: TypeName = self.target.clone().into();
        let name = naming::contract_file(self.target.simple_name());

        let mut object = TypeSpec::object(name.clone())
            .with_modifier(self.visibility.to_kmodifier())
            .with_superinterface(
                runtime
                    .content_type_contract
                    .as_type()
                    .parameterized_by(vec![target.clone()]),
            )
            .with_property(
                const_property("AUTHORITY", TypeName::string(), string_block(&self.authority))
                    .with_kdoc(
                        CodeBlock::builder()
                            .add("The authority for the [")
                            .add_type(runtime.content_provider.clone())
                            .add("] publishing [")
                            .add_type(self.target.clone())
                            .add("].")
                            .build(),
                    ),
            )
            .with_property(
                const_property("PATH", TypeName::string(), string_block(&self.path)).with_kdoc(
                    CodeBlock::builder()
                        .add("The path to the table of the [")
                        .add_type(runtime.content_provider.clone())
                        .add("] publishing [")
                        .add_type(self.target.clone())
                        .add("].")
                        .build(),
                ),
            )
            .with_property(const_property(
                "CODE",
                TypeName::int(),
                CodeBlock::of(self.code.to_string()),
            ));

        for column in &self.columns {
            object = object.with_property(
                const_property(&column.constant, TypeName::string(), string_block(&column.column))
                    .with_kdoc(
                        CodeBlock::builder()
                            .add("The name of the column holding the [")
                            .add_type(self.target.clone())
                            .add(format!(".{}].", column.property))
                            .build(),
                    ),
            );
        }

        let object = object
            .with_property(
                PropertySpec::new("uri", runtime.uri.clone())
                    .with_modifier(KModifier::Override)
                    .with_initializer(
                        CodeBlock::builder()
                            .add_type(runtime.uri.clone())
                            .add(format!(
                                ".parse(\"{}://$AUTHORITY/$PATH\")",
                                config.uri_scheme
                            ))
                            .build(),
                    ),
            )
            .with_property(
                PropertySpec::new("projection", TypeName::array_of(TypeName::string()))
                    .with_modifier(KModifier::Override)
                    .with_initializer(CodeBlock::of(format!(
                        "arrayOf({})",
                        self.columns
                            .iter()
                            .map(|c| c.constant.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))),
            )
            .with_property(
                PropertySpec::new("value", target.clone())
                    .with_modifier(KModifier::Override)
                    .with_receiver(runtime.content_values.clone())
                    .with_getter(self.constructor_call(|column| {
                        CodeBlock::builder()
                            .add(format!("get({}) as ", column.constant))
                            .add_type(column.ty.clone())
                            .build()
                    })),
            )
            .with_property(
                PropertySpec::new("value", target.clone())
                    .with_modifier(KModifier::Override)
                    .with_receiver(runtime.cursor.clone())
                    .with_getter(self.constructor_call(|column| {
                        CodeBlock::builder()
                            .add_member(runtime.cursor_get.clone())
                            .add(format!("({})", column.constant))
                            .build()
                    })),
            )
            .with_function(
                FunSpec::new("toContentValues")
                    .with_modifier(KModifier::Override)
                    .with_receiver(target.clone())
                    .with_returns(runtime.content_values.clone())
                    .with_body(self.to_content_values_body(&runtime.content_values)),
            )
            .with_function(
                FunSpec::new("toMatcher")
                    .with_modifier(KModifier::Override)
                    .with_returns(runtime.uri_matcher.clone())
                    .with_body(
                        CodeBlock::builder()
                            .add("return ")
                            .add_type(runtime.uri_matcher.clone())
                            .add("(")
                            .add_type(runtime.uri_matcher.clone())
                            .add(".NO_MATCH)\n")
                            .indent()
                            .add(".apply { addURI(AUTHORITY, PATH, CODE) }\n")
                            .unindent()
                            .build(),
                    ),
            )
            .with_function(
                FunSpec::new("toCursor")
                    .with_modifier(KModifier::Override)
                    .with_returns(runtime.matrix_cursor.clone())
                    .with_body(
                        CodeBlock::builder()
                            .add("return ")
                            .add_type(runtime.matrix_cursor.clone())
                            .add("(projection)\n")
                            .build(),
                    ),
            )
            .with_function(
                FunSpec::new("addAsRow")
                    .with_modifier(KModifier::Override)
                    .with_receiver(runtime.matrix_cursor.clone())
                    .with_parameter(ParameterSpec::new("value", target))
                    .with_body(self.add_row_body()),
            );

        FileSpec::new(self.target.package(), name).with_type(object)
    }

    /// `Target(\n  prop = <read>,\n)`
    fn constructor_call(&self, read: impl Fn(&ColumnPlan) -> CodeBlock) -> CodeBlock {
        let mut block = CodeBlock::builder()
            .add_type(self.target.clone())
            .add("(\n")
            .indent();
        for column in &self.columns {
            block = block
                .add_name(&column.property)
                .add(" = ")
                .add_block(read(column))
                .add(",\n");
        }
        block.unindent().add(")").build()
    }

    fn to_content_values_body(&self, content_values: &ClassName) -> CodeBlock {
        let mut block = CodeBlock::builder()
            .add("return ")
            .add_type(content_values.clone())
            .add("().apply {\n")
            .indent();
        for column in &self.columns {
            block = block
                .add(format!("put({}, ", column.constant))
                .add_name(&column.property)
                .add(")\n");
        }
        block.unindent().add("}\n").build()
    }

    fn add_row_body(&self) -> CodeBlock {
        let mut block = CodeBlock::builder().add("addRow(arrayOf(\n").indent();
        for column in &self.columns {
            block = block.add("value.").add_name(&column.property).add(",\n");
        }
        block.unindent().add("))\n").build()
    }
}

fn const_property(name: &str, ty: TypeName, value: CodeBlock) -> PropertySpec {
    PropertySpec::new(name, ty)
        .with_modifier(KModifier::Const)
        .with_initializer(value)
}

fn string_block(value: &str) -> CodeBlock {
    CodeBlock::builder().add_string(value).build()
}

/// Synthesize the contract unit for one marked aggregate.
pub fn synthesize(
    declaration: &Declaration,
    source: &dyn SymbolSource,
    config: &SynthesisConfig,
    vocabulary: &MarkerVocabulary,
) -> SynthResult<GeneratedUnit> {
    let markers = ContractMarkers::parse(declaration, vocabulary)?;
    synthesize_with(declaration, &markers, source, config)
}

/// Synthesize from marker arguments parsed at discovery.
pub fn synthesize_with(
    declaration: &Declaration,
    markers: &ContractMarkers,
    source: &dyn SymbolSource,
    config: &SynthesisConfig,
) -> SynthResult<GeneratedUnit> {
    let plan = ContractPlan::derive_with(declaration, markers, source)?;
    Ok(GeneratedUnit::new(
        plan.to_file(config),
        declaration.qualified_name(),
    ))
}

// ── Processor ────────────────────────────────────────────────────────

/// Runs contract synthesis over every resolvable persistence-marked
/// declaration.
pub struct ContentContractProcessor {
    config: SynthesisConfig,
    vocabulary: MarkerVocabulary,
}

impl ContentContractProcessor {
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            vocabulary: config.vocabulary(),
            config: config.clone(),
        }
    }
}

impl SymbolProcessor for ContentContractProcessor {
    fn name(&self) -> &str {
        "content-contract"
    }

    fn process(
        &mut self,
        round: &Round<'_>,
        emitter: &mut dyn CodeEmitter,
    ) -> EmitResult<ProcessOutcome> {
        let found: Discovered<'_, ContractMarkers> =
            discover(round, &self.vocabulary, ValidityFilter::Required);
        let mut outcome = ProcessOutcome {
            deferred: found.deferred,
            failures: found.failures,
            ..ProcessOutcome::default()
        };
        for Candidate {
            declaration,
            config: markers,
        } in found.ready
        {
            match synthesize_with(declaration, &markers, round.source, &self.config) {
                Ok(unit) => {
                    debug!(
                        declaration = %declaration.qualified_name(),
                        file = %unit.path().display(),
                        "synthesized persistence contract"
                    );
                    emitter.emit(unit)?;
                    outcome.emitted += 1;
                }
                Err(error) => outcome.failures.push(error),
            }
        }
        Ok(outcome)
    }
}
