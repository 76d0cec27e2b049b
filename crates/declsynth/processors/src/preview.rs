//! Controller contract and preview synthesis.
//!
//! A controller marked previewable has to extend `Some<Name>`, an interface
//! this module generates from the controller's own overriding members. The
//! controller does not resolve until that interface exists, so this pass
//! runs without the validity filter and remembers what it has already
//! handled. A handled controller that still does not resolve is deferred;
//! when it comes back it is skipped, and it stays deferred until it resolves.
//!
//! ```text
//! round 1   WeatherViewModel : SomeWeatherViewModel   (unresolved supertype)
//!             └─► WeatherViewModelContract.kt
//!                   interface SomeWeatherViewModel
//!                   fun injectWeatherViewModel(...)
//!                   data class WeatherPreviewViewModel   (generate_model)
//!           WeatherViewModel deferred
//! round 2   WeatherViewModel comes back, already visited, now resolves
//! ```

use std::collections::HashSet;

use tracing::{debug, trace};

use declsynth_emit::{CodeEmitter, EmitResult, GeneratedUnit};
use declsynth_kotlin::{
    ClassName, CodeBlock, FileSpec, FunSpec, KModifier, ParameterSpec, PropertySpec, TypeName,
    TypeSpec,
};
use declsynth_source::SymbolSource;
use declsynth_types::{
    ContractConfig, Declaration, FunctionDecl, MarkerKind, MarkerVocabulary, Modifier,
    ParameterDecl, QualifiedName, SynthError, SynthResult, TypeRef, Visibility,
};

use crate::config::{RuntimeSymbols, SynthesisConfig};
use crate::discovery::{discover, Candidate, Discovered, MarkerArguments, ValidityFilter};
use crate::driver::{ProcessOutcome, Round, SymbolProcessor};
use crate::naming;

/// Members every controller inherits that never belong to its contract.
pub const IGNORED_FUNCTIONS: [&str; 5] = [
    "addCloseable",
    "equals",
    "getCloseable",
    "hashCode",
    "toString",
];

// ── Plan ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractProperty {
    pub name: String,
    pub ty: TypeName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractParameter {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: Vec<KModifier>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractFunction {
    pub name: String,
    pub parameters: Vec<ContractParameter>,
    pub returns: TypeName,
    /// Declared modifiers with `override` removed.
    pub modifiers: Vec<KModifier>,
}

impl ContractFunction {
    fn parameter_specs(&self) -> impl Iterator<Item = ParameterSpec> + '_ {
        self.parameters.iter().map(|parameter| {
            parameter.modifiers.iter().fold(
                ParameterSpec::new(parameter.name.clone(), parameter.ty.clone()),
                |spec, modifier| spec.with_modifier(*modifier),
            )
        })
    }
}

/// Everything the controller contract file is generated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerPlan {
    pub controller: ClassName,
    pub companion: ClassName,
    pub visibility: Visibility,
    pub properties: Vec<ContractProperty>,
    pub functions: Vec<ContractFunction>,
    /// Name of the preview data class, when one is requested.
    pub model: Option<ClassName>,
}

impl ControllerPlan {
    pub fn derive(
        declaration: &Declaration,
        source: &dyn SymbolSource,
        vocabulary: &MarkerVocabulary,
    ) -> SynthResult<Self> {
        let config = ContractConfig::parse(declaration, vocabulary)?;
        Self::derive_with(declaration, &config, source)
    }

    /// Derive from marker arguments parsed at discovery.
    pub fn derive_with(
        declaration: &Declaration,
        config: &ContractConfig,
        source: &dyn SymbolSource,
    ) -> SynthResult<Self> {
        let name = declaration.qualified_name().canonical();
        let controller = naming::class_name(declaration)?;
        let companion = controller.peer(naming::companion_name(&declaration.name));
        if !extends(declaration, companion.simple_name()) {
            return Err(SynthError::MissingCompanion {
                declaration: name,
                companion: companion.simple_name().to_string(),
                simple_name: declaration.name.clone(),
            });
        }

        let properties = source
            .all_properties(declaration)
            .into_iter()
            .filter(|p| is_contract_member(&p.member.modifiers, p.member.visibility))
            .map(|p| ContractProperty {
                name: p.member.name.clone(),
                ty: source.type_name(p.owner, &p.member.ty),
            })
            .collect();

        let functions: Vec<ContractFunction> = source
            .all_functions(declaration)
            .into_iter()
            .filter(|f| is_contract_member(&f.member.modifiers, f.member.visibility))
            .filter(|f| !IGNORED_FUNCTIONS.contains(&f.member.name.as_str()))
            .map(|f| contract_function(source, f.owner, f.member))
            .collect();

        let model = if config.generate_model {
            if let Some(function) = functions.iter().find(|f| !f.returns.is_unit()) {
                return Err(SynthError::NonUnitModelMethod {
                    declaration: name,
                    method: function.name.clone(),
                });
            }
            Some(controller.peer(naming::preview_model(&declaration.name)))
        } else {
            None
        };

        Ok(Self {
            controller,
            companion,
            visibility: declaration.visibility,
            properties,
            functions,
            model,
        })
    }

    pub fn to_file(&self, runtime: &RuntimeSymbols) -> FileSpec {
        let mut file = FileSpec::new(
            self.controller.package(),
            naming::contract_file(self.controller.simple_name()),
        )
        .with_type(self.contract_interface())
        .with_function(self.inject_function(runtime));
        if let Some(model) = &self.model {
            file = file.with_type(self.preview_model(model));
        }
        file
    }

    fn contract_interface(&self) -> TypeSpec {
        let mut contract = TypeSpec::interface(self.companion.simple_name())
            .with_modifier(self.visibility.to_kmodifier())
            .with_kdoc(
                CodeBlock::builder()
                    .add("The view model contract associated with [")
                    .add_type(self.controller.clone())
                    .add("].")
                    .build(),
            );
        for property in &self.properties {
            contract = contract.with_property(
                PropertySpec::new(property.name.clone(), property.ty.clone())
                    .with_modifier(KModifier::Abstract),
            );
        }
        for function in &self.functions {
            let mut spec = FunSpec::new(function.name.clone())
                .with_modifier(KModifier::Abstract)
                .with_modifiers(function.modifiers.iter().copied())
                .with_returns(function.returns.clone());
            for parameter in function.parameter_specs() {
                spec = spec.with_parameter(parameter);
            }
            contract = contract.with_function(spec);
        }
        contract
    }

    fn inject_function(&self, runtime: &RuntimeSymbols) -> FunSpec {
        let nullable = |class: &ClassName| class.as_type().with_nullable(true);
        let null = || CodeBlock::of("null");

        FunSpec::new(naming::inject_function(self.controller.simple_name()))
            .with_kdoc(
                CodeBlock::builder()
                    .add("Injects [")
                    .add_type(self.controller.clone())
                    .add("] or the preview associated with it if the system is currently under preview")
                    .build(),
            )
            .with_annotation(runtime.composable.clone())
            .with_modifier(self.visibility.to_kmodifier())
            .with_parameter(
                ParameterSpec::new("qualifier", nullable(&runtime.qualifier)).with_default(null()),
            )
            .with_parameter(
                ParameterSpec::new("viewModelStoreOwner", runtime.view_model_store_owner.clone())
                    .with_default(
                        CodeBlock::builder()
                            .add("checkNotNull(")
                            .add_type(runtime.local_view_model_store_owner.clone())
                            .add(".current) {\n")
                            .indent()
                            .add("\"No ViewModelStoreOwner was provided via LocalViewModelStoreOwner\"\n")
                            .unindent()
                            .add("}")
                            .build(),
                    ),
            )
            .with_parameter(
                ParameterSpec::new("key", TypeName::string().with_nullable(true))
                    .with_default(null()),
            )
            .with_parameter(
                ParameterSpec::new("extras", runtime.creation_extras.clone()).with_default(
                    CodeBlock::builder()
                        .add_member(runtime.default_extras.clone())
                        .add("(viewModelStoreOwner)")
                        .build(),
                ),
            )
            .with_parameter(
                ParameterSpec::new("scope", runtime.scope.clone()).with_default(
                    CodeBlock::builder()
                        .add_type(runtime.local_koin_scope.clone())
                        .add(".current")
                        .build(),
                ),
            )
            .with_parameter(
                ParameterSpec::new("parameters", nullable(&runtime.parameters_definition))
                    .with_default(null()),
            )
            .with_returns(self.companion.clone())
            .with_body(
                CodeBlock::builder()
                    .add("return ")
                    .add_member(runtime.inject_view_model.clone())
                    .add("<")
                    .add_type(self.controller.clone())
                    .add(", ")
                    .add_type(self.companion.clone())
                    .add(">(\n")
                    .indent()
                    .add("qualifier,\nviewModelStoreOwner,\nkey,\nextras,\nscope,\nparameters\n")
                    .unindent()
                    .add(")\n")
                    .build(),
            )
    }

    fn preview_model(&self, model: &ClassName) -> TypeSpec {
        let mut class = TypeSpec::class(model.simple_name())
            .with_modifier(self.visibility.to_kmodifier())
            .with_kdoc(
                CodeBlock::builder()
                    .add("The preview data class synthesized for previewing [")
                    .add_type(self.controller.clone())
                    .add("].")
                    .build(),
            )
            .with_superinterface(self.companion.clone());
        // A data class needs at least one constructor parameter.
        if !self.properties.is_empty() {
            class = class.with_modifier(KModifier::Data);
        }
        for property in &self.properties {
            class = class
                .with_constructor_parameter(ParameterSpec::new(
                    property.name.clone(),
                    property.ty.clone(),
                ))
                .with_property(
                    PropertySpec::new(property.name.clone(), property.ty.clone())
                        .with_modifier(KModifier::Override)
                        .with_initializer(CodeBlock::of(property.name.clone())),
                );
        }
        for function in &self.functions {
            let mut spec = FunSpec::new(function.name.clone())
                .with_modifier(KModifier::Override)
                .with_modifiers(function.modifiers.iter().copied())
                .with_body(CodeBlock::of("// no-op\n"));
            for parameter in function.parameter_specs() {
                spec = spec.with_parameter(parameter);
            }
            class = class.with_function(spec);
        }
        class
    }
}

/// Whether a supertype of `declaration` is written with the simple name
/// `companion`. The companion may not resolve yet, so only the written name
/// is compared.
fn extends(declaration: &Declaration, companion: &str) -> bool {
    declaration.supertypes.iter().any(|supertype| match supertype {
        TypeRef::Named { name, .. } => name.rsplit('.').next() == Some(companion),
        _ => false,
    })
}

fn is_contract_member(
    modifiers: &std::collections::BTreeSet<Modifier>,
    visibility: Visibility,
) -> bool {
    modifiers.contains(&Modifier::Override)
        && !matches!(visibility, Visibility::Protected | Visibility::Private)
}

fn contract_function(
    source: &dyn SymbolSource,
    owner: &Declaration,
    function: &FunctionDecl,
) -> ContractFunction {
    let parameter = |parameter: &ParameterDecl| ContractParameter {
        name: parameter.name.clone(),
        ty: source.type_name(owner, &parameter.ty),
        modifiers: parameter
            .modifiers
            .iter()
            .filter(|m| matches!(m, Modifier::Vararg | Modifier::Crossinline | Modifier::Noinline))
            .map(|m| m.to_kmodifier())
            .collect(),
    };
    ContractFunction {
        name: function.name.clone(),
        parameters: function.parameters.iter().map(parameter).collect(),
        returns: source.type_name(owner, &function.returns()),
        modifiers: function
            .modifiers
            .iter()
            .filter(|m| {
                !matches!(
                    m,
                    Modifier::Override | Modifier::Abstract | Modifier::Open | Modifier::Final
                )
            })
            .map(|m| m.to_kmodifier())
            .collect(),
    }
}

/// Synthesize the contract file for one marked controller.
pub fn synthesize(
    declaration: &Declaration,
    source: &dyn SymbolSource,
    config: &SynthesisConfig,
    vocabulary: &MarkerVocabulary,
) -> SynthResult<GeneratedUnit> {
    let contract = ContractConfig::parse(declaration, vocabulary)?;
    synthesize_with(declaration, &contract, source, config)
}

/// Synthesize from marker arguments parsed at discovery.
pub fn synthesize_with(
    declaration: &Declaration,
    contract: &ContractConfig,
    source: &dyn SymbolSource,
    config: &SynthesisConfig,
) -> SynthResult<GeneratedUnit> {
    let plan = ControllerPlan::derive_with(declaration, contract, source)?;
    Ok(GeneratedUnit::new(
        plan.to_file(&config.runtime),
        declaration.qualified_name(),
    ))
}

impl MarkerArguments for ContractConfig {
    const KIND: MarkerKind = MarkerKind::Previewable;

    fn parse(declaration: &Declaration, vocabulary: &MarkerVocabulary) -> SynthResult<Self> {
        let name = declaration.qualified_name().canonical();
        match vocabulary
            .find(&declaration.markers, Self::KIND)
            .collect::<Vec<_>>()
            .as_slice()
        {
            [] => Ok(Self::default()),
            [instance] => Self::from_marker(&name, instance),
            [instance, ..] => Err(SynthError::InvalidMarker {
                declaration: name,
                marker: instance.simple_name().to_string(),
                reason: "applied more than once".to_string(),
            }),
        }
    }
}

// ── Processor ────────────────────────────────────────────────────────

/// Runs controller synthesis once per marked controller.
pub struct PreviewProcessor {
    config: SynthesisConfig,
    vocabulary: MarkerVocabulary,
    visited: HashSet<QualifiedName>,
}

impl PreviewProcessor {
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            vocabulary: config.vocabulary(),
            config: config.clone(),
            visited: HashSet::new(),
        }
    }

    pub fn is_visited(&self, name: &QualifiedName) -> bool {
        self.visited.contains(name)
    }
}

impl SymbolProcessor for PreviewProcessor {
    fn name(&self) -> &str {
        "previewable"
    }

    fn process(
        &mut self,
        round: &Round<'_>,
        emitter: &mut dyn CodeEmitter,
    ) -> EmitResult<ProcessOutcome> {
        let found: Discovered<'_, ContractConfig> =
            discover(round, &self.vocabulary, ValidityFilter::Ignored);
        let mut outcome = ProcessOutcome {
            failures: found.failures,
            ..ProcessOutcome::default()
        };
        for Candidate {
            declaration,
            config,
        } in found.ready
        {
            let name = declaration.qualified_name();
            if self.visited.insert(name.clone()) {
                match synthesize_with(declaration, &config, round.source, &self.config) {
                    Ok(unit) => {
                        debug!(
                            declaration = %name,
                            file = %unit.path().display(),
                            "synthesized controller contract"
                        );
                        emitter.emit(unit)?;
                        outcome.emitted += 1;
                    }
                    Err(error) => outcome.failures.push(error),
                }
            } else {
                trace!(declaration = %name, round = round.number, "already processed");
            }
            // Units emitted this round become visible next round.
            if !round.source.is_valid(declaration) {
                outcome.deferred.push(name);
            }
        }
        Ok(outcome)
    }
}
