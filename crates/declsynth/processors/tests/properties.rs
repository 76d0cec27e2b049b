//! Property tests for the synthesizers.
//!
//! - every enum or sealed value satisfies exactly one generated accessor
//! - persistence contracts decode what they encode
//! - synthesis is a pure function of its input

use std::collections::BTreeSet;

use declsynth_emit::{CodeEmitter, EmitStatus, MemoryEmitter};
use declsynth_kotlin::ClassName;
use declsynth_processors::{contract, discriminator, ContractPlan, DiscriminatorPlan, Record, SynthesisConfig, Value};
use declsynth_source::InMemorySymbolSource;
use declsynth_types::{
    DeclKind, Declaration, MarkerInstance, MarkerVocabulary, Modifier, PropertyDecl, TypeRef,
};
use proptest::prelude::*;

const PACKAGE: &str = "demo.props";

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

/// Distinct case names. Lower-case tails keep their accessors distinct.
/// Names of the enclosing declarations are excluded so nested lookups stay
/// unambiguous.
fn arb_case_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[A-Z][a-z]{1,8}", 1..12)
        .prop_filter("clashes with the enclosing name", |set| {
            !set.contains("Shape") && !set.contains("Choice")
        })
        .prop_map(|set| set.into_iter().collect())
}

fn only(declaration: Declaration) -> InMemorySymbolSource {
    let mut source = InMemorySymbolSource::new();
    source.add_declaration(declaration).unwrap();
    source
}

fn top(source: &InMemorySymbolSource) -> &Declaration {
    source.declarations().next().unwrap()
}

fn sample(code: i64) -> Declaration {
    Declaration::new(DeclKind::Class, PACKAGE, "Sample")
        .with_modifier(Modifier::Data)
        .with_marker(
            MarkerInstance::new("ContentType")
                .with_string("authority", "demo.props.provider")
                .with_string("path", "samples")
                .with_int("code", code),
        )
        .with_property(PropertyDecl::new("label", ty("String")))
        .with_property(PropertyDecl::new("note", ty("String?")))
        .with_property(PropertyDecl::new("count", ty("Long")))
        .with_property(PropertyDecl::new("ratio", ty("Double")))
        .with_property(PropertyDecl::new("flag", ty("Boolean")))
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        ".*",
        prop::option::of(".*"),
        any::<i64>(),
        -1.0e12f64..1.0e12,
        any::<bool>(),
    )
        .prop_map(|(label, note, count, ratio, flag)| {
            Record::from([
                ("label".to_string(), Value::Text(label)),
                ("note".to_string(), note.map_or(Value::Null, Value::Text)),
                ("count".to_string(), Value::Integer(count)),
                ("ratio".to_string(), Value::Real(ratio)),
                ("flag".to_string(), Value::Bool(flag)),
            ])
        })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Each enum entry satisfies its own accessor and no other.
    #[test]
    fn enum_accessors_are_mutually_exclusive(names in arb_case_names()) {
        let declaration = Declaration::new(DeclKind::Enum, PACKAGE, "Choice")
            .with_marker(MarkerInstance::new("CaseDetection"))
            .with_entries(names.iter().map(String::as_str));
        let source = only(declaration);
        let plan = DiscriminatorPlan::derive(top(&source), &source, "CaseDetection").unwrap();
        prop_assert_eq!(plan.cases.len(), names.len());

        let choice = ClassName::new(PACKAGE, "Choice");
        for name in &names {
            let lineage = [choice.nested(name.clone())];
            let holding = plan.evaluate(&lineage);
            prop_assert_eq!(holding.len(), 1);
            prop_assert_eq!(holding[0].to_string(), format!("is{}", name));
        }
    }

    /// A value of a sealed subclass satisfies only that subclass's accessor,
    /// even though its lineage includes the sealed parent.
    #[test]
    fn sealed_accessors_are_mutually_exclusive(names in arb_case_names()) {
        let mut sealed = Declaration::new(DeclKind::Class, PACKAGE, "Shape")
            .with_modifier(Modifier::Sealed)
            .with_marker(MarkerInstance::new("CaseDetection"));
        for name in &names {
            sealed = sealed.with_nested(
                Declaration::new(DeclKind::Class, "", name.clone()).with_supertype(ty("Shape")),
            );
        }
        let source = only(sealed);
        let plan = DiscriminatorPlan::derive(top(&source), &source, "CaseDetection").unwrap();

        let shape = ClassName::new(PACKAGE, "Shape");
        let accessors: BTreeSet<&str> = plan.cases.iter().map(|c| c.accessor.as_str()).collect();
        prop_assert_eq!(accessors.len(), names.len());
        for name in &names {
            let lineage = [shape.nested(name.clone()), shape.clone()];
            prop_assert_eq!(plan.evaluate(&lineage).len(), 1);
        }
    }

    /// Mapping and row encodings both decode to the original record.
    #[test]
    fn contract_codec_is_symmetric(record in arb_record()) {
        let source = only(sample(0));
        let plan = ContractPlan::derive(top(&source), &source, &MarkerVocabulary::default()).unwrap();

        let mapping = plan.encode(&record).unwrap();
        prop_assert_eq!(mapping.len(), plan.columns.len());
        prop_assert_eq!(plan.decode_values(&mapping).unwrap(), record.clone());

        let row = plan.to_row(&record).unwrap();
        prop_assert_eq!(row.len(), plan.projection().len());
        prop_assert_eq!(plan.decode_row(&row).unwrap(), record);
    }

    /// Any Int the marker carries reaches the generated constant verbatim.
    #[test]
    fn match_code_is_carried_through(code in any::<i32>()) {
        let source = only(sample(i64::from(code)));
        let plan = ContractPlan::derive(top(&source), &source, &MarkerVocabulary::default()).unwrap();
        prop_assert_eq!(plan.code, code);
        let text = plan.to_file(&SynthesisConfig::default()).render();
        let expected = format!("public const val CODE: Int = {}\n", code);
        prop_assert!(text.contains(&expected));
    }

    /// Synthesizing the same declaration twice yields byte-identical output,
    /// and re-emitting it is a no-op.
    #[test]
    fn synthesis_is_idempotent(names in arb_case_names(), code in any::<i32>()) {
        let config = SynthesisConfig::default();
        let vocabulary = config.vocabulary();
        let choice = Declaration::new(DeclKind::Enum, PACKAGE, "Choice")
            .with_marker(MarkerInstance::new("CaseDetection"))
            .with_entries(names.iter().map(String::as_str));
        let mut source = only(choice);
        source.add_declaration(sample(i64::from(code))).unwrap();
        let declarations: Vec<&Declaration> = source
            .declarations()
            .filter(|d| d.kind != DeclKind::EnumEntry)
            .collect();

        let first = discriminator::synthesize(declarations[0], &source, &vocabulary).unwrap();
        let again = discriminator::synthesize(declarations[0], &source, &vocabulary).unwrap();
        prop_assert_eq!(first.render(), again.render());

        let contract_unit = contract::synthesize(declarations[1], &source, &config, &vocabulary).unwrap();
        let contract_again = contract::synthesize(declarations[1], &source, &config, &vocabulary).unwrap();
        prop_assert_eq!(contract_unit.render(), contract_again.render());

        let mut emitter = MemoryEmitter::new();
        prop_assert_eq!(emitter.emit(first).unwrap(), EmitStatus::Written);
        prop_assert_eq!(emitter.emit(again).unwrap(), EmitStatus::Unchanged);
        prop_assert_eq!(emitter.emit(contract_unit).unwrap(), EmitStatus::Written);
        prop_assert_eq!(emitter.emit(contract_again).unwrap(), EmitStatus::Unchanged);
        prop_assert_eq!(emitter.emitted().len(), 2);
    }
}

#[test]
fn codec_rejects_nulls_in_non_null_columns() {
    let source = only(sample(0));
    let plan = ContractPlan::derive(top(&source), &source, &MarkerVocabulary::default()).unwrap();
    let mut row = vec![
        Value::Text(String::new()),
        Value::Null,
        Value::Integer(-1),
        Value::Real(0.5),
        Value::Bool(false),
    ];
    assert!(plan.decode_row(&row).is_ok());
    row[0] = Value::Null;
    assert!(plan.decode_row(&row).is_err());
}
