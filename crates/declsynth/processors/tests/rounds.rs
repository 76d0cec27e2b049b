//! End-to-end runs of the standard driver over small declaration graphs.

use std::cell::RefCell;
use std::rc::Rc;

use declsynth_emit::{CodeEmitter, EmitResult, MemoryEmitter};
use declsynth_processors::{
    Driver, DriverConfig, DriverError, PreviewProcessor, ProcessOutcome, Round, SymbolProcessor,
    SynthesisConfig,
};
use declsynth_source::InMemorySymbolSource;
use declsynth_types::{
    DeclKind, Declaration, FunctionDecl, MarkerInstance, Modifier, PropertyDecl, SynthError,
    TypeRef,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

fn direction() -> Declaration {
    Declaration::new(DeclKind::Enum, "demo.casedetection", "Direction")
        .with_marker(MarkerInstance::new("CaseDetection"))
        .with_entries(["Up", "Down", "Left", "Right"])
}

fn device() -> Declaration {
    let subclass =
        |name: &str| Declaration::new(DeclKind::Class, "", name).with_supertype(ty("Device"));
    Declaration::new(DeclKind::Interface, "demo.casedetection", "Device")
        .with_modifier(Modifier::Sealed)
        .with_marker(MarkerInstance::new("CaseDetection"))
        .with_nested(subclass("Laptop"))
        .with_nested(subclass("Smartphone"))
}

fn location() -> Declaration {
    Declaration::new(DeclKind::Class, "demo.weather.data", "Location")
        .with_modifier(Modifier::Data)
        .with_marker(
            MarkerInstance::new("ContentType")
                .with_string("authority", "demo.weather.provider")
                .with_string("path", "locations")
                .with_int("code", 1),
        )
        .with_property(
            PropertyDecl::new("name", ty("String")).with_marker(
                MarkerInstance::new("ColumnName").with_string("name", "LOCATION_NAME"),
            ),
        )
        .with_property(PropertyDecl::new("district", ty("String")))
        .with_property(PropertyDecl::new("longitude", ty("Double")))
        .with_property(PropertyDecl::new("latitude", ty("Double")))
}

fn weather_view_model() -> Declaration {
    Declaration::new(DeclKind::Class, "demo.weather.ui", "WeatherViewModel")
        .with_marker(MarkerInstance::new("Previewable").with_bool("generateModel", true))
        .with_supertype(ty("SomeWeatherViewModel"))
        .with_property(PropertyDecl::new("city", ty("String")).with_modifier(Modifier::Override))
        .with_function(FunctionDecl::new("refresh").with_modifier(Modifier::Override))
}

fn source_with(declarations: Vec<Declaration>) -> InMemorySymbolSource {
    let mut source = InMemorySymbolSource::new();
    for declaration in declarations {
        source.add_declaration(declaration).unwrap();
    }
    source
}

fn standard(config: DriverConfig) -> Driver {
    Driver::standard(&SynthesisConfig::default(), config).unwrap()
}

/// What a processor was handed in each round: the round number and the
/// declarations carried over from the round before.
type Presented = Rc<RefCell<Vec<(usize, Vec<String>)>>>;

/// Records every round before delegating.
struct Recording<P> {
    inner: P,
    presented: Presented,
}

impl<P: SymbolProcessor> SymbolProcessor for Recording<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn process(
        &mut self,
        round: &Round<'_>,
        emitter: &mut dyn CodeEmitter,
    ) -> EmitResult<ProcessOutcome> {
        let carried = round.deferred.iter().map(|name| name.canonical()).collect();
        self.presented.borrow_mut().push((round.number, carried));
        self.inner.process(round, emitter)
    }
}

fn recording_preview() -> (Driver, Presented) {
    let presented = Presented::default();
    let processor = Recording {
        inner: PreviewProcessor::new(&SynthesisConfig::default()),
        presented: Rc::clone(&presented),
    };
    let driver = Driver::new(DriverConfig::default()).with_processor(Box::new(processor));
    (driver, presented)
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[test]
fn every_marker_produces_its_unit() {
    let mut source = source_with(vec![direction(), device(), location(), weather_view_model()]);
    let mut emitter = MemoryEmitter::new();
    let summary = standard(DriverConfig::default())
        .run(&mut source, &mut emitter)
        .unwrap();

    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.emitted["case-detection"], 2);
    assert_eq!(summary.emitted["content-contract"], 1);
    assert_eq!(summary.emitted["previewable"], 1);
    assert!(summary.unresolved.is_empty());
    assert_eq!(summary.to_string(), "4 unit(s) in 2 round(s)");

    let direction = emitter
        .text("demo/casedetection/DirectionCaseDetection.kt")
        .unwrap();
    assert!(direction.contains("public val Direction.isLeft: Boolean\n  get() = this == Direction.Left\n"));
    let device = emitter
        .text("demo/casedetection/DeviceCaseDetection.kt")
        .unwrap();
    assert!(device.contains("public val Device.isLaptop: Boolean\n  get() = this is Device.Laptop\n"));
    let location = emitter.text("demo/weather/data/LocationContract.kt").unwrap();
    assert!(location.contains("public const val CODE: Int = 1\n"));
    let weather = emitter.text("demo/weather/ui/WeatherViewModelContract.kt").unwrap();
    assert!(weather.contains("public interface SomeWeatherViewModel {"));
    assert!(weather.contains("public data class WeatherPreviewViewModel("));
}

#[test]
fn generated_types_unblock_deferred_declarations() {
    let snapshot = Declaration::new(DeclKind::Class, "demo.weather.ui", "Snapshot")
        .with_modifier(Modifier::Data)
        .with_marker(
            MarkerInstance::new("ContentType")
                .with_string("authority", "demo.weather.provider")
                .with_string("path", "snapshots"),
        )
        .with_property(PropertyDecl::new("preview", ty("WeatherPreviewViewModel")));
    let mut source = source_with(vec![snapshot, weather_view_model()]);
    let mut emitter = MemoryEmitter::new();
    let summary = standard(DriverConfig::default())
        .run(&mut source, &mut emitter)
        .unwrap();

    // round 1: controller contract, round 2: snapshot contract, round 3: nothing
    assert_eq!(summary.rounds, 3);
    assert_eq!(summary.total_emitted(), 2);
    let snapshot = emitter.text("demo/weather/ui/SnapshotContract.kt").unwrap();
    assert!(snapshot.contains("preview = get(PREVIEW) as WeatherPreviewViewModel,\n"));
}

#[test]
fn unresolvable_declarations_are_reported() {
    let dangling = Declaration::new(DeclKind::Enum, "demo", "Dangling")
        .with_marker(MarkerInstance::new("CaseDetection"))
        .with_supertype(ty("Nowhere"))
        .with_entries(["A"]);
    let mut source = source_with(vec![dangling.clone(), direction()]);
    let mut emitter = MemoryEmitter::new();
    let summary = standard(DriverConfig::default())
        .run(&mut source, &mut emitter)
        .unwrap();
    assert_eq!(summary.unresolved, ["demo.Dangling"]);
    assert_eq!(summary.total_emitted(), 1);

    let mut source = source_with(vec![dangling]);
    let strict = DriverConfig {
        deny_unresolved: true,
        ..DriverConfig::default()
    };
    let err = standard(strict)
        .run(&mut source, &mut MemoryEmitter::new())
        .unwrap_err();
    assert!(matches!(err, DriverError::Unresolved(ref names) if names == &["demo.Dangling"]));
}

#[test]
fn failures_fail_the_run_but_not_their_siblings() {
    let plain = Declaration::new(DeclKind::Class, "demo.weather.data", "Plain")
        .with_marker(
            MarkerInstance::new("ContentType")
                .with_string("authority", "demo.weather.provider")
                .with_string("path", "plain"),
        )
        .with_property(PropertyDecl::new("id", ty("Int")));
    let mut source = source_with(vec![plain, location()]);
    let mut emitter = MemoryEmitter::new();
    let err = standard(DriverConfig::default())
        .run(&mut source, &mut emitter)
        .unwrap_err();

    match err {
        DriverError::SynthesisFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(failures[0], SynthError::NotAggregate { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(emitter.text("demo/weather/data/LocationContract.kt").is_some());
    assert!(emitter.text("demo/weather/data/PlainContract.kt").is_none());
}

#[test]
fn malformed_markers_fail_even_when_unresolvable() {
    let bad = Declaration::new(DeclKind::Class, "demo", "Bad")
        .with_modifier(Modifier::Data)
        .with_marker(MarkerInstance::new("ContentType").with_string("authority", "a"))
        .with_property(PropertyDecl::new("p", ty("Nowhere")));
    let mut source = source_with(vec![bad]);
    let mut emitter = MemoryEmitter::new();
    let err = standard(DriverConfig::default())
        .run(&mut source, &mut emitter)
        .unwrap_err();

    match err {
        DriverError::SynthesisFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(
                failures[0],
                SynthError::InvalidMarker { ref declaration, ref reason, .. }
                    if declaration == "demo.Bad" && reason == "missing required argument 'path'"
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(emitter.is_empty());
}

#[test]
fn controllers_come_back_until_they_resolve() {
    let (mut driver, presented) = recording_preview();
    let mut source = source_with(vec![weather_view_model()]);
    let mut emitter = MemoryEmitter::new();
    let summary = driver.run(&mut source, &mut emitter).unwrap();

    assert_eq!(
        *presented.borrow(),
        [
            (1, vec![]),
            (2, vec!["demo.weather.ui.WeatherViewModel".to_string()]),
        ]
    );
    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.emitted["previewable"], 1);
    assert!(summary.unresolved.is_empty());
    assert_eq!(emitter.emitted().len(), 1);
}

#[test]
fn controllers_with_dangling_types_are_reported() {
    let dangling = || {
        weather_view_model().with_property(
            PropertyDecl::new("forecast", ty("Nowhere")).with_modifier(Modifier::Override),
        )
    };
    let (mut driver, presented) = recording_preview();
    let mut source = source_with(vec![dangling()]);
    let summary = driver.run(&mut source, &mut MemoryEmitter::new()).unwrap();
    assert_eq!(summary.unresolved, ["demo.weather.ui.WeatherViewModel"]);
    assert_eq!(summary.emitted["previewable"], 1);
    assert_eq!(presented.borrow().len(), 2);

    let mut source = source_with(vec![dangling()]);
    let strict = DriverConfig {
        deny_unresolved: true,
        ..DriverConfig::default()
    };
    let err = standard(strict)
        .run(&mut source, &mut MemoryEmitter::new())
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Unresolved(ref names) if names == &["demo.weather.ui.WeatherViewModel"]
    ));
}

#[test]
fn missing_companion_emits_nothing() {
    let mut lone = weather_view_model();
    lone.supertypes.clear();
    let mut source = source_with(vec![lone]);
    let mut emitter = MemoryEmitter::new();
    let err = standard(DriverConfig::default())
        .run(&mut source, &mut emitter)
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("demo.weather.ui.WeatherViewModel must extend SomeWeatherViewModel"));
    assert!(emitter.is_empty());
    assert!(emitter.emitted().is_empty());
}

#[test]
fn runs_are_deterministic() {
    let render = || {
        let mut source =
            source_with(vec![direction(), device(), location(), weather_view_model()]);
        let mut emitter = MemoryEmitter::new();
        standard(DriverConfig::default())
            .run(&mut source, &mut emitter)
            .unwrap();
        emitter
            .emitted()
            .into_iter()
            .map(|unit| (unit.path(), unit.text.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(render(), render());
}
