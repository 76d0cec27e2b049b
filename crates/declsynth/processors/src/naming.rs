//! Names of generated files, types and members.

use declsynth_kotlin::ClassName;
use declsynth_types::{Declaration, SynthError, SynthResult};

/// The class name generated code uses to refer to `declaration`.
pub fn class_name(declaration: &Declaration) -> SynthResult<ClassName> {
    let name = declaration.qualified_name();
    name.to_class_name().map_err(|e| SynthError::InvalidName {
        declaration: name.canonical(),
        reason: e.to_string(),
    })
}

/// `CENTER_ALIGNED` → `CenterAligned`, `up` → `Up`.
///
/// Each `_`-separated segment is lower-cased with its first character
/// upper-cased. Empty segments vanish.
pub fn snake_to_pascal(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let lower = segment.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Accessor testing for an enum entry.
pub fn enum_accessor(entry: &str) -> String {
    format!("is{}", snake_to_pascal(entry))
}

/// Accessor testing for a sealed subclass. The subclass name is kept as is.
pub fn sealed_accessor(subclass: &str) -> String {
    format!("is{}", subclass)
}

/// Name of the constant holding a property's column name.
pub fn column_constant(property: &str) -> String {
    property.to_uppercase()
}

pub fn case_detection_file(declaration: &str) -> String {
    format!("{}CaseDetection", declaration)
}

pub fn contract_file(declaration: &str) -> String {
    format!("{}Contract", declaration)
}

/// The abstract contract a controller has to extend.
pub fn companion_name(controller: &str) -> String {
    format!("Some{}", controller)
}

pub fn inject_function(controller: &str) -> String {
    format!("inject{}", controller)
}

/// `WeatherViewModel` → `WeatherPreviewViewModel`. Controllers without
/// `ViewModel` in their name get a `Preview` suffix.
pub fn preview_model(controller: &str) -> String {
    if controller.contains("ViewModel") {
        controller.replace("ViewModel", "PreviewViewModel")
    } else {
        format!("{}Preview", controller)
    }
}
