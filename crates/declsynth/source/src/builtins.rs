//! Types visible without an import in every Kotlin file.

use declsynth_kotlin::ClassName;

const KOTLIN: &[&str] = &[
    "Annotation",
    "Any",
    "Array",
    "Boolean",
    "BooleanArray",
    "Byte",
    "ByteArray",
    "Char",
    "CharArray",
    "CharSequence",
    "Comparable",
    "Double",
    "DoubleArray",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FloatArray",
    "Function",
    "IllegalArgumentException",
    "IllegalStateException",
    "Int",
    "IntArray",
    "Lazy",
    "Long",
    "LongArray",
    "Nothing",
    "Number",
    "Pair",
    "Result",
    "RuntimeException",
    "Short",
    "ShortArray",
    "String",
    "Throwable",
    "Triple",
    "UByte",
    "UInt",
    "ULong",
    "UShort",
    "Unit",
];

const KOTLIN_COLLECTIONS: &[&str] = &[
    "ArrayList",
    "Collection",
    "HashMap",
    "HashSet",
    "Iterable",
    "Iterator",
    "LinkedHashMap",
    "LinkedHashSet",
    "List",
    "ListIterator",
    "Map",
    "MutableCollection",
    "MutableIterable",
    "MutableIterator",
    "MutableList",
    "MutableMap",
    "MutableSet",
    "Set",
];

const KOTLIN_RANGES: &[&str] = &["CharRange", "IntRange", "LongRange"];

const KOTLIN_SEQUENCES: &[&str] = &["Sequence"];

const KOTLIN_TEXT: &[&str] = &["Appendable", "Regex", "StringBuilder"];

/// Resolve a simple name against the default imports.
pub fn default_import(simple_name: &str) -> Option<ClassName> {
    let tables: [(&str, &[&str]); 5] = [
        ("kotlin", KOTLIN),
        ("kotlin.collections", KOTLIN_COLLECTIONS),
        ("kotlin.ranges", KOTLIN_RANGES),
        ("kotlin.sequences", KOTLIN_SEQUENCES),
        ("kotlin.text", KOTLIN_TEXT),
    ];
    tables
        .iter()
        .find(|(_, names)| names.binary_search(&simple_name).is_ok())
        .map(|(package, _)| ClassName::new(*package, simple_name))
}
