//! Kotlin declaration modifiers.

use serde::{Deserialize, Serialize};

/// A Kotlin modifier keyword.
///
/// Variants are declared in the order the Kotlin style guide recommends, so
/// sorting a set of modifiers yields their rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KModifier {
    Public,
    Protected,
    Private,
    Internal,
    Expect,
    Actual,
    Final,
    Open,
    Abstract,
    Sealed,
    Const,
    External,
    Override,
    Lateinit,
    Tailrec,
    Vararg,
    Noinline,
    Crossinline,
    Suspend,
    Inner,
    Enum,
    Annotation,
    Fun,
    Companion,
    Inline,
    Value,
    Infix,
    Operator,
    Data,
}

impl KModifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Expect => "expect",
            Self::Actual => "actual",
            Self::Final => "final",
            Self::Open => "open",
            Self::Abstract => "abstract",
            Self::Sealed => "sealed",
            Self::Const => "const",
            Self::External => "external",
            Self::Override => "override",
            Self::Lateinit => "lateinit",
            Self::Tailrec => "tailrec",
            Self::Vararg => "vararg",
            Self::Noinline => "noinline",
            Self::Crossinline => "crossinline",
            Self::Suspend => "suspend",
            Self::Inner => "inner",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Fun => "fun",
            Self::Companion => "companion",
            Self::Inline => "inline",
            Self::Value => "value",
            Self::Infix => "infix",
            Self::Operator => "operator",
            Self::Data => "data",
        }
    }

    pub fn is_visibility(&self) -> bool {
        matches!(
            self,
            Self::Public | Self::Protected | Self::Private | Self::Internal
        )
    }
}

impl std::fmt::Display for KModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn sorted_set_follows_style_guide_order() {
        let set: BTreeSet<KModifier> = [KModifier::Data, KModifier::Override, KModifier::Public]
            .into_iter()
            .collect();
        let rendered: Vec<&str> = set.iter().map(KModifier::keyword).collect();
        assert_eq!(rendered, ["public", "override", "data"]);
    }

    #[test]
    fn visibility_classification() {
        assert!(KModifier::Internal.is_visibility());
        assert!(!KModifier::Suspend.is_visibility());
    }
}
