//! Trait validity through the dependency graph
//!
//! A trait is valid only when its own fields are valid and every trait it
//! depends on is valid too. Dependencies are described by a table and
//! evaluated once per query in topological order:
//!
//! ```text
//! Geometry -> { Stroke, Fill, Text } -> { Arrow, Highlight, Shadow }
//! ```

use super::traits::TraitSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraitKind {
    Geometry,
    Stroke,
    Fill,
    Text,
    Arrow,
    Highlight,
    Shadow,
}

impl TraitKind {
    /// Every kind, dependencies before dependents
    pub const ALL: [TraitKind; 7] = [
        TraitKind::Geometry,
        TraitKind::Stroke,
        TraitKind::Fill,
        TraitKind::Text,
        TraitKind::Arrow,
        TraitKind::Highlight,
        TraitKind::Shadow,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// What this kind needs in order to be valid
    pub fn dependencies(self) -> Dependencies {
        const VECTOR: &[TraitKind] = &[TraitKind::Stroke, TraitKind::Fill, TraitKind::Text];
        match self {
            TraitKind::Geometry => Dependencies::NONE,
            TraitKind::Stroke | TraitKind::Fill | TraitKind::Text => Dependencies {
                all_of: &[TraitKind::Geometry],
                any_of: &[],
            },
            TraitKind::Arrow => Dependencies {
                all_of: &[TraitKind::Geometry, TraitKind::Stroke],
                any_of: &[],
            },
            TraitKind::Highlight | TraitKind::Shadow => Dependencies {
                all_of: &[TraitKind::Geometry],
                any_of: VECTOR,
            },
        }
    }
}

/// Every `all_of` kind must be valid, and at least one `any_of` kind when
/// that list is non-empty
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dependencies {
    pub all_of: &'static [TraitKind],
    pub any_of: &'static [TraitKind],
}

impl Dependencies {
    pub const NONE: Dependencies = Dependencies {
        all_of: &[],
        any_of: &[],
    };
}

pub fn is_present(traits: &TraitSet, kind: TraitKind) -> bool {
    match kind {
        TraitKind::Geometry => traits.geometry.is_some(),
        TraitKind::Stroke => traits.stroke.is_some(),
        TraitKind::Fill => traits.fill.is_some(),
        TraitKind::Text => traits.text.is_some(),
        TraitKind::Arrow => traits.arrow.is_some(),
        TraitKind::Highlight => traits.highlight.is_some(),
        TraitKind::Shadow => traits.shadow.is_some(),
    }
}

/// Validity of the trait's own fields, ignoring dependencies. Absent
/// traits are not locally valid.
pub fn is_locally_valid(traits: &TraitSet, kind: TraitKind) -> bool {
    match kind {
        TraitKind::Geometry => traits.geometry.as_ref().is_some_and(|g| g.is_valid()),
        TraitKind::Stroke => traits.stroke.as_ref().is_some_and(|s| s.is_valid()),
        TraitKind::Fill => traits.fill.as_ref().is_some_and(|f| f.is_valid()),
        TraitKind::Text => traits.text.as_ref().is_some_and(|t| t.is_valid()),
        TraitKind::Arrow | TraitKind::Highlight | TraitKind::Shadow => is_present(traits, kind),
    }
}

/// Validity of every present trait including its dependencies. Absent
/// traits are `false` here; [`is_valid_trait_opt`] decides how to treat them.
fn evaluate(traits: &TraitSet) -> [bool; 7] {
    let mut valid = [false; 7];
    for kind in TraitKind::ALL {
        if !is_locally_valid(traits, kind) {
            continue;
        }
        let deps = kind.dependencies();
        let all = deps.all_of.iter().all(|d| valid[d.index()]);
        let any = deps.any_of.is_empty() || deps.any_of.iter().any(|d| valid[d.index()]);
        valid[kind.index()] = all && any;
    }
    valid
}

/// Whether the optional trait `kind` counts as valid. An absent trait
/// yields `null_valid`.
pub fn is_valid_trait_opt(traits: &TraitSet, kind: TraitKind, null_valid: bool) -> bool {
    if !is_present(traits, kind) {
        return null_valid;
    }
    evaluate(traits)[kind.index()]
}

/// Every present trait is valid together with its dependencies
pub fn is_valid(traits: &TraitSet) -> bool {
    let valid = evaluate(traits);
    TraitKind::ALL
        .iter()
        .all(|k| !is_present(traits, *k) || valid[k.index()])
}

/// Something would be drawn: valid geometry plus a valid stroke, fill or
/// text. Arrow, highlight and shadow play no part.
pub fn is_visible(traits: &TraitSet) -> bool {
    let valid = evaluate(traits);
    valid[TraitKind::Geometry.index()]
        && [TraitKind::Stroke, TraitKind::Fill, TraitKind::Text]
            .iter()
            .any(|k| valid[k.index()])
}
