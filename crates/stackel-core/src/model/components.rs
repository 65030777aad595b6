//! Block-structured components: blocks, index sets, complementarities,
//! disjunctions, and the typed references that tie them together.

use stackel_expr::{
    BlockId, ComplementarityId, ConstraintExpr, ConstraintId, DisjunctionId, Expr, IndexSetId,
    ObjectiveId, VariableId,
};

/// Typed reference to any model component.
///
/// These are the stable identifiers recorded in transformation provenance;
/// they survive activation toggling and are resolved through explicit lookup
/// calls on the model, never by structural traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentRef {
    Variable(VariableId),
    Constraint(ConstraintId),
    Objective(ObjectiveId),
    IndexSet(IndexSetId),
    Complementarity(ComplementarityId),
    Disjunction(DisjunctionId),
    Block(BlockId),
}

impl ComponentRef {
    /// Whether activation toggling is defined for this component kind.
    ///
    /// Variable and index-set containers hold data, not logical structure;
    /// toggling them through the component interface is a caller error.
    pub fn is_activatable(self) -> bool {
        !matches!(
            self,
            ComponentRef::Variable(_) | ComponentRef::IndexSet(_)
        )
    }

    pub fn kind_str(self) -> &'static str {
        match self {
            ComponentRef::Variable(_) => "variable",
            ComponentRef::Constraint(_) => "constraint",
            ComponentRef::Objective(_) => "objective",
            ComponentRef::IndexSet(_) => "index_set",
            ComponentRef::Complementarity(_) => "complementarity",
            ComponentRef::Disjunction(_) => "disjunction",
            ComponentRef::Block(_) => "block",
        }
    }

    fn raw(self) -> u32 {
        match self {
            ComponentRef::Variable(id) => id.inner(),
            ComponentRef::Constraint(id) => id.inner(),
            ComponentRef::Objective(id) => id.inner(),
            ComponentRef::IndexSet(id) => id.inner(),
            ComponentRef::Complementarity(id) => id.inner(),
            ComponentRef::Disjunction(id) => id.inner(),
            ComponentRef::Block(id) => id.inner(),
        }
    }
}

impl std::fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind_str(), self.raw())
    }
}

/// Role a block plays inside a bilevel model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    /// Plain component container.
    Plain,
    /// The lower-level sub-model of a bilevel program.
    LowerLevel,
}

/// A named container of components with an activation flag.
///
/// Deactivating a block hides its constraints, objectives, complementarities,
/// disjunctions, and nested blocks from the effective view; member variables
/// and index sets keep their own state.
#[derive(Debug, Clone)]
pub struct Block {
    pub(crate) name: String,
    pub(crate) role: BlockRole,
    pub(crate) members: Vec<ComponentRef>,
    pub(crate) is_active: bool,
}

impl Block {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> BlockRole {
        self.role
    }

    pub fn members(&self) -> &[ComponentRef] {
        &self.members
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// A named index collection used to mint variable families.
///
/// Index sets carry no activation flag; they are pure data containers.
#[derive(Debug, Clone)]
pub struct IndexSet {
    pub(crate) name: String,
    pub(crate) elements: Vec<String>,
}

impl IndexSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A complementarity condition: `first >= 0`, `second >= 0`, and at most one
/// of the two strictly positive.
///
/// The non-negativity halves are enforced by ordinary constraints or variable
/// bounds; this component only carries the exclusion.
#[derive(Debug, Clone)]
pub struct Complementarity {
    pub first: Expr,
    pub second: Expr,
    pub is_active: bool,
}

impl Complementarity {
    pub fn new(first: Expr, second: Expr) -> Self {
        Self {
            first,
            second,
            is_active: true,
        }
    }
}

/// An either-or choice between arms of linear constraints.
#[derive(Debug, Clone)]
pub struct Disjunction {
    pub arms: Vec<Vec<ConstraintExpr>>,
    pub is_active: bool,
}

impl Disjunction {
    pub fn new(arms: Vec<Vec<ConstraintExpr>>) -> Self {
        Self {
            arms,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_and_index_sets_are_not_activatable() {
        assert!(!ComponentRef::Variable(VariableId::new(0)).is_activatable());
        assert!(!ComponentRef::IndexSet(IndexSetId::new(0)).is_activatable());
        assert!(ComponentRef::Constraint(ConstraintId::new(0)).is_activatable());
        assert!(ComponentRef::Block(BlockId::new(0)).is_activatable());
        assert!(ComponentRef::Objective(ObjectiveId::new(0)).is_activatable());
    }

    #[test]
    fn component_display_names_kind_and_id() {
        let c = ComponentRef::Disjunction(DisjunctionId::new(3));
        assert_eq!(c.to_string(), "disjunction 3");
    }
}
