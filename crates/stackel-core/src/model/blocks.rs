//! Block containers, index sets, and the activation cascade.

use crate::model::components::{
    Block, BlockRole, Complementarity, ComponentRef, Disjunction, IndexSet,
};
use crate::model::error::ModelError;
use crate::model::Model;
use crate::types::{Objective, Sense, Variable};
use stackel_expr::{
    BlockId, ComplementarityId, ConstraintExpr, ConstraintId, DisjunctionId, Expr, IndexSetId,
    ObjectiveId, VariableId,
};

impl Model {
    /// Add a plain block.
    pub fn add_block(&mut self, name: &str) -> Result<BlockId, ModelError> {
        self.add_block_with_role(name, BlockRole::Plain)
    }

    /// Add the lower-level sub-model block of a bilevel program.
    pub fn add_submodel(&mut self, name: &str) -> Result<BlockId, ModelError> {
        self.add_block_with_role(name, BlockRole::LowerLevel)
    }

    fn add_block_with_role(&mut self, name: &str, role: BlockRole) -> Result<BlockId, ModelError> {
        if self.blocks.values().any(|b| b.name == name) {
            return Err(ModelError::DuplicateBlock(name.to_string()));
        }
        let id = BlockId::new(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(
            id,
            Block {
                name: name.to_string(),
                role,
                members: Vec::new(),
                is_active: true,
            },
        );
        tracing::debug!(
            component = "model",
            operation = "add_block",
            status = "success",
            block = name,
            role = ?role,
            "Added block"
        );
        Ok(id)
    }

    /// Get a block by ID.
    pub fn block(&self, id: BlockId) -> Result<&Block, ModelError> {
        self.blocks.get(&id).ok_or(ModelError::InvalidBlockId(id))
    }

    /// Lookup a block by name.
    pub fn block_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .find_map(|(id, b)| (b.name == name).then_some(*id))
    }

    /// Iterate block ids in creation order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.keys().copied()
    }

    /// Blocks carrying a given role, in creation order.
    pub fn blocks_with_role(&self, role: BlockRole) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter_map(|(id, b)| (b.role == role).then_some(*id))
            .collect()
    }

    /// Attach an existing component to a block.
    ///
    /// A component belongs to at most one block; re-attachment is an error.
    pub fn attach(&mut self, block: BlockId, component: ComponentRef) -> Result<(), ModelError> {
        self.ensure_component_exists(component)?;
        if !self.blocks.contains_key(&block) {
            return Err(ModelError::InvalidBlockId(block));
        }
        if self.owners.contains_key(&component) {
            return Err(ModelError::AlreadyAttached(component));
        }
        self.owners.insert(component, block);
        if let Some(b) = self.blocks.get_mut(&block) {
            b.members.push(component);
        }
        Ok(())
    }

    /// The block owning a component, if it is not a root component.
    pub fn owner_of(&self, component: ComponentRef) -> Option<BlockId> {
        self.owners.get(&component).copied()
    }

    // ── Convenience add-and-attach helpers ──────────────────

    pub fn add_block_variable(
        &mut self,
        block: BlockId,
        variable: Variable,
    ) -> Result<VariableId, ModelError> {
        let id = self.add_variable(variable)?;
        self.attach(block, ComponentRef::Variable(id))?;
        Ok(id)
    }

    pub fn add_block_constraint_expr(
        &mut self,
        block: BlockId,
        constraint: ConstraintExpr,
    ) -> Result<ConstraintId, ModelError> {
        let id = self.add_constraint_expr(constraint)?;
        self.attach(block, ComponentRef::Constraint(id))?;
        Ok(id)
    }

    pub fn add_block_objective(
        &mut self,
        block: BlockId,
        sense: Sense,
        expr: Expr,
    ) -> Result<ObjectiveId, ModelError> {
        let id = self.add_objective(Objective::new(sense, expr))?;
        self.attach(block, ComponentRef::Objective(id))?;
        Ok(id)
    }

    pub fn add_block_complementarity(
        &mut self,
        block: BlockId,
        first: Expr,
        second: Expr,
    ) -> Result<ComplementarityId, ModelError> {
        let id = ComplementarityId::new(self.next_complementarity_id);
        self.next_complementarity_id += 1;
        self.complementarities
            .insert(id, Complementarity::new(first, second));
        self.attach(block, ComponentRef::Complementarity(id))?;
        Ok(id)
    }

    pub fn add_block_disjunction(
        &mut self,
        block: BlockId,
        arms: Vec<Vec<ConstraintExpr>>,
    ) -> Result<DisjunctionId, ModelError> {
        let id = DisjunctionId::new(self.next_disjunction_id);
        self.next_disjunction_id += 1;
        self.disjunctions.insert(id, Disjunction::new(arms));
        self.attach(block, ComponentRef::Disjunction(id))?;
        Ok(id)
    }

    // ── Index sets and variable families ────────────────────

    /// Add a named index set.
    pub fn add_index_set(&mut self, name: &str, elements: Vec<String>) -> IndexSetId {
        let id = IndexSetId::new(self.next_index_set_id);
        self.next_index_set_id += 1;
        self.index_sets.insert(
            id,
            IndexSet {
                name: name.to_string(),
                elements,
            },
        );
        id
    }

    /// Get an index set by ID.
    pub fn index_set(&self, id: IndexSetId) -> Result<&IndexSet, ModelError> {
        self.index_sets
            .get(&id)
            .ok_or(ModelError::InvalidIndexSetId(id))
    }

    /// Mint one variable per index-set element, named `base[element]`,
    /// optionally attached to a block.
    pub fn add_variable_family(
        &mut self,
        block: Option<BlockId>,
        set: IndexSetId,
        template: Variable,
        base_name: &str,
    ) -> Result<Vec<VariableId>, ModelError> {
        let elements: Vec<String> = self.index_set(set)?.elements.clone();
        let mut ids = Vec::with_capacity(elements.len());
        for element in &elements {
            let id = self.add_variable(template)?;
            self.set_variable_name(id, format!("{base_name}[{element}]"))?;
            if let Some(block) = block {
                self.attach(block, ComponentRef::Variable(id))?;
            }
            ids.push(id);
        }
        Ok(ids)
    }

    // ── Component activation ────────────────────────────────

    /// Check a component's own activation flag.
    ///
    /// Variables report their individual flag; index sets are always
    /// considered active (they carry no flag).
    pub fn component_is_active(&self, component: ComponentRef) -> Result<bool, ModelError> {
        self.ensure_component_exists(component)?;
        Ok(match component {
            ComponentRef::Variable(id) => self.variables[&id].is_active,
            ComponentRef::Constraint(id) => self.constraints[&id].is_active,
            ComponentRef::Objective(id) => self.objectives[&id].is_active,
            ComponentRef::IndexSet(_) => true,
            ComponentRef::Complementarity(id) => self.complementarities[&id].is_active,
            ComponentRef::Disjunction(id) => self.disjunctions[&id].is_active,
            ComponentRef::Block(id) => self.blocks[&id].is_active,
        })
    }

    /// Activate a component through the generic component interface.
    ///
    /// Variable and index-set containers are rejected with
    /// [`ModelError::NotActivatable`]; callers that restore structure must
    /// filter those kinds out before calling this.
    pub fn activate_component(&mut self, component: ComponentRef) -> Result<(), ModelError> {
        self.set_component_active(component, true)
    }

    /// Deactivate a component through the generic component interface.
    pub fn deactivate_component(&mut self, component: ComponentRef) -> Result<(), ModelError> {
        self.set_component_active(component, false)
    }

    fn set_component_active(
        &mut self,
        component: ComponentRef,
        active: bool,
    ) -> Result<(), ModelError> {
        self.ensure_component_exists(component)?;
        if !component.is_activatable() {
            return Err(ModelError::NotActivatable(component));
        }
        match component {
            ComponentRef::Constraint(id) => {
                if let Some(c) = self.constraints.get_mut(&id) {
                    c.is_active = active;
                }
            }
            ComponentRef::Objective(id) => {
                if let Some(o) = self.objectives.get_mut(&id) {
                    o.is_active = active;
                }
            }
            ComponentRef::Complementarity(id) => {
                if let Some(c) = self.complementarities.get_mut(&id) {
                    c.is_active = active;
                }
            }
            ComponentRef::Disjunction(id) => {
                if let Some(d) = self.disjunctions.get_mut(&id) {
                    d.is_active = active;
                }
            }
            ComponentRef::Block(id) => {
                if active {
                    self.activate_block(id)?;
                } else {
                    self.deactivate_block(id)?;
                }
            }
            ComponentRef::Variable(_) | ComponentRef::IndexSet(_) => unreachable!(),
        }
        Ok(())
    }

    // ── Block activation cascade ────────────────────────────

    /// Deactivate a block and cascade to its logical members.
    ///
    /// Member constraints, objectives, complementarities, disjunctions, and
    /// nested blocks are deactivated; member variables and index sets keep
    /// their own state.
    pub fn deactivate_block(&mut self, id: BlockId) -> Result<(), ModelError> {
        self.cascade_block(id, false)
    }

    /// Activate a block and cascade to its logical members.
    pub fn activate_block(&mut self, id: BlockId) -> Result<(), ModelError> {
        self.cascade_block(id, true)
    }

    fn cascade_block(&mut self, id: BlockId, active: bool) -> Result<(), ModelError> {
        let members = {
            let block = self
                .blocks
                .get_mut(&id)
                .ok_or(ModelError::InvalidBlockId(id))?;
            block.is_active = active;
            block.members.clone()
        };
        for member in members {
            if member.is_activatable() {
                self.set_component_active(member, active)?;
            }
        }
        tracing::debug!(
            component = "model",
            operation = if active { "activate_block" } else { "deactivate_block" },
            status = "success",
            block_id = id.inner(),
            "Toggled block activation"
        );
        Ok(())
    }

    /// A component is effectively active when its own flag and every
    /// enclosing block's flag are set.
    pub fn is_effectively_active(&self, component: ComponentRef) -> Result<bool, ModelError> {
        if !self.component_is_active(component)? {
            return Ok(false);
        }
        let mut current = self.owner_of(component);
        while let Some(block_id) = current {
            let block = self.block(block_id)?;
            if !block.is_active {
                return Ok(false);
            }
            current = self.owner_of(ComponentRef::Block(block_id));
        }
        Ok(true)
    }
}
