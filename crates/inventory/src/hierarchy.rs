//! The sample hierarchy snapshot.
//!
//! Items live in an arena keyed by identifier; parent/child links are plain
//! identifiers, so there are no reference cycles and a snapshot clones
//! cheaply. Every mutation primitive returns a **new** snapshot — the
//! original is never touched, and a caller observes either the pre-state or
//! the fully-applied post-state, never anything in between.

use core::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use labstock_core::{
    Aggregate, AggregateRoot, EngineError, EngineResult, HierarchyId, ItemId,
};
use labstock_units::{arithmetic, Quantity};

use crate::delta::HierarchyDelta;
use crate::item::InventoryItem;
use crate::ops::StructuralCommand;

/// One sample aggregate's tree of items, as a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryHierarchy {
    id: HierarchyId,
    items: BTreeMap<ItemId, InventoryItem>,
    version: u64,
}

impl InventoryHierarchy {
    pub fn new(id: HierarchyId) -> Self {
        Self {
            id,
            items: BTreeMap::new(),
            version: 0,
        }
    }

    /// Look up an item, retired ones included (historical reads).
    pub fn item(&self, id: ItemId) -> EngineResult<&InventoryItem> {
        self.items
            .get(&id)
            .ok_or_else(|| EngineError::item_not_found(id.to_string()))
    }

    /// Look up a live (non-retired) item.
    pub fn live_item(&self, id: ItemId) -> EngineResult<&InventoryItem> {
        let item = self.item(id)?;
        if item.is_retired() {
            return Err(EngineError::item_not_found(id.to_string()));
        }
        Ok(item)
    }

    pub fn quantity(&self, id: ItemId) -> EngineResult<Quantity> {
        Ok(self.live_item(id)?.quantity())
    }

    pub fn parent(&self, id: ItemId) -> EngineResult<Option<ItemId>> {
        Ok(self.live_item(id)?.parent())
    }

    /// Live children of a live item, in insertion order.
    pub fn children(&self, id: ItemId) -> EngineResult<Vec<ItemId>> {
        let item = self.live_item(id)?;
        Ok(item
            .child_ids()
            .iter()
            .copied()
            .filter(|child| {
                self.items
                    .get(child)
                    .is_some_and(|c| !c.is_retired())
            })
            .collect())
    }

    pub fn is_leaf(&self, id: ItemId) -> EngineResult<bool> {
        Ok(self.children(id)?.is_empty())
    }

    /// Live ancestor chain, nearest parent first.
    pub fn ancestors(&self, id: ItemId) -> EngineResult<Vec<ItemId>> {
        let mut chain = Vec::new();
        let mut current = self.live_item(id)?.parent();
        while let Some(ancestor_id) = current {
            let ancestor = self.live_item(ancestor_id)?;
            chain.push(ancestor_id);
            current = ancestor.parent();
        }
        Ok(chain)
    }

    /// Number of live items in the snapshot.
    pub fn live_count(&self) -> usize {
        self.items.values().filter(|i| !i.is_retired()).count()
    }

    /// Insert a new node, returning the updated snapshot.
    ///
    /// The id must be unused, the parent (if any) must be live, and the
    /// quantity must be committable (non-negative).
    pub fn insert(&self, item: InventoryItem) -> EngineResult<Self> {
        if self.items.contains_key(&item.id_typed()) {
            return Err(EngineError::conflict(format!(
                "item already exists: {}",
                item.id_typed()
            )));
        }
        if let Some(parent_id) = item.parent() {
            self.live_item(parent_id)?;
        }
        Quantity::committed(item.quantity().magnitude(), item.quantity().unit())?;

        let mut next = self.clone();
        next.apply(&HierarchyDelta::item_inserted(item));
        Ok(next)
    }

    /// Install a new quantity value on a live item, returning the updated
    /// snapshot. The only quantity mutation primitive.
    pub fn replace(
        &self,
        id: ItemId,
        new_quantity: Quantity,
        occurred_at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        let current = self.quantity(id)?;
        if new_quantity.unit().category() != current.unit().category() {
            return Err(EngineError::incompatible_units(
                current.unit().id(),
                new_quantity.unit().id(),
            ));
        }
        if new_quantity.magnitude() < Decimal::ZERO {
            return Err(EngineError::invalid_quantity(format!(
                "cannot commit negative quantity {new_quantity} to item {id}"
            )));
        }

        let mut next = self.clone();
        next.apply(&HierarchyDelta::quantity_replaced(id, new_quantity, occurred_at));
        Ok(next)
    }

    /// Soft-delete a live item, returning the updated snapshot.
    pub fn retire(&self, id: ItemId, occurred_at: DateTime<Utc>) -> EngineResult<Self> {
        self.live_item(id)?;
        let mut next = self.clone();
        next.apply(&HierarchyDelta::item_retired(id, occurred_at));
        Ok(next)
    }

    /// Check the conservation invariant at one node: the sum of live
    /// children's quantities, converted to the parent's unit, equals the
    /// parent's recorded quantity. Leaves are trivially conserved.
    pub fn is_conserved(&self, id: ItemId) -> EngineResult<bool> {
        let recorded = self.quantity(id)?;
        let children = self.children(id)?;
        if children.is_empty() {
            return Ok(true);
        }
        let mut total = Quantity::zero(recorded.unit());
        for child in children {
            total = arithmetic::add(total, self.quantity(child)?)?;
        }
        Ok(arithmetic::compare(total, recorded)? == Ordering::Equal)
    }

    /// Check the conservation invariant at every live non-leaf node.
    pub fn all_conserved(&self) -> EngineResult<bool> {
        for (id, item) in &self.items {
            if item.is_retired() {
                continue;
            }
            if !self.is_conserved(*id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl AggregateRoot for InventoryHierarchy {
    type Id = HierarchyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for InventoryHierarchy {
    type Command = StructuralCommand;
    type Delta = HierarchyDelta;
    type Error = EngineError;

    fn apply(&mut self, delta: &Self::Delta) {
        match delta {
            HierarchyDelta::QuantityReplaced {
                item_id,
                new_quantity,
                ..
            } => {
                if let Some(item) = self.items.get_mut(item_id) {
                    item.set_quantity(*new_quantity);
                }
            }
            HierarchyDelta::ItemInserted { item } => {
                if let Some(parent_id) = item.parent() {
                    if let Some(parent) = self.items.get_mut(&parent_id) {
                        parent.push_child(item.id_typed());
                    }
                }
                self.items.insert(item.id_typed(), item.clone());
            }
            HierarchyDelta::ItemRetired { item_id, .. } => {
                if let Some(item) = self.items.get_mut(item_id) {
                    item.retire();
                }
            }
        }

        // Deterministic version tracking: +1 per applied delta.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Delta>, Self::Error> {
        match command {
            StructuralCommand::Split(cmd) => self.handle_split(cmd),
            StructuralCommand::Duplicate(cmd) => self.handle_duplicate(cmd),
            StructuralCommand::Transfer(cmd) => self.handle_transfer(cmd),
        }
    }
}
