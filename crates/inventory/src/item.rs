//! Inventory item nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labstock_core::{Entity, ItemId};
use labstock_units::Quantity;

/// One node in a sample hierarchy: a sample, subsample, or container.
///
/// Parent/child links are stored as identifiers, never as object
/// references; the owning [`crate::InventoryHierarchy`] arena resolves them.
/// Items are never erased — retirement is a soft delete that keeps the
/// historical quantity readable while excluding the item from live reads
/// and conservation sums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    quantity: Quantity,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    retired: bool,
    created_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Create a leaf item holding its quantity directly.
    pub fn leaf(
        id: ItemId,
        name: impl Into<String>,
        quantity: Quantity,
        parent: Option<ItemId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            parent,
            children: Vec::new(),
            retired: false,
            created_at,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Child identifiers in insertion order, retired ones included.
    pub fn child_ids(&self) -> &[ItemId] {
        &self.children
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
    }

    pub(crate) fn push_child(&mut self, child: ItemId) {
        self.children.push(child);
    }

    pub(crate) fn retire(&mut self) {
        self.retired = true;
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
