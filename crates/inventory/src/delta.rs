//! Hierarchy change records.
//!
//! Every structural operation is expressed as an ordered list of these
//! deltas. The persistence collaborator applies the list inside one
//! transaction; replaying the list over the pre-operation snapshot
//! reproduces the post-operation snapshot exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labstock_core::ItemId;
use labstock_units::Quantity;

use crate::item::InventoryItem;

/// One primitive change to a hierarchy snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HierarchyDelta {
    /// Install a new quantity value on an existing item. The only quantity
    /// mutation primitive; quantities are never edited in place.
    QuantityReplaced {
        item_id: ItemId,
        new_quantity: Quantity,
        occurred_at: DateTime<Utc>,
    },

    /// Insert a new node (full payload, so the delta list is self-contained).
    ItemInserted { item: InventoryItem },

    /// Soft-delete a node. Its historical quantity stays readable.
    ItemRetired {
        item_id: ItemId,
        occurred_at: DateTime<Utc>,
    },
}

impl HierarchyDelta {
    pub fn quantity_replaced(
        item_id: ItemId,
        new_quantity: Quantity,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::QuantityReplaced {
            item_id,
            new_quantity,
            occurred_at,
        }
    }

    pub fn item_inserted(item: InventoryItem) -> Self {
        Self::ItemInserted { item }
    }

    pub fn item_retired(item_id: ItemId, occurred_at: DateTime<Utc>) -> Self {
        Self::ItemRetired {
            item_id,
            occurred_at,
        }
    }

    /// When the change happened (the originating command's timestamp).
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            HierarchyDelta::QuantityReplaced { occurred_at, .. }
            | HierarchyDelta::ItemRetired { occurred_at, .. } => *occurred_at,
            HierarchyDelta::ItemInserted { item } => item.created_at(),
        }
    }

    /// Stable type tag, useful for persistence routing and logs.
    pub fn delta_type(&self) -> &'static str {
        match self {
            HierarchyDelta::QuantityReplaced { .. } => "inventory.quantity.replaced",
            HierarchyDelta::ItemInserted { .. } => "inventory.item.inserted",
            HierarchyDelta::ItemRetired { .. } => "inventory.item.retired",
        }
    }
}
