//! Structural operations: Split, Duplicate, Transfer.
//!
//! Each operation is a single synchronous transformation of a caller-supplied
//! snapshot: `handle` validates every precondition and decides the full
//! ordered delta list, `execute` applies it to a fresh clone. A failure
//! aborts before the first delta exists, so no partial state is ever
//! observable. The engine takes no locks; the caller serializes writers per
//! sample aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use labstock_core::{Aggregate, AggregateRoot, EngineError, EngineResult, ItemId};
use labstock_units::{arithmetic, Quantity};

use crate::delta::HierarchyDelta;
use crate::hierarchy::InventoryHierarchy;
use crate::item::InventoryItem;

/// Command: split a leaf item into `parts` new sibling leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitItem {
    pub item_id: ItemId,
    pub parts: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: duplicate a leaf item (models acquisition of new material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateItem {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: move `amount` of material between two leaf items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQuantity {
    pub from_id: ItemId,
    pub to_id: ItemId,
    pub amount: Quantity,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuralCommand {
    Split(SplitItem),
    Duplicate(DuplicateItem),
    Transfer(TransferQuantity),
}

impl StructuralCommand {
    pub fn command_type(&self) -> &'static str {
        match self {
            StructuralCommand::Split(_) => "inventory.item.split",
            StructuralCommand::Duplicate(_) => "inventory.item.duplicate",
            StructuralCommand::Transfer(_) => "inventory.quantity.transfer",
        }
    }
}

/// Result of a successful structural operation: the fully-applied snapshot
/// plus the ordered deltas that produced it, for the persistence layer to
/// commit inside one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    pub snapshot: InventoryHierarchy,
    pub deltas: Vec<HierarchyDelta>,
}

/// Decide and apply one structural command against a snapshot.
pub fn execute(
    snapshot: &InventoryHierarchy,
    command: &StructuralCommand,
) -> EngineResult<OperationOutcome> {
    let deltas = snapshot.handle(command)?;
    let mut next = snapshot.clone();
    for delta in &deltas {
        next.apply(delta);
    }
    debug!(
        command = command.command_type(),
        deltas = deltas.len(),
        version = next.version(),
        "structural operation applied"
    );
    Ok(OperationOutcome {
        snapshot: next,
        deltas,
    })
}

pub fn split(
    snapshot: &InventoryHierarchy,
    item_id: ItemId,
    parts: u32,
    occurred_at: DateTime<Utc>,
) -> EngineResult<OperationOutcome> {
    execute(
        snapshot,
        &StructuralCommand::Split(SplitItem {
            item_id,
            parts,
            occurred_at,
        }),
    )
}

pub fn duplicate(
    snapshot: &InventoryHierarchy,
    item_id: ItemId,
    occurred_at: DateTime<Utc>,
) -> EngineResult<OperationOutcome> {
    execute(
        snapshot,
        &StructuralCommand::Duplicate(DuplicateItem {
            item_id,
            occurred_at,
        }),
    )
}

pub fn transfer(
    snapshot: &InventoryHierarchy,
    from_id: ItemId,
    to_id: ItemId,
    amount: Quantity,
    occurred_at: DateTime<Utc>,
) -> EngineResult<OperationOutcome> {
    execute(
        snapshot,
        &StructuralCommand::Transfer(TransferQuantity {
            from_id,
            to_id,
            amount,
            occurred_at,
        }),
    )
}

fn commit(q: Quantity) -> EngineResult<Quantity> {
    Quantity::committed(q.magnitude(), q.unit())
}

impl InventoryHierarchy {
    pub(crate) fn handle_split(&self, cmd: &SplitItem) -> EngineResult<Vec<HierarchyDelta>> {
        let item = self.live_item(cmd.item_id)?;
        if cmd.parts < 2 {
            return Err(EngineError::InvalidSplitFactor(cmd.parts));
        }
        if !self.is_leaf(cmd.item_id)? {
            return Err(EngineError::non_leaf_item(cmd.item_id.to_string()));
        }

        let total = item.quantity();
        let unit = total.unit();
        // Truncate the even share to the unit's minimum precision; the last
        // part takes the exact remainder so the parts always sum to the
        // original quantity.
        let share = (total.magnitude() / Decimal::from(cmd.parts))
            .trunc_with_scale(unit.display_precision());
        let remainder = total.magnitude() - share * Decimal::from(cmd.parts - 1);

        let mut deltas = Vec::with_capacity(cmd.parts as usize + 1);
        for index in 0..cmd.parts {
            let magnitude = if index == cmd.parts - 1 { remainder } else { share };
            let part = Quantity::committed(magnitude, unit)?;
            deltas.push(HierarchyDelta::item_inserted(InventoryItem::leaf(
                ItemId::new(),
                item.name(),
                part,
                item.parent(),
                cmd.occurred_at,
            )));
        }
        deltas.push(HierarchyDelta::item_retired(cmd.item_id, cmd.occurred_at));
        Ok(deltas)
    }

    pub(crate) fn handle_duplicate(
        &self,
        cmd: &DuplicateItem,
    ) -> EngineResult<Vec<HierarchyDelta>> {
        let item = self.live_item(cmd.item_id)?;
        if !self.is_leaf(cmd.item_id)? {
            return Err(EngineError::non_leaf_item(cmd.item_id.to_string()));
        }

        let copy = InventoryItem::leaf(
            ItemId::new(),
            item.name(),
            item.quantity(),
            item.parent(),
            cmd.occurred_at,
        );
        let mut deltas = vec![HierarchyDelta::item_inserted(copy)];

        // New material enters the tree, so every ancestor aggregate grows by
        // the duplicated quantity.
        for ancestor_id in self.ancestors(cmd.item_id)? {
            let grown = arithmetic::add(self.quantity(ancestor_id)?, item.quantity())?;
            deltas.push(HierarchyDelta::quantity_replaced(
                ancestor_id,
                grown,
                cmd.occurred_at,
            ));
        }
        Ok(deltas)
    }

    pub(crate) fn handle_transfer(
        &self,
        cmd: &TransferQuantity,
    ) -> EngineResult<Vec<HierarchyDelta>> {
        let from = self.live_item(cmd.from_id)?;
        let to = self.live_item(cmd.to_id)?;
        if cmd.from_id == cmd.to_id {
            return Err(EngineError::conflict(
                "transfer endpoints must be distinct items",
            ));
        }
        if !self.is_leaf(cmd.from_id)? {
            return Err(EngineError::non_leaf_item(cmd.from_id.to_string()));
        }
        if !self.is_leaf(cmd.to_id)? {
            return Err(EngineError::non_leaf_item(cmd.to_id.to_string()));
        }
        if cmd.amount.is_negative() {
            return Err(EngineError::invalid_quantity(format!(
                "transfer amount cannot be negative: {}",
                cmd.amount
            )));
        }
        // Category compatibility with both endpoints, up front.
        cmd.amount.convert_to(from.quantity().unit())?;
        cmd.amount.convert_to(to.quantity().unit())?;

        if arithmetic::compare(cmd.amount, from.quantity())? == core::cmp::Ordering::Greater {
            return Err(EngineError::insufficient_quantity(
                from.quantity().to_string(),
                cmd.amount.to_string(),
            ));
        }

        let new_from = commit(arithmetic::subtract(from.quantity(), cmd.amount)?)?;
        let new_to = commit(arithmetic::add(to.quantity(), cmd.amount)?)?;
        let mut deltas = vec![
            HierarchyDelta::quantity_replaced(cmd.from_id, new_from, cmd.occurred_at),
            HierarchyDelta::quantity_replaced(cmd.to_id, new_to, cmd.occurred_at),
        ];

        // Keep every parent aggregate conserved: shrink the source chain and
        // grow the destination chain. Shared ancestors net to zero and are
        // left untouched.
        let from_chain = self.ancestors(cmd.from_id)?;
        let to_chain = self.ancestors(cmd.to_id)?;
        for ancestor_id in from_chain.iter().filter(|id| !to_chain.contains(id)) {
            let shrunk = commit(arithmetic::subtract(
                self.quantity(*ancestor_id)?,
                cmd.amount,
            )?)?;
            deltas.push(HierarchyDelta::quantity_replaced(
                *ancestor_id,
                shrunk,
                cmd.occurred_at,
            ));
        }
        for ancestor_id in to_chain.iter().filter(|id| !from_chain.contains(id)) {
            let grown = arithmetic::add(self.quantity(*ancestor_id)?, cmd.amount)?;
            deltas.push(HierarchyDelta::quantity_replaced(
                *ancestor_id,
                grown,
                cmd.occurred_at,
            ));
        }
        Ok(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use labstock_core::HierarchyId;
    use labstock_units::Unit;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn ml(magnitude: Decimal) -> Quantity {
        Quantity::new(magnitude, Unit::Millilitre)
    }

    fn ul(magnitude: Decimal) -> Quantity {
        Quantity::new(magnitude, Unit::Microlitre)
    }

    fn single_leaf(quantity: Quantity) -> (InventoryHierarchy, ItemId) {
        let id = ItemId::new();
        let hierarchy = InventoryHierarchy::new(HierarchyId::new())
            .insert(InventoryItem::leaf(id, "S-1", quantity, None, Utc::now()))
            .unwrap();
        (hierarchy, id)
    }

    /// Sample of 1.5 ml holding two subsamples (999.999 µl + 500.001 µl).
    fn sample_tree() -> (InventoryHierarchy, ItemId, ItemId, ItemId) {
        let root = ItemId::new();
        let sub_a = ItemId::new();
        let sub_b = ItemId::new();
        let now = Utc::now();

        let hierarchy = InventoryHierarchy::new(HierarchyId::new())
            .insert(InventoryItem::leaf(root, "BAC-042", ml(dec!(1.5)), None, now))
            .unwrap()
            .insert(InventoryItem::leaf(
                sub_a,
                "BAC-042.1",
                ul(dec!(999.999)),
                Some(root),
                now,
            ))
            .unwrap()
            .insert(InventoryItem::leaf(
                sub_b,
                "BAC-042.2",
                ul(dec!(500.001)),
                Some(root),
                now,
            ))
            .unwrap();

        (hierarchy, root, sub_a, sub_b)
    }

    fn inserted_quantities(deltas: &[HierarchyDelta]) -> Vec<Quantity> {
        deltas
            .iter()
            .filter_map(|d| match d {
                HierarchyDelta::ItemInserted { item } => Some(item.quantity()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn split_rejects_factor_below_two() {
        let (hierarchy, _, sub_a, _) = sample_tree();
        for parts in [0, 1] {
            let err = split(&hierarchy, sub_a, parts, Utc::now()).unwrap_err();
            assert_eq!(err, EngineError::InvalidSplitFactor(parts));
        }
    }

    #[test]
    fn split_rejects_unknown_item() {
        let (hierarchy, ..) = sample_tree();
        let err = split(&hierarchy, ItemId::new(), 2, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::ItemNotFound(_)));
    }

    #[test]
    fn split_rejects_items_with_subsamples() {
        let (hierarchy, root, ..) = sample_tree();
        let err = split(&hierarchy, root, 2, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::NonLeafItem(_)));
    }

    #[test]
    fn split_of_an_exactly_divisible_quantity_is_even() {
        let (hierarchy, root, sub_a, _) = sample_tree();
        let outcome = split(&hierarchy, sub_a, 7, Utc::now()).unwrap();

        let parts = inserted_quantities(&outcome.deltas);
        assert_eq!(parts.len(), 7);
        for part in &parts {
            assert_eq!(*part, ul(dec!(142.857)));
        }
        let total: Decimal = parts.iter().map(Quantity::magnitude).sum();
        assert_eq!(total, dec!(999.999));

        // The original is retired, the parent total is untouched.
        assert!(matches!(
            outcome.snapshot.quantity(sub_a).unwrap_err(),
            EngineError::ItemNotFound(_)
        ));
        assert_eq!(outcome.snapshot.quantity(root).unwrap(), ml(dec!(1.5)));
        assert!(outcome.snapshot.all_conserved().unwrap());
    }

    #[test]
    fn split_remainder_goes_to_the_last_part() {
        let (hierarchy, _, sub_a, _) = sample_tree();
        let outcome = split(&hierarchy, sub_a, 4, Utc::now()).unwrap();

        let parts = inserted_quantities(&outcome.deltas);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], ul(dec!(249.999)));
        assert_eq!(parts[1], ul(dec!(249.999)));
        assert_eq!(parts[2], ul(dec!(249.999)));
        assert_eq!(parts[3], ul(dec!(250.002)));

        let total: Decimal = parts.iter().map(Quantity::magnitude).sum();
        assert_eq!(total, dec!(999.999));
    }

    #[test]
    fn split_keeps_counts_whole() {
        let (hierarchy, id) = single_leaf(Quantity::new(dec!(10), Unit::Piece));
        let outcome = split(&hierarchy, id, 3, Utc::now()).unwrap();

        let parts = inserted_quantities(&outcome.deltas);
        assert_eq!(
            parts,
            vec![
                Quantity::new(dec!(3), Unit::Piece),
                Quantity::new(dec!(3), Unit::Piece),
                Quantity::new(dec!(4), Unit::Piece),
            ]
        );
    }

    #[test]
    fn duplicate_grows_every_ancestor_aggregate() {
        let (hierarchy, root, sub_a, _) = sample_tree();
        let outcome = duplicate(&hierarchy, sub_a, Utc::now()).unwrap();

        // 1.5 ml + 999.999 µl = 2.499999 ml.
        assert_eq!(
            outcome.snapshot.quantity(root).unwrap(),
            ml(dec!(2.499999))
        );
        assert_eq!(outcome.snapshot.live_count(), hierarchy.live_count() + 1);
        assert!(outcome.snapshot.all_conserved().unwrap());

        let copies = inserted_quantities(&outcome.deltas);
        assert_eq!(copies, vec![ul(dec!(999.999))]);
    }

    #[test]
    fn duplicate_rejects_items_with_subsamples() {
        let (hierarchy, root, ..) = sample_tree();
        let err = duplicate(&hierarchy, root, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::NonLeafItem(_)));
    }

    #[test]
    fn transfer_is_zero_sum_and_keeps_parents_conserved() {
        let (hierarchy, root, sub_a, sub_b) = sample_tree();
        let before = arithmetic::add(
            hierarchy.quantity(sub_a).unwrap(),
            hierarchy.quantity(sub_b).unwrap(),
        )
        .unwrap();

        let outcome =
            transfer(&hierarchy, sub_a, sub_b, ul(dec!(250)), Utc::now()).unwrap();

        assert_eq!(outcome.snapshot.quantity(sub_a).unwrap(), ul(dec!(749.999)));
        assert_eq!(outcome.snapshot.quantity(sub_b).unwrap(), ul(dec!(750.001)));
        // Shared parent nets to zero and is untouched.
        assert_eq!(outcome.snapshot.quantity(root).unwrap(), ml(dec!(1.5)));

        let after = arithmetic::add(
            outcome.snapshot.quantity(sub_a).unwrap(),
            outcome.snapshot.quantity(sub_b).unwrap(),
        )
        .unwrap();
        assert_eq!(before, after);
        // Zero-sum in any common unit, the base unit included.
        assert_eq!(before.in_base_unit().unwrap(), after.in_base_unit().unwrap());
        assert!(outcome.snapshot.all_conserved().unwrap());
    }

    #[test]
    fn transfer_can_empty_the_source() {
        let (hierarchy, _, sub_a, sub_b) = sample_tree();
        let outcome =
            transfer(&hierarchy, sub_a, sub_b, ul(dec!(999.999)), Utc::now()).unwrap();
        assert!(outcome.snapshot.quantity(sub_a).unwrap().is_zero());
        assert_eq!(outcome.snapshot.quantity(sub_b).unwrap(), ul(dec!(1500)));
    }

    #[test]
    fn transfer_rejects_insufficient_quantity() {
        let (hierarchy, _, sub_a, sub_b) = sample_tree();
        let err = transfer(&hierarchy, sub_a, sub_b, ml(dec!(2)), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientQuantity {
                available: "999.999 µl".to_string(),
                requested: "2 ml".to_string(),
            }
        );
        // The supplied snapshot is untouched.
        assert_eq!(hierarchy.quantity(sub_a).unwrap(), ul(dec!(999.999)));
        assert_eq!(hierarchy.quantity(sub_b).unwrap(), ul(dec!(500.001)));
    }

    #[test]
    fn transfer_rejects_negative_amounts() {
        let (hierarchy, _, sub_a, sub_b) = sample_tree();
        let err = transfer(&hierarchy, sub_a, sub_b, ul(dec!(-1)), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuantity(_)));
    }

    #[test]
    fn transfer_rejects_cross_category_amounts() {
        let (hierarchy, _, sub_a, sub_b) = sample_tree();
        let amount = Quantity::new(dec!(1), Unit::Gram);
        let err = transfer(&hierarchy, sub_a, sub_b, amount, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleUnits { .. }));
    }

    #[test]
    fn transfer_rejects_identical_endpoints() {
        let (hierarchy, _, sub_a, _) = sample_tree();
        let err = transfer(&hierarchy, sub_a, sub_a, ul(dec!(1)), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn transfer_across_samples_adjusts_both_parent_chains() {
        let now = Utc::now();
        let root_1 = ItemId::new();
        let root_2 = ItemId::new();
        let leaf_1 = ItemId::new();
        let leaf_2 = ItemId::new();
        let hierarchy = InventoryHierarchy::new(HierarchyId::new())
            .insert(InventoryItem::leaf(root_1, "S-1", ml(dec!(1)), None, now))
            .unwrap()
            .insert(InventoryItem::leaf(leaf_1, "S-1.1", ml(dec!(1)), Some(root_1), now))
            .unwrap()
            .insert(InventoryItem::leaf(root_2, "S-2", ml(dec!(0.5)), None, now))
            .unwrap()
            .insert(InventoryItem::leaf(leaf_2, "S-2.1", ml(dec!(0.5)), Some(root_2), now))
            .unwrap();

        let outcome =
            transfer(&hierarchy, leaf_1, leaf_2, ul(dec!(300)), now).unwrap();

        assert_eq!(outcome.snapshot.quantity(leaf_1).unwrap(), ml(dec!(0.7)));
        assert_eq!(outcome.snapshot.quantity(leaf_2).unwrap(), ml(dec!(0.8)));
        assert_eq!(outcome.snapshot.quantity(root_1).unwrap(), ml(dec!(0.7)));
        assert_eq!(outcome.snapshot.quantity(root_2).unwrap(), ml(dec!(0.8)));
        assert!(outcome.snapshot.all_conserved().unwrap());
    }

    #[test]
    fn deltas_carry_the_command_timestamp() {
        let (hierarchy, _, sub_a, sub_b) = sample_tree();
        let when = Utc::now();

        let split_outcome = split(&hierarchy, sub_a, 3, when).unwrap();
        let duplicate_outcome = duplicate(&hierarchy, sub_a, when).unwrap();
        let transfer_outcome = transfer(&hierarchy, sub_a, sub_b, ul(dec!(10)), when).unwrap();

        for outcome in [split_outcome, duplicate_outcome, transfer_outcome] {
            assert!(!outcome.deltas.is_empty());
            for delta in &outcome.deltas {
                assert_eq!(delta.occurred_at(), when);
            }
        }
    }

    #[test]
    fn replaying_the_deltas_reproduces_the_snapshot() {
        let (hierarchy, _, sub_a, _) = sample_tree();
        let outcome = split(&hierarchy, sub_a, 5, Utc::now()).unwrap();

        let mut replayed = hierarchy.clone();
        for delta in &outcome.deltas {
            replayed.apply(delta);
        }
        assert_eq!(replayed, outcome.snapshot);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 1000,
            ..ProptestConfig::default()
        })]

        /// Property: split parts always sum exactly to the original quantity.
        #[test]
        fn split_conserves_the_total(
            mantissa in 0i64..=i64::MAX,
            scale in 0u32..=28,
            parts in 2u32..=50,
            unit in proptest::sample::select(&[
                Unit::Microlitre,
                Unit::Millilitre,
                Unit::Milligram,
                Unit::Gram,
            ][..]),
        ) {
            let quantity = Quantity::new(Decimal::new(mantissa, scale), unit);
            let (hierarchy, id) = single_leaf(quantity);

            let outcome = split(&hierarchy, id, parts, Utc::now()).unwrap();
            let part_quantities = inserted_quantities(&outcome.deltas);
            prop_assert_eq!(part_quantities.len(), parts as usize);

            let total: Decimal = part_quantities.iter().map(Quantity::magnitude).sum();
            prop_assert_eq!(total, quantity.magnitude());
        }

        /// Property: a transfer never changes the combined total.
        #[test]
        fn transfer_preserves_the_combined_total(
            from_mantissa in 1i64..1_000_000_000,
            amount_fraction in 0.0f64..=1.0,
        ) {
            let from_magnitude = Decimal::new(from_mantissa, 3);
            let amount_mantissa = (from_mantissa as f64 * amount_fraction) as i64;
            let amount = Quantity::new(Decimal::new(amount_mantissa, 3), Unit::Microlitre);

            let now = Utc::now();
            let from_id = ItemId::new();
            let to_id = ItemId::new();
            let hierarchy = InventoryHierarchy::new(HierarchyId::new())
                .insert(InventoryItem::leaf(
                    from_id,
                    "from",
                    Quantity::new(from_magnitude, Unit::Microlitre),
                    None,
                    now,
                ))
                .unwrap()
                .insert(InventoryItem::leaf(
                    to_id,
                    "to",
                    Quantity::new(dec!(0.25), Unit::Millilitre),
                    None,
                    now,
                ))
                .unwrap();

            let before = arithmetic::add(
                hierarchy.quantity(from_id).unwrap(),
                hierarchy.quantity(to_id).unwrap(),
            ).unwrap();

            let outcome = transfer(&hierarchy, from_id, to_id, amount, now).unwrap();

            let after = arithmetic::add(
                outcome.snapshot.quantity(from_id).unwrap(),
                outcome.snapshot.quantity(to_id).unwrap(),
            ).unwrap();
            prop_assert_eq!(before, after);
        }
    }
}
