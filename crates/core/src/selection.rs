//! Three mutually exclusive product slots for the order being built.
//!
//! A product held by one slot is disabled in the option lists of the other two
//! slots. The slot that holds it always keeps it selectable.

use serde::Serialize;
use tracing::debug;

use crate::domain::product::ProductId;
use crate::errors::DomainError;

pub const SLOT_COUNT: usize = 3;

/// Advisory cap shown by the selected-count indicator.
pub const SELECTION_CAP: usize = 3;

/// One-based slot position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub const FIRST: Self = Self(1);
    pub const SECOND: Self = Self(2);
    pub const THIRD: Self = Self(3);

    pub fn all() -> [Self; SLOT_COUNT] {
        [Self::FIRST, Self::SECOND, Self::THIRD]
    }

    pub fn get(self) -> usize {
        self.0
    }

    fn offset(self) -> usize {
        self.0 - 1
    }
}

impl TryFrom<usize> for SlotIndex {
    type Error = DomainError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if (1..=SLOT_COUNT).contains(&index) {
            Ok(Self(index))
        } else {
            Err(DomainError::SlotOutOfRange { index })
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub index: SlotIndex,
    pub value: Option<ProductId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionState {
    pub product: ProductId,
    pub disabled: bool,
}

/// Option list for every slot, in slot order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionStates {
    pub slots: Vec<SlotOptions>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotOptions {
    pub index: SlotIndex,
    pub options: Vec<OptionState>,
}

impl OptionStates {
    pub fn for_slot(&self, index: SlotIndex) -> Option<&SlotOptions> {
        self.slots.iter().find(|slot| slot.index == index)
    }

    pub fn is_disabled(&self, index: SlotIndex, product: &ProductId) -> bool {
        self.for_slot(index)
            .and_then(|slot| slot.options.iter().find(|option| &option.product == product))
            .map(|option| option.disabled)
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectionIndicator {
    pub count: usize,
    pub cap: usize,
    /// Visual warning only; the count is never rejected.
    pub over_cap: bool,
}

impl SelectionIndicator {
    pub fn new(count: usize) -> Self {
        Self { count, cap: SELECTION_CAP, over_cap: count > SELECTION_CAP }
    }

    pub fn label(&self) -> String {
        format!("{} / {} selected", self.count, self.cap)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionManager {
    slots: [Option<ProductId>; SLOT_COUNT],
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or clears a slot and returns the number of filled slots.
    ///
    /// A product already held by a different slot is refused and the slot keeps
    /// its previous value, so no two slots ever share a product.
    pub fn select_slot(&mut self, index: SlotIndex, product: Option<ProductId>) -> usize {
        let product = product.filter(|value| !value.as_str().trim().is_empty());

        if let Some(candidate) = &product {
            if let Some(holder) = self.holder_of(candidate) {
                if holder != index {
                    debug!(
                        event_name = "selection.slot.conflict",
                        slot = index.get(),
                        holder = holder.get(),
                        product = %candidate,
                        "product already selected in another slot"
                    );
                    return self.selected_count();
                }
            }
        }

        self.slots[index.offset()] = product;
        self.selected_count()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    pub fn value(&self, index: SlotIndex) -> Option<&ProductId> {
        self.slots[index.offset()].as_ref()
    }

    pub fn slots(&self) -> Vec<Slot> {
        SlotIndex::all()
            .into_iter()
            .map(|index| Slot { index, value: self.value(index).cloned() })
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Filled slot values in slot order.
    pub fn selected_items(&self) -> Vec<ProductId> {
        self.slots.iter().flatten().cloned().collect()
    }

    pub fn indicator(&self) -> SelectionIndicator {
        SelectionIndicator::new(self.selected_count())
    }

    pub fn compute_option_states(&self, catalog: &[ProductId]) -> OptionStates {
        let slots = SlotIndex::all()
            .into_iter()
            .map(|index| SlotOptions {
                index,
                options: catalog
                    .iter()
                    .map(|product| OptionState {
                        product: product.clone(),
                        disabled: self.held_elsewhere(product, index),
                    })
                    .collect(),
            })
            .collect();

        OptionStates { slots }
    }

    fn holder_of(&self, product: &ProductId) -> Option<SlotIndex> {
        SlotIndex::all().into_iter().find(|index| self.value(*index) == Some(product))
    }

    fn held_elsewhere(&self, product: &ProductId, index: SlotIndex) -> bool {
        SlotIndex::all()
            .into_iter()
            .filter(|other| *other != index)
            .any(|other| self.value(other) == Some(product))
    }
}
