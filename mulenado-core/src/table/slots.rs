//! Carousel slot occupancy
//!
//! Index 0 is the leading slot, where new drinks are loaded. A confirmed
//! slot edge normally advances every drink one index and drops whatever
//! falls off the end.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::order::Drink;
use crate::traits::Direction;

/// Default number of slots on the carousel
pub const DEFAULT_SLOT_COUNT: usize = 10;

/// Which way drinks move along the slot array for one slot of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shift {
    /// Slot `i` moves to `i + 1`; the last slot is dropped
    Advance,
    /// Slot `i` moves to `i - 1`; slot 0 is dropped
    Retreat,
}

/// How rotation direction maps onto slot shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlotShift {
    /// Every rotation advances, whichever way the motor turns
    #[default]
    DirectionAgnostic,
    /// Counter-clockwise advances, clockwise retreats
    FollowDirection,
}

impl SlotShift {
    pub fn for_direction(self, direction: Direction) -> Shift {
        match (self, direction) {
            (SlotShift::FollowDirection, Direction::Clockwise) => Shift::Retreat,
            _ => Shift::Advance,
        }
    }
}

/// Fixed array of carousel slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotArray<const N: usize> {
    slots: [Option<Drink>; N],
}

impl<const N: usize> Default for SlotArray<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlotArray<N> {
    /// All slots empty
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Snapshot of slot `index`
    pub fn get(&self, index: usize) -> Option<Drink> {
        self.slots.get(index).copied().flatten()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Drink> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Any slot holds a drink
    pub fn is_occupied(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Put `drink` in the leading slot, returning what was there
    pub fn load_front(&mut self, drink: Drink) -> Option<Drink> {
        match self.slots.first_mut() {
            Some(front) => front.replace(drink),
            None => Some(drink),
        }
    }

    /// Move every drink one slot, returning the drink pushed off the end
    pub fn shift(&mut self, shift: Shift) -> Option<Drink> {
        if N == 0 {
            return None;
        }
        match shift {
            Shift::Advance => {
                let dropped = self.slots[N - 1].take();
                self.slots.rotate_right(1);
                dropped
            }
            Shift::Retreat => {
                let dropped = self.slots[0].take();
                self.slots.rotate_left(1);
                dropped
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<Drink>> {
        self.slots.iter()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Option<Drink>] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderId;
    use proptest::prelude::*;

    fn drink(id: u32) -> Drink {
        Drink::new(OrderId(id))
    }

    #[test]
    fn test_load_front_returns_displaced() {
        let mut slots = SlotArray::<4>::new();
        assert_eq!(slots.load_front(drink(1)), None);
        assert_eq!(slots.load_front(drink(2)).map(|d| d.id), Some(OrderId(1)));
        assert_eq!(slots.get(0).map(|d| d.id), Some(OrderId(2)));
    }

    #[test]
    fn test_advance_drops_trailing() {
        let mut slots = SlotArray::<3>::new();
        slots.load_front(drink(1));
        assert_eq!(slots.shift(Shift::Advance), None);
        assert_eq!(slots.get(0), None);
        assert_eq!(slots.get(1).map(|d| d.id), Some(OrderId(1)));

        slots.shift(Shift::Advance);
        let dropped = slots.shift(Shift::Advance);
        assert_eq!(dropped.map(|d| d.id), Some(OrderId(1)));
        assert!(!slots.is_occupied());
    }

    #[test]
    fn test_retreat_drops_leading() {
        let mut slots = SlotArray::<3>::new();
        slots.load_front(drink(1));
        slots.shift(Shift::Advance);
        slots.shift(Shift::Retreat);
        assert_eq!(slots.get(0).map(|d| d.id), Some(OrderId(1)));
        assert_eq!(slots.shift(Shift::Retreat).map(|d| d.id), Some(OrderId(1)));
        assert_eq!(slots.occupied_count(), 0);
    }

    #[test]
    fn test_slot_shift_mapping() {
        use Direction::*;
        assert_eq!(SlotShift::DirectionAgnostic.for_direction(Clockwise), Shift::Advance);
        assert_eq!(
            SlotShift::DirectionAgnostic.for_direction(CounterClockwise),
            Shift::Advance
        );
        assert_eq!(SlotShift::FollowDirection.for_direction(Clockwise), Shift::Retreat);
        assert_eq!(
            SlotShift::FollowDirection.for_direction(CounterClockwise),
            Shift::Advance
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let mut slots = SlotArray::<2>::new();
        assert_eq!(slots.get(5), None);
        assert!(slots.get_mut(5).is_none());
    }

    proptest! {
        #[test]
        fn prop_n_advances_clear_carousel(loaded in proptest::collection::vec(any::<bool>(), 10)) {
            let mut slots = SlotArray::<10>::new();
            for (i, occupied) in loaded.iter().enumerate() {
                slots.shift(Shift::Advance);
                if *occupied {
                    slots.load_front(drink(i as u32));
                }
            }
            let mut dropped = 0;
            for _ in 0..10 {
                if slots.shift(Shift::Advance).is_some() {
                    dropped += 1;
                }
            }
            prop_assert!(!slots.is_occupied());
            prop_assert_eq!(dropped, loaded.iter().filter(|o| **o).count());
        }
    }
}
