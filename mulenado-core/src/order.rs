//! Drink orders
//!
//! A drink is a set of per-ingredient process records. Each station owns one
//! ingredient and marks its record done once it has acted on the drink.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier assigned when an order is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(pub u32);

impl OrderId {
    /// The id that follows this one (wraps)
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Progress of one ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Process {
    /// Station has finished this ingredient
    pub done: bool,
    /// Units to dispense
    pub quantity: u16,
    /// Optional duration hint for the station (ms)
    pub timing_ms: Option<u32>,
}

impl Default for Process {
    fn default() -> Self {
        Self {
            done: false,
            quantity: 1,
            timing_ms: None,
        }
    }
}

/// Ingredients the carousel knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ingredient {
    Cup,
    GingerBeer,
    Vodka,
    Lime,
    Ice,
    Stir,
}

impl Ingredient {
    /// Every ingredient, in recipe order
    pub const ALL: [Ingredient; 6] = [
        Ingredient::Cup,
        Ingredient::GingerBeer,
        Ingredient::Vodka,
        Ingredient::Lime,
        Ingredient::Ice,
        Ingredient::Stir,
    ];
}

/// One drink in transit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Drink {
    pub id: OrderId,
    pub cup: Process,
    pub ginger_beer: Process,
    pub vodka: Process,
    pub lime: Process,
    pub ice: Process,
    pub stir: Process,
}

impl Drink {
    /// A fresh drink with every process pending
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            cup: Process::default(),
            ginger_beer: Process::default(),
            vodka: Process::default(),
            lime: Process::default(),
            ice: Process::default(),
            stir: Process::default(),
        }
    }

    pub fn process(&self, ingredient: Ingredient) -> &Process {
        match ingredient {
            Ingredient::Cup => &self.cup,
            Ingredient::GingerBeer => &self.ginger_beer,
            Ingredient::Vodka => &self.vodka,
            Ingredient::Lime => &self.lime,
            Ingredient::Ice => &self.ice,
            Ingredient::Stir => &self.stir,
        }
    }

    pub fn process_mut(&mut self, ingredient: Ingredient) -> &mut Process {
        match ingredient {
            Ingredient::Cup => &mut self.cup,
            Ingredient::GingerBeer => &mut self.ginger_beer,
            Ingredient::Vodka => &mut self.vodka,
            Ingredient::Lime => &mut self.lime,
            Ingredient::Ice => &mut self.ice,
            Ingredient::Stir => &mut self.stir,
        }
    }

    /// Every ingredient has been handled
    pub fn is_complete(&self) -> bool {
        Ingredient::ALL.iter().all(|&i| self.process(i).done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_defaults() {
        let p = Process::default();
        assert!(!p.done);
        assert_eq!(p.quantity, 1);
        assert_eq!(p.timing_ms, None);
    }

    #[test]
    fn test_drink_completion() {
        let mut drink = Drink::new(OrderId(7));
        assert!(!drink.is_complete());

        for ingredient in Ingredient::ALL {
            drink.process_mut(ingredient).done = true;
        }
        assert!(drink.is_complete());
        assert!(drink.cup.done);
        assert!(drink.stir.done);
    }

    #[test]
    fn test_process_addressing() {
        let mut drink = Drink::new(OrderId(1));
        drink.process_mut(Ingredient::Vodka).quantity = 2;
        assert_eq!(drink.vodka.quantity, 2);
        assert_eq!(drink.process(Ingredient::Lime).quantity, 1);
    }

    #[test]
    fn test_order_id_wraps() {
        assert_eq!(OrderId(1).next(), OrderId(2));
        assert_eq!(OrderId(u32::MAX).next(), OrderId(0));
    }
}
