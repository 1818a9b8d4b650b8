//! Pending order queue

use heapless::Deque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::order::Drink;

/// Orders waiting to be loaded onto the carousel
pub const QUEUE_CAPACITY: usize = 16;

/// Which queued order is loaded next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QueueOrder {
    /// Most recent order first
    #[default]
    Lifo,
    /// Oldest order first
    Fifo,
}

/// Bounded queue of accepted drinks
#[derive(Debug, Clone)]
pub struct PendingQueue {
    drinks: Deque<Drink, QUEUE_CAPACITY>,
    order: QueueOrder,
}

impl PendingQueue {
    pub const fn new(order: QueueOrder) -> Self {
        Self {
            drinks: Deque::new(),
            order,
        }
    }

    /// Append a drink; hands it back if the queue is full
    pub fn push(&mut self, drink: Drink) -> Result<(), Drink> {
        self.drinks.push_back(drink)
    }

    /// Remove the next drink according to the queue order
    pub fn pop(&mut self) -> Option<Drink> {
        match self.order {
            QueueOrder::Lifo => self.drinks.pop_back(),
            QueueOrder::Fifo => self.drinks.pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        self.drinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drinks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.drinks.is_full()
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderId;

    fn ids(queue: &mut PendingQueue) -> heapless::Vec<u32, QUEUE_CAPACITY> {
        core::iter::from_fn(|| queue.pop()).map(|d| d.id.0).collect()
    }

    #[test]
    fn test_lifo_order() {
        let mut queue = PendingQueue::new(QueueOrder::Lifo);
        for id in 1..=3 {
            queue.push(Drink::new(OrderId(id))).unwrap();
        }
        assert_eq!(ids(&mut queue).as_slice(), &[3, 2, 1]);
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = PendingQueue::new(QueueOrder::Fifo);
        for id in 1..=3 {
            queue.push(Drink::new(OrderId(id))).unwrap();
        }
        assert_eq!(ids(&mut queue).as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_full_queue_rejects() {
        let mut queue = PendingQueue::new(QueueOrder::default());
        for id in 0..QUEUE_CAPACITY as u32 {
            queue.push(Drink::new(OrderId(id))).unwrap();
        }
        assert!(queue.is_full());
        let rejected = queue.push(Drink::new(OrderId(99)));
        assert_eq!(rejected.map_err(|d| d.id), Err(OrderId(99)));
        assert_eq!(queue.len(), QUEUE_CAPACITY);
    }
}
