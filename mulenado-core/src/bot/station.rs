//! Stations bound to carousel offsets

use alloc::boxed::Box;

use crate::traits::Dispenser;

/// A dispenser parked in front of carousel slot `offset`
pub struct Station<'d> {
    pub offset: u8,
    pub dispenser: Box<dyn Dispenser + 'd>,
}

impl<'d> Station<'d> {
    pub fn new(offset: u8, dispenser: impl Dispenser + 'd) -> Self {
        Self {
            offset,
            dispenser: Box::new(dispenser),
        }
    }

    pub fn name(&self) -> &'static str {
        self.dispenser.name()
    }
}

/// Offsets must be distinct and inside the carousel
pub fn offsets_valid(stations: &[Station<'_>], slot_count: usize) -> bool {
    stations.iter().enumerate().all(|(i, station)| {
        (station.offset as usize) < slot_count
            && stations[..i].iter().all(|other| other.offset != station.offset)
    })
}
