// Adapters layer: concrete backing stores for the ListingStore port.

pub mod memory;
pub mod rest;
