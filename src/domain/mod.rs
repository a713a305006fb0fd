// Domain layer: listing shapes, predicates and the ports the core talks through.

pub mod model;
pub mod ports;
pub mod predicate;
