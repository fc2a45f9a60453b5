// Domain layer: entities, derived figures, write rules, ports and read shapes.
// No storage or HTTP types here.

pub mod derived;
pub mod model;
pub mod ports;
pub mod rules;
pub mod views;
