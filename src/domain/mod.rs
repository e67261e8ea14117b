// Domain layer: customer record model and ports (interfaces).

pub mod model;
pub mod ports;
