// Domain layer: status models and the transport port. No HTTP client types leak in here.

pub mod model;
pub mod ports;
