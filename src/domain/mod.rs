// Domain layer: request model and the ports (cache service, configuration) the core depends on.

pub mod model;
pub mod ports;
