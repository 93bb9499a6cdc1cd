// Domain layer: cost data model and the ports (interfaces) the driver talks through.

pub mod model;
pub mod ports;
