// Domain layer: models and ports (interfaces). No dependencies on the
// pipeline stages or adapters.

pub mod model;
pub mod ports;
