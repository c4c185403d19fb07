// Domain layer: plotting models and ports. Concrete storage/config live under config/.

pub mod model;
pub mod ports;
