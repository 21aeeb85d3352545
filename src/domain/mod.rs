// Domain layer: records the engine works on and the ports (interfaces) around it.

pub mod model;
pub mod ports;
pub mod report;
