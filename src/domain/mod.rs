// Domain layer: cinema models and the ports the aggregation core talks through.

pub mod model;
pub mod ports;
