pub mod panic;
pub mod telemetry;

pub use panic::*;
pub use telemetry::*;
