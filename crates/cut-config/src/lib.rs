pub mod cut;
pub mod logging;
pub mod selection;
pub mod validate;

pub use cut::{CutSpec, Threshold};
pub use logging::{LogFormat, LoggingConfig};
pub use selection::{SelectionConfig, TriggerConfig};
