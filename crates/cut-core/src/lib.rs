pub mod accessor;
pub mod bridge;
pub mod cut;
pub mod decision;
pub mod engine;
pub mod error;
pub mod eval;
pub mod flags;
pub mod object;
pub mod trigger;

mod crosstalk;

pub use accessor::{FieldAccessor, SENTINEL, is_sentinel};
pub use crosstalk::CrossTalk;
pub use decision::{DecisionPayload, EventDecision};
pub use engine::CutEngine;
pub use error::{CoreError, CoreReason, CoreResult};
pub use eval::LeafValues;
pub use flags::FlagMap;
pub use object::{EventObjects, ObjectCollection, ObjectHandle};
pub use trigger::TriggerDecision;
