pub mod classify;
pub mod payload;
pub mod selection;
pub mod transcript;

pub use classify::{Classification, SkipReason, classify, should_render};
pub use payload::{DisplayType, ResponsePayload};
pub use selection::SourceSelectionSet;
pub use transcript::{ChatMessage, Transcript};

/// Identifier of an ingested piece of course content.
pub type ContentId = i64;

/// Identifier of the user on whose behalf queries are issued.
pub type UserId = i64;
