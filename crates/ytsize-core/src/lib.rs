//! Shared infrastructure used by every `ytsize-*` crate: a fixed error-code
//! taxonomy, and a typed event-listener system each component uses for
//! observability instead of ad-hoc string-keyed emitters.

pub mod error;
pub mod events;
pub mod url_safety;

pub use error::CoreErrorCode;
pub use events::{EventListener, EventListeners, ResilienceEvent};
pub use url_safety::{validate_youtube_url, UrlValidationError};
