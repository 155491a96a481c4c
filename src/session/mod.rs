//! Session lifecycle: configuration, typed event dispatch, readiness, and
//! the greeting/transcript/interrupt glue that sits between the remote
//! voice-live service and the two media pipelines.

mod controller;
mod events;
mod readiness;
mod transport;

pub use controller::SessionController;
pub use events::{ClientEvent, ServerEvent};
pub use readiness::Readiness;
pub use transport::SessionTransport;
