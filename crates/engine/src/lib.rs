//! Domain and storage engine for WhoPaid.
//!
//! The engine owns the three persisted entities (events, participants and
//! payments), the settlement calculator and every storage operation the HTTP
//! layer exposes. All operations go through [`Engine`].

pub use error::EngineError;
pub use events::{Event, EventDraft};
pub use ops::{Engine, EngineBuilder};
pub use participants::Participant;
pub use payments::Payment;
pub use settlement::{ParticipantShare, Settlement};

mod error;
mod events;
mod ops;
mod participants;
mod payments;
pub mod settlement;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
