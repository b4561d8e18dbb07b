//! Local mirror of the WhoPaid data model.
//!
//! Events, participants and payments are kept as a single JSON document in
//! a [`Storage`] slot, independently of the server database. Validation and
//! settlement reuse the engine rules, so both stores agree on shares.

pub use error::{MirrorError, Result};
pub use model::{LocalEvent, LocalParticipant, LocalPayment};
pub use storage::{FileStorage, MemoryStorage, STORAGE_KEY, Storage};
pub use store::{EventPatch, Mirror, PaymentLocation, backup_file_name};

mod error;
mod model;
mod storage;
mod store;
