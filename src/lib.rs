// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod harvest;
pub mod model;
pub mod notify;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod scorer;
pub mod source;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::harvest::Harvester;
pub use crate::model::{JobAudit, Posting};
pub use crate::notify::{run_delivery_worker, DeliveryChannel, NotificationPayload};
pub use crate::queue::{channel, NotificationQueue, NotificationStream};
