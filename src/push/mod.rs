pub mod client;
pub mod scheduler;
pub mod vapid;

pub use client::{DeliveryOutcome, PushClient};
pub use scheduler::{NotificationScheduler, TickOutcome};
pub use vapid::{VapidError, VapidSigner};
