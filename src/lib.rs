//! Access-control core for a file-conversion chat bot: a channel
//! subscription gate plus per-user daily conversion quotas with lazy
//! midnight-UTC rollover. The messaging transport, the conversion
//! routines, and the membership backend are trait-typed collaborators
//! owned by the embedding process.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod gate;
pub mod quota;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BotConfig;
pub use dispatch::{
    ConversionRequest, ConvertedFile, Converter, ConvertError, Delivery, DeliveryError,
    Dispatcher, IncomingDocument, RequestOutcome,
};
pub use gate::{
    AccessGate, ChannelMembership, Decision, DenyReason, SubscriptionChecker, SubscriptionError,
};
pub use quota::{next_window_boundary, QuotaStore, UserQuota};
