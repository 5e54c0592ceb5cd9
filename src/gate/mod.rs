pub mod access;
pub mod subscription;

pub use access::{AccessGate, Decision, DenyReason};
pub use subscription::{ChannelMembership, SubscriptionChecker, SubscriptionError};
