pub mod store;

pub use store::{next_window_boundary, QuotaStore, UserQuota};
