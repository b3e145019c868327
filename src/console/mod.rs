//! Console apps.
pub mod notifier;
