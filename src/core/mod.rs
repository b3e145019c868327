//! The domain layer of the announce proxy.
//!
//! There is only one piece of state shared by all the services: the current
//! public port, see [`port_state`].
pub mod port_state;
