//! Application bootstrapping.
//!
//! This module includes all the functions to build the application, its
//! dependencies, and run the jobs.
//!
//! Jobs are services executed concurrently: the control API and the proxy
//! worker.
pub mod app;
pub mod config;
pub mod jobs;
pub mod logging;
