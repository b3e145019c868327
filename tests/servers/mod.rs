pub mod proxy;
mod service;
