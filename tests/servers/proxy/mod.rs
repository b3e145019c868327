pub mod contract;
pub mod worker;
