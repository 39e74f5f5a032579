pub mod client;
pub mod contract;
pub mod contract_status;
pub mod event;
pub mod user;
