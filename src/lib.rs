pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod provider;
pub mod retry;
pub mod storage;
pub mod wallet;
