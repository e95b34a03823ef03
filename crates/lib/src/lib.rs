//! storebot core library — config, quick rules, completion fallback and the webhook
//! gateway used by the CLI.

pub mod agent;
pub mod channels;
pub mod config;
pub mod fallback;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod rules;
