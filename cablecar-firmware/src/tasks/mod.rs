//! Embassy async tasks

pub mod run;
pub mod timeline_tx;

pub use run::run_task;
pub use timeline_tx::timeline_tx_task;
