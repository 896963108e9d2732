pub mod export;
pub mod inspect;

pub use export::{run_export, run_export_key};
pub use inspect::run_inspect;
