/// Console + rolling JSON file subscriber setup for the scripts.
pub mod logsetup;

pub use logsetup::setup_logging;
