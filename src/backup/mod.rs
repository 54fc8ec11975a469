mod logic;
pub(crate) mod lifecycle;
pub(crate) mod locator;
pub(crate) mod poller;
pub(crate) mod retention;

pub use logic::{BackupService, BackupSettings};
