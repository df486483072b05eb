mod bootstrap;
mod serial_task;

pub use bootstrap::run;
