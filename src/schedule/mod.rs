// file: src/schedule/mod.rs
// version: 1.0.0
// guid: 5e8b2d17-4c90-4f6a-a3e1-0b7c9d2f4e85

//! Boot-time job scheduling

pub mod crontab;
pub mod scheduler;

pub use crontab::{CrontabEditor, JobTable};
pub use scheduler::{
    boot_command, print_manual_instructions, BootActionScheduler, ScheduleOutcome,
    MANUAL_BOOT_LINE,
};
