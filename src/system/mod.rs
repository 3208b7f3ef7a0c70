pub mod command;
pub mod cpu;
pub mod host;
pub mod memory;
pub mod platform;
