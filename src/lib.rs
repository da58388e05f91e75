pub mod aggregate;
pub mod common;
pub mod devto;
pub mod hashnode;
pub mod persist;
pub mod pipeline;
pub mod present;
