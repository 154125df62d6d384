//! CLI command implementations.

mod doctor;
mod generate;
mod serve;
mod studio;

pub use doctor::run_doctor;
pub use generate::run_generate;
pub use serve::run_serve;
pub use studio::run_studio;
