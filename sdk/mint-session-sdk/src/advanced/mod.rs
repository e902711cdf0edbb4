pub mod classify;
pub mod confirm;
pub mod instructions;
