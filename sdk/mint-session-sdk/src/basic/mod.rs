pub mod alert;
pub mod auth;
pub mod counter;
pub mod gating;
pub mod purchase;
pub mod session;
pub mod view;
