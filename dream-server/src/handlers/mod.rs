//! API handlers

pub mod eeg;
pub mod health;
pub mod history;
pub mod predict;
