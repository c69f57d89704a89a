pub mod update;
pub mod webhook;
