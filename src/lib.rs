//! Tuning desk: booking dialogue engine for a piano shop's chat front-end.

pub mod api;
pub mod availability;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod llm;
pub mod persona;
pub mod reply;
pub mod retry;
pub mod session;
pub mod temporal;
