//! Shared wire definitions for the Zendo task and chat API.

pub mod chat;
pub mod codec;
pub mod identity;
pub mod task;
