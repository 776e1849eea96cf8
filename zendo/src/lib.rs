//! Zendo: client core of a task board with a conversational assistant.
//!
//! Two views share one server-side task collection. The chat view sends
//! messages to an assistant that may change tasks through server-side tools;
//! the board view shows the tasks in three status columns and moves them
//! one column at a time. Neither view pushes changes to the other. The board
//! catches up by polling.

pub mod api;
pub mod chat;
pub mod config;
pub mod console;
pub mod context;
pub mod tasks;
pub mod view;
