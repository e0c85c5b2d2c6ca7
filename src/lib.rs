//! ragchat - a streaming client for a retrieval-augmented chat backend
//!
//! The core is the SSE stream decoder ([`sse`]) and the conversation state
//! machine ([`conversation`]) that folds decoded events into the answer
//! being streamed. [`session`] drives turns against [`api`], and [`cli`]
//! puts a terminal front end on top.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod sse;
pub mod traits;
