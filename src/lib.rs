//! Verse Explain - grounded, three-block explanations of scripture passages.
//!
//! A passage and its reference go to a chat-completion model; the reply is
//! reshaped by the narrative pipeline into CONTEXT, STATE and ACTION blocks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
