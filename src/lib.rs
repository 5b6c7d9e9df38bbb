//! Content Sherpa - Secure, Context-Aware Content Workflow Engine
//!
//! This crate drives chat-based, multi-step content workflows (blog
//! articles, social posts, press releases and more). Every prompt is built
//! from context that has been classified and sanitized first, requests to
//! switch content type carry state across workflows, and finished
//! workflows refine the user's knowledge profile.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
