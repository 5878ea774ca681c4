// src/lib.rs

//! Alert relay library.
//!
//! Watches alert listing pages, detects newly published alerts per source,
//! and forwards their full text to the source's chat channel.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
