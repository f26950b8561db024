//! Campus Assist: institutional help-desk chatbot.
//!
//! Verifies a user's identity against the campus backend, resets WiFi and
//! Zoom passwords behind an emailed OTP, and routes free-text questions to
//! the backend's semantic search.

pub mod channels;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod gateway;
pub mod widget;
