//! Career-question intake portal: a guided chat that collects a requester
//! profile and one question, a JSON submission API, and a password-gated
//! admin view for answering questions.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod services;
pub mod storage;
pub mod templates_structs;
