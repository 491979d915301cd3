//! tracectrl - a self-hosted dashboard for exercising your GDPR data rights
//!
//! This crate provides the core functionality for tracectrl: Google OAuth
//! sign-in, Gmail inbox scanning, LLM-backed company detection, GDPR
//! contact discovery, and templated request sending.

pub mod auth;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod session;
pub mod web;

pub use web::AppContext;
