//! pdfquiz: turn PDF documents into practice tests and take them in the terminal.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod generator;
pub mod logging;
pub mod pdf;
pub mod session;
pub mod store;
pub mod ui;
