pub mod auth;
pub mod cli;
pub mod colors;
pub mod config;
pub mod db;
pub mod errors;
pub mod financials;
pub mod hours;
pub mod logging;
pub mod models;
pub mod ordering;
pub mod session;
pub mod storage;
pub mod ui;
