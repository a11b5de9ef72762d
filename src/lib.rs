pub mod app;
pub mod config;
pub mod db;
pub mod domain;
pub mod infrastructure;
pub mod mailing;
pub mod telegram;
pub mod web;
