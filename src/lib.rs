pub mod application;
pub mod config;
pub mod domain;

#[cfg(test)]
mod config_tests;
