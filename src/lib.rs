pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod render;
pub mod selection;
pub mod signal;
