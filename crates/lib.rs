pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infra;
pub mod observability;
