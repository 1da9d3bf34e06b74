mod config;
mod error_and;
mod failure;
mod redirect;
mod timer;
