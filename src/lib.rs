pub mod app;
pub mod config;
pub mod controller;
pub mod controllers;
pub mod crypto;
pub mod csrf;
pub mod error;
pub mod escape;
pub mod routes;
pub mod session;
pub mod state;
pub mod users;
pub mod validator;
pub mod views;
