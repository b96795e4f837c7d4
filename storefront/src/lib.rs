// storefront/src/lib.rs

//! Storefront order service: order placement, payment capture and order
//! lookup over HTTP, plus an image upload passthrough for the product admin.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
