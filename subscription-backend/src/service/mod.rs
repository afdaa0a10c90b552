// src/service/mod.rs
pub mod auth_service;
pub mod expiry_sweeper;
pub mod subscription_service;
