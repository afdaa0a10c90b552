// src/api/dto/mod.rs
pub mod auth_dto;
pub mod common;
pub mod customer_subscription_dto;
pub mod subscription_plan_dto;
