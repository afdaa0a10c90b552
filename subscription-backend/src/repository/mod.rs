// src/repository/mod.rs
pub mod customer_repository;
pub mod customer_subscription_repository;
pub mod subscription_plan_repository;
pub mod user_repository;
