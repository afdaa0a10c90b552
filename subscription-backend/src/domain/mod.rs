// src/domain/mod.rs
pub mod billing_period;
pub mod customer_model;
pub mod customer_subscription_model;
pub mod money;
pub mod subscription_plan_model;
pub mod subscription_status;
pub mod user_model;
