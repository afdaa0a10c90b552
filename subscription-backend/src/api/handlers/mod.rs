// src/api/handlers/mod.rs
pub mod admin_customer_subscription_handler;
pub mod admin_subscription_plan_handler;
pub mod auth_handler;
pub mod store_customer_subscription_handler;
pub mod store_subscription_plan_handler;
pub mod system_handler;
