// tests/integration/mod.rs

pub mod admin_plan_tests;
pub mod admin_subscription_tests;
pub mod auth_tests;
pub mod store_plan_tests;
pub mod system_tests;
