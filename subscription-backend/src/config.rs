// src/config.rs
mod app;

pub use app::{AppConfig, CookieSettings, JwtSettings, SweepSettings};

// db / main から使う短縮名
pub type Config = AppConfig;
