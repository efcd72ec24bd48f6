pub mod app;
pub mod config;
pub mod connection;
pub mod formatting;
pub mod message;
pub mod onboarding;
pub mod personality;
pub mod profile;
pub mod protocol;
pub mod transcript;
