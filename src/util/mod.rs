pub mod datetime;
pub mod text;
pub mod user_agent;
