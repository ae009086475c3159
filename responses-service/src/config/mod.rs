pub mod default_instructions;
pub mod responses_config;
