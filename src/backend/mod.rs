//! Backend module - Provider trait and the two image generation clients

pub mod openai_backend;
pub mod stable_diffusion_backend;
pub mod traits;
