pub mod hf;
pub mod youtube;
