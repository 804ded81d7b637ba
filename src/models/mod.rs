// src/models/mod.rs

pub mod manifest;
pub mod quiz;
pub mod record;
pub mod student;
