// src/utils/mod.rs

pub mod manifest;
