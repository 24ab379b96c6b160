// src/utils/mod.rs

pub mod access;
pub mod hash;
pub mod json;
pub mod jwt;
