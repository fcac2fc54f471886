// src/handlers/mod.rs

pub mod health;
