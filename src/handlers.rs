// src/handlers.rs

pub mod catalog;
pub mod drafts;
pub mod rcas;
