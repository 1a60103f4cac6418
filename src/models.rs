// src/models.rs

pub mod auth;
pub mod catalogs;
pub mod rca;
pub mod reference;
pub mod validation;
pub mod variant;
