//! Domain layer for the Warranty Registry backend.
//!
//! This crate contains:
//! - Domain models (WarrantyRegistration, WarrantyAuditLog, reference data)
//! - Warranty window derivation and status rules
//! - Request/response types with validation attributes

pub mod models;
