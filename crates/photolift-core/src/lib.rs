//! PhotoLift Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `MediaFile`, `MediaKind`, `RunStats`, upload error taxonomy
//! - **Use cases** - `UploadMediaUseCase` (per-file pipeline), `MigrateUseCase` (run driver)
//! - **Port definitions** - Traits for adapters: `IPhotosLibrary`, `ICredentialProvider`,
//!   `ICodeExchanger`, `IUploadLog`, `ILocalMedia`, `IMigrationReporter`
//!
//! # Architecture
//!
//! The domain module contains pure classification rules with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain types through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

#[cfg(test)]
pub(crate) mod testing;
