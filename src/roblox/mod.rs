//! Roblox Open Cloud asset API
//!
//! Two calls are used:
//! - `POST /assets/v1/assets` starts an asset upload and returns an operation id
//! - `GET /assets/v1/operations/{id}` reports whether that operation is done
//!
//! Both authenticate with the caller's key in the `x-api-key` header.

pub mod client;
pub mod poller;

pub use client::{AssetsClient, OperationStatus, ASSET_TYPE};
pub use poller::{poll_operation, PollOutcome, PollSettings};
