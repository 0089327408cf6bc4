//! Shared types

pub mod client;
pub mod import;
pub mod messages;

pub use client::{CallResponse, CleanedClient, LeadStatus};
pub use import::{ImportActor, ImportClientsRequest, ImportClientsResponse, RowError};
pub use messages::{ErrorResponse, Request, SuccessResponse};
