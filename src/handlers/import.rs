//! Bulk client import handler

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use base64::Engine;
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::import::ClientImporter;
use crate::types::{
    ErrorResponse, ImportActor, ImportClientsRequest, ImportClientsResponse, Request,
    SuccessResponse,
};

/// Handle client.import requests
pub async fn handle_import_clients(
    client: Client,
    mut subscriber: Subscriber,
    importer: Arc<ClientImporter>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received client.import message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("client.import message without reply subject");
                continue;
            }
        };

        let request: Request<ImportClientsRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse client.import request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let payload = request.payload;

        let file_bytes = match base64::engine::general_purpose::STANDARD
            .decode(&payload.file_base64)
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("client.import payload is not valid base64: {}", e);
                let error = ErrorResponse::new(
                    request.id,
                    "INVALID_FILE",
                    format!("File content is not valid base64: {}", e),
                );
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        // Admins assign to a chosen employee; everyone else to themselves.
        let actor = ImportActor {
            user_id: payload.actor_id,
            assigned_employee_id: payload.employee_id.unwrap_or(payload.actor_id),
        };

        info!(
            "Import requested by {} ({}), {} bytes",
            payload.actor_id,
            payload.actor_role,
            file_bytes.len()
        );

        match importer.import(&file_bytes, &actor).await {
            Ok(outcome) => {
                info!(
                    "Import finished: {} processed, {} errors",
                    outcome.processed,
                    outcome.errors.len()
                );
                let response = ImportClientsResponse {
                    message: format!("{} clients processed successfully", outcome.processed),
                    processed_count: outcome.processed,
                    created_count: outcome.created,
                    updated_count: outcome.updated,
                    errors: outcome.errors,
                };
                let success = SuccessResponse::new(request.id, response);
                let _ = client.publish(reply, serde_json::to_vec(&success)?.into()).await;
            }
            Err(e) => {
                error!("Import failed: {}", e);
                let error = ErrorResponse::new(request.id, "INVALID_FILE", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}
