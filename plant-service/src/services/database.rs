//! Database operations for the plant advisory service.
//!
//! Persists predictions and chat history via MongoDB.

use crate::models::{ChatMessage, DiseasePrediction};
use crate::services::metrics;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct PlantDb {
    client: MongoClient,
    db: Database,
}

impl PlantDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for plant-service");

        // Prediction history reads newest-first
        let timestamp_index = IndexModel::builder()
            .keys(doc! { "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("timestamp_idx".to_string())
                    .build(),
            )
            .build();

        self.predictions()
            .create_index(timestamp_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create prediction timestamp index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        // Chat history reads one session in chronological order
        let session_time_index = IndexModel::builder()
            .keys(doc! { "session_id": 1, "timestamp": 1 })
            .options(
                IndexOptions::builder()
                    .name("session_time_idx".to_string())
                    .build(),
            )
            .build();

        self.chat_messages()
            .create_index(session_time_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create session_time index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    // Collection accessors

    pub fn predictions(&self) -> Collection<DiseasePrediction> {
        self.db.collection("predictions")
    }

    pub fn chat_messages(&self) -> Collection<ChatMessage> {
        self.db.collection("chat_messages")
    }

    // Prediction operations

    pub async fn insert_prediction(&self, prediction: &DiseasePrediction) -> Result<(), AppError> {
        self.predictions()
            .insert_one(prediction, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert prediction: {}", e);
                metrics::record_db_error("insert", "predictions");
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    /// Most recent predictions, newest first.
    pub async fn recent_predictions(&self, limit: i64) -> Result<Vec<DiseasePrediction>, AppError> {
        let find_options = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .limit(limit)
            .build();

        let cursor = self
            .predictions()
            .find(None, find_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query predictions: {}", e);
                metrics::record_db_error("find", "predictions");
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect predictions: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })
    }

    // Chat operations

    pub async fn insert_chat_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        self.chat_messages()
            .insert_one(message, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert chat message: {}", e);
                metrics::record_db_error("insert", "chat_messages");
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    /// All messages for a session in chronological order, up to `limit`.
    pub async fn session_history(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let find_options = FindOptions::builder()
            .sort(doc! { "timestamp": 1 })
            .limit(limit)
            .build();

        let cursor = self
            .chat_messages()
            .find(doc! { "session_id": session_id }, find_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query chat history: {}", e);
                metrics::record_db_error("find", "chat_messages");
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect chat history: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })
    }
}
