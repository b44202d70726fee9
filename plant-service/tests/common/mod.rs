use plant_service::config::PlantConfig;
use plant_service::services::providers::mock::MockTextProvider;
use plant_service::services::providers::TextProvider;
use plant_service::services::PlantDb;
use plant_service::startup::Application;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub api_address: String,
    pub db: PlantDb,
    pub db_name: String,
}

impl TestApp {
    /// Spawn the app with an unscripted mock provider.
    #[allow(dead_code)]
    pub async fn spawn() -> Self {
        Self::spawn_with_provider(Arc::new(MockTextProvider::new())).await
    }

    /// Spawn the app with scripted model replies.
    #[allow(dead_code)]
    pub async fn spawn_with_replies(replies: Vec<String>) -> Self {
        Self::spawn_with_provider(Arc::new(MockTextProvider::with_replies(replies))).await
    }

    pub async fn spawn_with_provider(llm: Arc<dyn TextProvider>) -> Self {
        std::env::set_var("APP__PORT", "0");
        std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        std::env::set_var("GOOGLE_API_KEY", "test-api-key");
        std::env::set_var("GENAI_PROVIDER", "mock");

        let db_name = format!("plant_test_{}", Uuid::new_v4());

        let mut config = PlantConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();

        let app = Application::build_with_provider(config, llm)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);
        let api_address = format!("{}/api", address);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            api_address,
            db,
            db_name,
        }
    }

    /// Cleanup test resources.
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
