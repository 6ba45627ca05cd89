use budget_flow::{
    api::{self, AppState},
    client::{ApiClient, ApiClientConfig},
    config::{database, seed, settings::Settings},
    documents::{PdfRenderer, RemotePdfRenderer},
    errors::Result,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let settings = Settings::from_env()
        .inspect_err(|e| error!("Invalid configuration: {}", e))?;

    // 3. Database and schema
    database::prepare_sqlite_path(&settings.database_url)?;
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed master data when a seed file is present
    if settings.seed_config_path.exists() {
        let config = seed::load_config(&settings.seed_config_path)?;
        seed::seed_master_data(&db, &config)
            .await
            .inspect(|summary| info!(?summary, "Master data seeded."))
            .inspect_err(|e| error!("Failed to seed master data: {}", e))?;
    } else {
        warn!(
            path = %settings.seed_config_path.display(),
            "Seed file not found, starting without seed data"
        );
    }

    // 5. Optional document service
    let pdf: Option<Arc<dyn PdfRenderer>> = match &settings.pdf_service_url {
        Some(url) => {
            let client = ApiClient::new(ApiClientConfig::new(url.clone()))?;
            info!(endpoint = %client.endpoint(), "PDF export enabled");
            Some(Arc::new(RemotePdfRenderer::new(client)))
        }
        None => {
            warn!("PDF_SERVICE_URL not set; createPoPdf will fail");
            None
        }
    };

    // 6. Serve
    let state = Arc::new(AppState { db, pdf });
    api::serve(&settings, state).await
}
