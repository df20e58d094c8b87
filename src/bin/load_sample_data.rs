use chrono::Utc;
use fitness_studio::repository::SqliteStudioRepository;
use fitness_studio::settings::Settings;
use fitness_studio::{db, init_tracing, seed};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    init_tracing(&settings);

    let pool = db::connect(&settings).await?;
    let repository = SqliteStudioRepository::new(pool);
    let summary = seed::load_sample_data(&repository, &mut rand::rng(), Utc::now()).await?;

    info!(
        "Successfully created {} classes and {} bookings",
        summary.classes, summary.bookings
    );
    Ok(())
}
