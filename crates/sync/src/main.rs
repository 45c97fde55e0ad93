pub mod domain;
pub mod shared;
pub mod usecases;

use contracts::enums::campaign_type::CampaignType;
use shared::config::Config;
use shared::remnants::RemnantsFeedClient;
use usecases::{u501_sync_to_ozon, u502_sync_to_yandex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Создаем директорию для логов
    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("sync.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config = shared::config::load_config()?;

    if let Err(e) = run_sync(&config).await {
        // Классификация ошибки верхнего уровня: таймаут, соединение, прочее
        match e.downcast_ref::<reqwest::Error>() {
            Some(err) if err.is_timeout() => {
                tracing::error!("Превышено время ожидания ответа: {}", err);
            }
            Some(err) if err.is_connect() => {
                tracing::error!("Ошибка соединения: {}", err);
            }
            _ => {
                tracing::error!("Синхронизация завершилась с ошибкой: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    tracing::info!("Синхронизация завершена");
    Ok(())
}

/// Полный прогон синхронизации: фид поставщика -> Ozon -> Яндекс.Маркет (FBS, DBS).
///
/// Каналы обрабатываются строго последовательно; первая необработанная
/// ошибка прерывает весь прогон, уже отправленные части не откатываются.
async fn run_sync(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Загрузка остатков поставщика: {}", config.feed.url);
    let feed_client = RemnantsFeedClient::new();
    let remnants = feed_client.download_remnants(&config.feed.url).await?;
    tracing::info!("Загружено {} строк фида", remnants.len());

    let ozon = u501_sync_to_ozon::SyncExecutor::new();
    ozon.sync_all(&config.ozon, &remnants).await?;

    let yandex = u502_sync_to_yandex::SyncExecutor::new();
    for campaign_type in CampaignType::all() {
        let campaign = config.yandex.campaign(campaign_type);
        yandex
            .sync_campaign(&config.yandex, campaign_type, campaign, &remnants)
            .await?;
    }

    Ok(())
}
