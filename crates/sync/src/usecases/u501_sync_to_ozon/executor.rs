use std::sync::Arc;

use anyhow::Result;
use contracts::domain::a001_remnant::{OfferCode, RemnantRecord};

use super::ozon_api_client::{OzonApiClient, OzonPriceUpdate, OzonStockUpdate};
use crate::domain::a002_reconcile::{reconcile_prices, reconcile_stocks};
use crate::shared::batch::divide;
use crate::shared::config::OzonConfig;

/// Размер страницы листинга товаров
const PRODUCT_LIST_PAGE_SIZE: i32 = 1000;

/// Лимит запроса обновления остатков
const STOCKS_BATCH_SIZE: usize = 100;

/// Лимит запроса обновления цен при полной синхронизации
const PRICES_BATCH_SIZE: usize = 900;

/// Лимит запроса обновления цен при отдельной загрузке только цен.
/// Исторически отличается от лимита полной синхронизации; оба значения
/// сохранены как есть.
const PRICES_UPLOAD_BATCH_SIZE: usize = 1000;

/// Executor синхронизации остатков и цен с OZON
pub struct SyncExecutor {
    api_client: Arc<OzonApiClient>,
}

impl SyncExecutor {
    pub fn new() -> Self {
        Self {
            api_client: Arc::new(OzonApiClient::new()),
        }
    }

    /// Получить полный список артикулов магазина.
    ///
    /// OZON отдает листинг страницами по курсору last_id; конец листинга —
    /// когда накопленное количество достигает заявленного total.
    pub async fn get_offer_ids(&self, config: &OzonConfig) -> Result<Vec<OfferCode>> {
        let mut offer_ids: Vec<OfferCode> = Vec::new();
        let mut last_id: Option<String> = None;

        loop {
            let response = self
                .api_client
                .fetch_product_list(config, PRODUCT_LIST_PAGE_SIZE, last_id.clone())
                .await?;
            let result = response.result;

            if result.items.is_empty() {
                // Защита от зацикливания на пустой странице
                tracing::info!("Received empty batch, stopping pagination");
                break;
            }

            offer_ids.extend(
                result
                    .items
                    .into_iter()
                    .map(|item| OfferCode::new(item.offer_id)),
            );

            if offer_ids.len() >= result.total as usize {
                break;
            }
            last_id = Some(result.last_id);
        }

        tracing::info!("OZON: в листинге {} артикулов", offer_ids.len());
        Ok(offer_ids)
    }

    /// Полная синхронизация: остатки, затем цены
    pub async fn sync_all(&self, config: &OzonConfig, remnants: &[RemnantRecord]) -> Result<()> {
        let offer_ids = self.get_offer_ids(config).await?;

        // Обновить остатки
        let stocks = build_stocks(remnants, &offer_ids)?;
        tracing::info!("OZON: отправка {} строк остатков", stocks.len());
        for chunk in divide(&stocks, STOCKS_BATCH_SIZE)? {
            self.api_client.update_stocks(config, chunk).await?;
        }

        // Поменять цены
        let prices = build_prices(remnants, &offer_ids)?;
        tracing::info!("OZON: отправка {} строк цен", prices.len());
        for chunk in divide(&prices, PRICES_BATCH_SIZE)? {
            self.api_client.update_prices(config, chunk).await?;
        }

        Ok(())
    }

    /// Загрузить только остатки.
    ///
    /// Возвращает пару (строки с ненулевым остатком, все строки) — вызывающим
    /// часто нужны только реально доступные товары.
    pub async fn upload_stocks(
        &self,
        config: &OzonConfig,
        remnants: &[RemnantRecord],
    ) -> Result<(Vec<OzonStockUpdate>, Vec<OzonStockUpdate>)> {
        let offer_ids = self.get_offer_ids(config).await?;
        let stocks = build_stocks(remnants, &offer_ids)?;

        for chunk in divide(&stocks, STOCKS_BATCH_SIZE)? {
            self.api_client.update_stocks(config, chunk).await?;
        }

        let not_empty = stocks
            .iter()
            .filter(|stock| stock.stock != 0)
            .cloned()
            .collect();
        Ok((not_empty, stocks))
    }

    /// Загрузить только цены
    pub async fn upload_prices(
        &self,
        config: &OzonConfig,
        remnants: &[RemnantRecord],
    ) -> Result<Vec<OzonPriceUpdate>> {
        let offer_ids = self.get_offer_ids(config).await?;
        let prices = build_prices(remnants, &offer_ids)?;

        for chunk in divide(&prices, PRICES_UPLOAD_BATCH_SIZE)? {
            self.api_client.update_prices(config, chunk).await?;
        }

        Ok(prices)
    }
}

impl Default for SyncExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn build_stocks(
    remnants: &[RemnantRecord],
    offer_ids: &[OfferCode],
) -> Result<Vec<OzonStockUpdate>> {
    let stocks = reconcile_stocks(remnants, offer_ids, |code, stock| OzonStockUpdate {
        offer_id: code.value().to_string(),
        stock,
    })?;
    Ok(stocks)
}

fn build_prices(
    remnants: &[RemnantRecord],
    offer_ids: &[OfferCode],
) -> Result<Vec<OzonPriceUpdate>> {
    let prices = reconcile_prices(remnants, offer_ids, |code, price| {
        Ok(OzonPriceUpdate::new(code.value(), price))
    })?;
    Ok(prices)
}
