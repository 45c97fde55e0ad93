use std::sync::Arc;

use anyhow::Result;
use contracts::domain::a001_remnant::{OfferCode, RemnantRecord};
use contracts::enums::campaign_type::CampaignType;

use super::yandex_api_client::{YandexApiClient, YandexOfferPrice, YandexStockSku};
use crate::domain::a001_remnant::FormatError;
use crate::domain::a002_reconcile::{reconcile_prices, reconcile_stocks};
use crate::shared::batch::divide;
use crate::shared::config::{CampaignConfig, YandexConfig};

/// Размер страницы листинга товаров
const OFFER_MAPPINGS_PAGE_SIZE: i32 = 200;

/// Лимит запроса обновления остатков
const STOCKS_BATCH_SIZE: usize = 2000;

/// Лимит запроса обновления цен
const PRICES_BATCH_SIZE: usize = 500;

/// Executor синхронизации остатков и цен с Яндекс.Маркетом.
///
/// Одна кампания — один вызов sync_campaign; FBS и DBS обходятся
/// последовательно со своими campaign_id и warehouse_id.
pub struct SyncExecutor {
    api_client: Arc<YandexApiClient>,
}

impl SyncExecutor {
    pub fn new() -> Self {
        Self {
            api_client: Arc::new(YandexApiClient::new()),
        }
    }

    /// Получить полный список артикулов кампании.
    ///
    /// Листинг отдается страницами по page_token; конец листинга — отсутствие
    /// nextPageToken в ответе.
    pub async fn get_offer_ids(
        &self,
        config: &YandexConfig,
        campaign_id: &str,
    ) -> Result<Vec<OfferCode>> {
        let mut offer_ids: Vec<OfferCode> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = self
                .api_client
                .fetch_offer_mappings(
                    config,
                    campaign_id,
                    OFFER_MAPPINGS_PAGE_SIZE,
                    page_token.clone(),
                )
                .await?;

            let next_page_token = response.result.paging.next_page_token.clone();
            let entries = response.result.offer_mapping_entries;

            if entries.is_empty() {
                tracing::info!("Received empty batch, stopping pagination");
                break;
            }

            offer_ids.extend(
                entries
                    .into_iter()
                    .map(|entry| OfferCode::new(entry.offer.shop_sku)),
            );

            if next_page_token.is_none() {
                break;
            }

            // Защита от зацикливания: если токен не изменился, прекращаем
            if next_page_token == page_token {
                tracing::warn!(
                    "Page token did not change, stopping to prevent infinite loop. Token: {:?}",
                    next_page_token.as_ref().map(|t| &t[..t.len().min(50)])
                );
                break;
            }
            page_token = next_page_token;
        }

        tracing::info!(
            "Яндекс.Маркет: в листинге кампании {} — {} артикулов",
            campaign_id,
            offer_ids.len()
        );
        Ok(offer_ids)
    }

    /// Полная синхронизация одной кампании: остатки, затем цены
    pub async fn sync_campaign(
        &self,
        config: &YandexConfig,
        campaign_type: CampaignType,
        campaign: &CampaignConfig,
        remnants: &[RemnantRecord],
    ) -> Result<()> {
        tracing::info!(
            "Яндекс.Маркет {}: синхронизация кампании {}",
            campaign_type.display_name(),
            campaign.campaign_id
        );

        let offer_ids = self.get_offer_ids(config, &campaign.campaign_id).await?;

        // Обновить остатки
        let stocks = build_stocks(remnants, &offer_ids, campaign.warehouse_id)?;
        tracing::info!(
            "Яндекс.Маркет {}: отправка {} строк остатков",
            campaign_type.display_name(),
            stocks.len()
        );
        for chunk in divide(&stocks, STOCKS_BATCH_SIZE)? {
            self.api_client
                .update_stocks(config, &campaign.campaign_id, chunk)
                .await?;
        }

        // Поменять цены
        let prices = build_prices(remnants, &offer_ids)?;
        tracing::info!(
            "Яндекс.Маркет {}: отправка {} строк цен",
            campaign_type.display_name(),
            prices.len()
        );
        for chunk in divide(&prices, PRICES_BATCH_SIZE)? {
            self.api_client
                .update_prices(config, &campaign.campaign_id, chunk)
                .await?;
        }

        Ok(())
    }

    /// Загрузить только остатки кампании.
    ///
    /// Возвращает пару (строки с ненулевым остатком, все строки).
    pub async fn upload_stocks(
        &self,
        config: &YandexConfig,
        campaign: &CampaignConfig,
        remnants: &[RemnantRecord],
    ) -> Result<(Vec<YandexStockSku>, Vec<YandexStockSku>)> {
        let offer_ids = self.get_offer_ids(config, &campaign.campaign_id).await?;
        let stocks = build_stocks(remnants, &offer_ids, campaign.warehouse_id)?;

        for chunk in divide(&stocks, STOCKS_BATCH_SIZE)? {
            self.api_client
                .update_stocks(config, &campaign.campaign_id, chunk)
                .await?;
        }

        let not_empty = stocks
            .iter()
            .filter(|stock| stock.count() != 0)
            .cloned()
            .collect();
        Ok((not_empty, stocks))
    }

    /// Загрузить только цены кампании
    pub async fn upload_prices(
        &self,
        config: &YandexConfig,
        campaign: &CampaignConfig,
        remnants: &[RemnantRecord],
    ) -> Result<Vec<YandexOfferPrice>> {
        let offer_ids = self.get_offer_ids(config, &campaign.campaign_id).await?;
        let prices = build_prices(remnants, &offer_ids)?;

        for chunk in divide(&prices, PRICES_BATCH_SIZE)? {
            self.api_client
                .update_prices(config, &campaign.campaign_id, chunk)
                .await?;
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
    warehouse_id: i64,
) -> Result<Vec<YandexStockSku>> {
    // Один срез времени на весь расчет, с точностью до секунды
    let updated_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let stocks = reconcile_stocks(remnants, offer_ids, |code, count| {
        YandexStockSku::new(code.value(), warehouse_id, count, updated_at.clone())
    })?;
    Ok(stocks)
}

fn build_prices(
    remnants: &[RemnantRecord],
    offer_ids: &[OfferCode],
) -> Result<Vec<YandexOfferPrice>> {
    let prices = reconcile_prices(remnants, offer_ids, |code, price| {
        let value = price
            .parse::<i64>()
            .map_err(|_| FormatError::Price(price.to_string()))?;
        Ok(YandexOfferPrice::new(code.value(), value))
    })?;
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(ids: &[&str]) -> Vec<OfferCode> {
        ids.iter().map(|s| OfferCode::new(*s)).collect()
    }

    #[test]
    fn test_build_stocks_carries_warehouse_and_timestamp() {
        let remnants = vec![RemnantRecord::new("123", ">10", "1000.00 p.")];
        let stocks = build_stocks(&remnants, &codes(&["123", "789"]), 777).unwrap();

        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks[0].sku, "123");
        assert_eq!(stocks[0].warehouse_id, 777);
        assert_eq!(stocks[0].count(), 100);
        assert_eq!(stocks[1].sku, "789");
        assert_eq!(stocks[1].count(), 0);
        // Временной срез общий для всех строк
        assert_eq!(
            stocks[0].items[0].updated_at,
            stocks[1].items[0].updated_at
        );
    }

    #[test]
    fn test_build_prices_parses_numeric_value() {
        let remnants = vec![
            RemnantRecord::new("123", ">10", "5'990.00 руб."),
            RemnantRecord::new("456", "1", "2000.00 p."),
        ];
        let prices = build_prices(&remnants, &codes(&["123", "456", "789"])).unwrap();

        let got: Vec<(&str, i64)> = prices
            .iter()
            .map(|p| (p.id.as_str(), p.price.value))
            .collect();
        assert_eq!(got, vec![("123", 5990), ("456", 2000)]);
    }
}
