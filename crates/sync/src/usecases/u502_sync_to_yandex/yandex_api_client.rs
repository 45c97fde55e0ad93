use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;

use crate::shared::config::YandexConfig;

const ENDPOINT_URL: &str = "https://api.partner.market.yandex.ru";

/// HTTP-клиент для работы с Yandex Market API
pub struct YandexApiClient {
    client: reqwest::Client,
}

impl YandexApiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Записать в лог-файл
    fn log_to_file(&self, message: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open("yandex_api_requests.log")
        {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }

    fn check_credentials(&self, config: &YandexConfig) -> Result<()> {
        if config.token.trim().is_empty() {
            anyhow::bail!("Bearer token (MARKET_TOKEN) is required for Yandex Market API");
        }
        Ok(())
    }

    async fn read_response<Resp: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<Resp> {
        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("Yandex Market API request failed: {}", body);
            anyhow::bail!(
                "Yandex Market API request failed with status {}: {}",
                status,
                body
            );
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        let preview: String = body.chars().take(500).collect::<String>();
        let preview = if preview.len() < body.len() {
            format!("{}...", preview)
        } else {
            preview
        };
        tracing::debug!("Yandex Market API response preview: {}", preview);

        match serde_json::from_str::<Resp>(&body) {
            Ok(data) => {
                self.log_to_file("Successfully parsed JSON");
                Ok(data)
            }
            Err(e) => {
                let error_msg = format!("Failed to parse Yandex Market API JSON: {}", e);
                self.log_to_file(&error_msg);
                tracing::error!("Failed to parse Yandex Market API response. Error: {}", e);
                anyhow::bail!(
                    "Failed to parse Yandex Market API JSON: {}. Response: {}",
                    e,
                    preview
                )
            }
        }
    }

    /// Получить страницу листинга товаров кампании
    /// Endpoint: GET /campaigns/{campaignId}/offer-mapping-entries
    pub async fn fetch_offer_mappings(
        &self,
        config: &YandexConfig,
        campaign_id: &str,
        limit: i32,
        page_token: Option<String>,
    ) -> Result<YandexOfferMappingsResponse> {
        self.check_credentials(config)?;

        let url = format!("{}/campaigns/{}/offer-mapping-entries", ENDPOINT_URL, campaign_id);

        #[derive(Serialize)]
        struct ListQueryParams {
            pub limit: i32,
            #[serde(skip_serializing_if = "Option::is_none", rename = "page_token")]
            pub page_token: Option<String>,
        }

        let request_query = ListQueryParams { limit, page_token };
        let token_preview = request_query
            .page_token
            .as_ref()
            .map(|t| &t[..t.len().min(50)]);

        self.log_to_file(&format!(
            "=== REQUEST ===\nGET {}\nAuthorization: Bearer ****\nQuery: limit={}, page_token={:?}",
            url, request_query.limit, token_preview
        ));

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", &config.token))
            .header("Accept", "application/json")
            .query(&request_query)
            .send()
            .await?;

        self.read_response(response).await
    }

    /// Обновить остатки товаров кампании
    /// Endpoint: PUT /campaigns/{campaignId}/offers/stocks
    pub async fn update_stocks(
        &self,
        config: &YandexConfig,
        campaign_id: &str,
        skus: &[YandexStockSku],
    ) -> Result<YandexStatusResponse> {
        self.check_credentials(config)?;

        let url = format!("{}/campaigns/{}/offers/stocks", ENDPOINT_URL, campaign_id);
        let request_body = YandexStocksRequest { skus };

        let body = serde_json::to_string(&request_body)?;
        self.log_to_file(&format!(
            "=== REQUEST ===\nPUT {}\nAuthorization: Bearer ****\nBody: {}",
            url, body
        ));

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", &config.token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        self.read_response(response).await
    }

    /// Обновить цены товаров кампании
    /// Endpoint: POST /campaigns/{campaignId}/offer-prices/updates
    pub async fn update_prices(
        &self,
        config: &YandexConfig,
        campaign_id: &str,
        offers: &[YandexOfferPrice],
    ) -> Result<YandexStatusResponse> {
        self.check_credentials(config)?;

        let url = format!("{}/campaigns/{}/offer-prices/updates", ENDPOINT_URL, campaign_id);
        let request_body = YandexPricesRequest { offers };

        let body = serde_json::to_string(&request_body)?;
        self.log_to_file(&format!(
            "=== REQUEST ===\nPOST {}\nAuthorization: Bearer ****\nBody: {}",
            url, body
        ));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", &config.token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        self.read_response(response).await
    }
}

impl Default for YandexApiClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request/Response structures для Yandex Market API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingsResponse {
    pub result: YandexOfferMappingsResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexOfferMappingsResult {
    #[serde(default)]
    pub offer_mapping_entries: Vec<YandexOfferMappingEntry>,
    #[serde(default)]
    pub paging: YandexPaging,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingEntry {
    pub offer: YandexOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexOffer {
    pub shop_sku: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexPaging {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
}

#[derive(Debug, Serialize)]
struct YandexStocksRequest<'a> {
    skus: &'a [YandexStockSku],
}

/// Строка остатка для Яндекс.Маркета: артикул, склад и единственная
/// FIT-позиция с количеством и временем среза
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexStockSku {
    pub sku: String,
    pub warehouse_id: i64,
    pub items: Vec<YandexStockItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexStockItem {
    pub count: i32,
    #[serde(rename = "type")]
    pub item_type: String,
    pub updated_at: String,
}

impl YandexStockSku {
    pub fn new(
        sku: impl Into<String>,
        warehouse_id: i64,
        count: i32,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            warehouse_id,
            items: vec![YandexStockItem {
                count,
                item_type: "FIT".to_string(),
                updated_at: updated_at.into(),
            }],
        }
    }

    /// Остаток по единственной FIT-позиции
    pub fn count(&self) -> i32 {
        self.items.first().map(|item| item.count).unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
struct YandexPricesRequest<'a> {
    offers: &'a [YandexOfferPrice],
}

/// Строка цены для Яндекс.Маркета
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferPrice {
    pub id: String,
    pub price: YandexPriceValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YandexPriceValue {
    pub value: i64,
    pub currency_id: String,
}

impl YandexOfferPrice {
    pub fn new(id: impl Into<String>, value: i64) -> Self {
        Self {
            id: id.into(),
            price: YandexPriceValue {
                value,
                currency_id: "RUR".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_sku_serializes_camel_case() {
        let sku = YandexStockSku::new("136748", 777, 100, "2024-01-01T00:00:00Z");
        let json = serde_json::to_value(&sku).unwrap();
        assert_eq!(json["sku"], "136748");
        assert_eq!(json["warehouseId"], 777);
        assert_eq!(json["items"][0]["count"], 100);
        assert_eq!(json["items"][0]["type"], "FIT");
        assert_eq!(json["items"][0]["updatedAt"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_offer_price_serializes_currency() {
        let price = YandexOfferPrice::new("136748", 5990);
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["id"], "136748");
        assert_eq!(json["price"]["value"], 5990);
        assert_eq!(json["price"]["currencyId"], "RUR");
    }

    #[test]
    fn test_offer_mappings_response_parses() {
        let body = r#"{
            "result": {
                "offerMappingEntries": [
                    {"offer": {"shopSku": "123"}},
                    {"offer": {"shopSku": "456"}}
                ],
                "paging": {"nextPageToken": "abc"}
            }
        }"#;
        let response: YandexOfferMappingsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.result.offer_mapping_entries.len(), 2);
        assert_eq!(response.result.offer_mapping_entries[0].offer.shop_sku, "123");
        assert_eq!(response.result.paging.next_page_token.as_deref(), Some("abc"));
    }
}
