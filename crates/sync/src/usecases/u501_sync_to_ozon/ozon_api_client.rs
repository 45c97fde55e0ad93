use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;

use crate::shared::config::OzonConfig;

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
}

impl OzonApiClient {
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
            .open("ozon_api_requests.log")
        {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }

    fn check_credentials(&self, config: &OzonConfig) -> Result<()> {
        if config.client_id.trim().is_empty() {
            anyhow::bail!("Client-Id is required for OZON API");
        }
        if config.api_key.trim().is_empty() {
            anyhow::bail!("Api-Key is required for OZON API");
        }
        Ok(())
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        config: &OzonConfig,
        url: &str,
        request_body: &Req,
    ) -> Result<Resp> {
        self.check_credentials(config)?;

        let body = serde_json::to_string(request_body)?;
        self.log_to_file(&format!(
            "=== REQUEST ===\nPOST {}\nClient-Id: {}\nApi-Key: ****\nBody: {}",
            url, config.client_id, body
        ));

        let response = self
            .client
            .post(url)
            .header("Client-Id", &config.client_id)
            .header("Api-Key", &config.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("OZON API request failed: {}", body);
            anyhow::bail!("OZON API request failed with status {}: {}", status, body);
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        let preview: String = body.chars().take(500).collect::<String>();
        let preview = if preview.len() < body.len() {
            format!("{}...", preview)
        } else {
            preview
        };
        tracing::debug!("OZON API response preview: {}", preview);

        match serde_json::from_str::<Resp>(&body) {
            Ok(data) => {
                self.log_to_file("Successfully parsed JSON");
                Ok(data)
            }
            Err(e) => {
                let error_msg = format!("Failed to parse OZON API JSON: {}", e);
                self.log_to_file(&error_msg);
                tracing::error!("Failed to parse OZON API response. Error: {}", e);
                anyhow::bail!(
                    "Failed to parse OZON API JSON: {}. Response: {}",
                    e,
                    preview
                )
            }
        }
    }

    /// Получить страницу списка товаров через POST /v3/product/list
    pub async fn fetch_product_list(
        &self,
        config: &OzonConfig,
        limit: i32,
        last_id: Option<String>,
    ) -> Result<OzonProductListResponse> {
        let request_body = OzonProductListRequest {
            filter: Some(OzonProductListFilter {
                visibility: Some("ALL".to_string()),
            }),
            last_id: last_id.unwrap_or_default(),
            limit,
        };

        self.post_json(
            config,
            "https://api-seller.ozon.ru/v3/product/list",
            &request_body,
        )
        .await
    }

    /// Обновить остатки товаров через POST /v1/product/import/stocks
    pub async fn update_stocks(
        &self,
        config: &OzonConfig,
        stocks: &[OzonStockUpdate],
    ) -> Result<OzonImportResponse> {
        let request_body = OzonStocksImportRequest { stocks };

        let response: OzonImportResponse = self
            .post_json(
                config,
                "https://api-seller.ozon.ru/v1/product/import/stocks",
                &request_body,
            )
            .await?;

        for item in response.result.iter().filter(|i| !i.errors.is_empty()) {
            tracing::warn!(
                "OZON не принял остаток по артикулу {}: {:?}",
                item.offer_id,
                item.errors
            );
        }

        Ok(response)
    }

    /// Обновить цены товаров через POST /v1/product/import/prices
    pub async fn update_prices(
        &self,
        config: &OzonConfig,
        prices: &[OzonPriceUpdate],
    ) -> Result<OzonImportResponse> {
        let request_body = OzonPricesImportRequest { prices };

        let response: OzonImportResponse = self
            .post_json(
                config,
                "https://api-seller.ozon.ru/v1/product/import/prices",
                &request_body,
            )
            .await?;

        for item in response.result.iter().filter(|i| !i.errors.is_empty()) {
            tracing::warn!(
                "OZON не принял цену по артикулу {}: {:?}",
                item.offer_id,
                item.errors
            );
        }

        Ok(response)
    }
}

impl Default for OzonApiClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request/Response structures для OZON Seller API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<OzonProductListFilter>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_id: String,
    pub limit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResult {
    pub items: Vec<OzonProductListItem>,
    pub total: i32,
    pub last_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListItem {
    pub product_id: i64,
    pub offer_id: String,
}

#[derive(Debug, Serialize)]
struct OzonStocksImportRequest<'a> {
    stocks: &'a [OzonStockUpdate],
}

/// Строка остатка для OZON: артикул и доступное количество
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonStockUpdate {
    pub offer_id: String,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
struct OzonPricesImportRequest<'a> {
    prices: &'a [OzonPriceUpdate],
}

/// Строка цены для OZON; сервисные поля фиксированы контрактом API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonPriceUpdate {
    pub auto_action_enabled: String,
    pub currency_code: String,
    pub offer_id: String,
    pub old_price: String,
    pub price: String,
}

impl OzonPriceUpdate {
    pub fn new(offer_id: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            auto_action_enabled: "UNKNOWN".to_string(),
            currency_code: "RUB".to_string(),
            offer_id: offer_id.into(),
            old_price: "0".to_string(),
            price: price.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportResponse {
    #[serde(default)]
    pub result: Vec<OzonImportResultItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportResultItem {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_update_fixed_fields() {
        let price = OzonPriceUpdate::new("136748", "5990");
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["auto_action_enabled"], "UNKNOWN");
        assert_eq!(json["currency_code"], "RUB");
        assert_eq!(json["old_price"], "0");
        assert_eq!(json["offer_id"], "136748");
        assert_eq!(json["price"], "5990");
    }

    #[test]
    fn test_product_list_request_skips_empty_last_id() {
        let request = OzonProductListRequest {
            filter: None,
            last_id: String::new(),
            limit: 1000,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("last_id").is_none());
        assert!(json.get("filter").is_none());
    }
}
