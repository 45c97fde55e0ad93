use serde::{Deserialize, Serialize};

// ============================================================================
// ID Type
// ============================================================================

/// Канонический артикул товара (колонка "Код" в фиде поставщика).
///
/// В исходном файле код может быть как строкой, так и числом — приведение к
/// строке выполняется ровно один раз, при загрузке фида. Дальше все сравнения
/// между фидом и маркетплейсами идут только через этот тип.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferCode(pub String);

impl OfferCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OfferCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Одна строка фида остатков поставщика.
///
/// Количество и цена хранятся в сыром текстовом виде, как они пришли из
/// файла: у поставщика есть строковые сентинели (`">10"`, `"1"`) и цены с
/// валютой ("5'990.00 руб."), разбор которых — отдельная бизнес-логика.
/// Запись создается заново на каждый запуск синхронизации и не изменяется.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemnantRecord {
    /// Артикул товара
    pub code: OfferCode,
    /// Колонка "Количество" — сырой текст
    pub quantity_raw: String,
    /// Колонка "Цена" — сырой текст
    pub price_raw: String,
}

impl RemnantRecord {
    pub fn new(
        code: impl Into<String>,
        quantity_raw: impl Into<String>,
        price_raw: impl Into<String>,
    ) -> Self {
        Self {
            code: OfferCode::new(code),
            quantity_raw: quantity_raw.into(),
            price_raw: price_raw.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_code_is_transparent_string() {
        let code = OfferCode::new("136748");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"136748\"");
        assert_eq!(code.value(), "136748");
        assert_eq!(code.to_string(), "136748");
    }

    #[test]
    fn test_remnant_record_keeps_raw_values() {
        let record = RemnantRecord::new("123", ">10", "5'990.00 руб.");
        assert_eq!(record.code, OfferCode::new("123"));
        assert_eq!(record.quantity_raw, ">10");
        assert_eq!(record.price_raw, "5'990.00 руб.");
    }
}
