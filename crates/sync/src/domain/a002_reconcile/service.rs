use std::collections::HashSet;

use contracts::domain::a001_remnant::{OfferCode, RemnantRecord};

use crate::domain::a001_remnant::service::{normalize_price, normalize_quantity, FormatError};

/// Сверка остатков фида с товарами, заведенными на маркетплейсе.
///
/// На каждый артикул из `offer_ids` строится ровно одна строка остатков:
/// - артикулы, найденные в фиде, идут первыми в порядке фида с нормализованным
///   количеством; повторные строки фида с тем же кодом игнорируются;
/// - артикулы, которых в фиде нет, идут следом в порядке листинга канала
///   с нулевым остатком (товар закончился у поставщика — обнуляем).
///
/// Артикулы фида, не заведенные на канале, строк не порождают. Форма строки
/// своя у каждого маркетплейса и задается конструктором `make`.
pub fn reconcile_stocks<T>(
    remnants: &[RemnantRecord],
    offer_ids: &[OfferCode],
    mut make: impl FnMut(&OfferCode, i32) -> T,
) -> Result<Vec<T>, FormatError> {
    let listed: HashSet<&OfferCode> = offer_ids.iter().collect();
    let mut covered: HashSet<&OfferCode> = HashSet::with_capacity(offer_ids.len());
    let mut rows = Vec::with_capacity(offer_ids.len());

    for record in remnants {
        if !listed.contains(&record.code) || covered.contains(&record.code) {
            continue;
        }
        let count = normalize_quantity(&record.quantity_raw)?;
        rows.push(make(&record.code, count));
        covered.insert(&record.code);
    }

    // Добавим недостающее из листинга канала с нулевым остатком
    for code in offer_ids {
        if covered.insert(code) {
            rows.push(make(code, 0));
        }
    }

    Ok(rows)
}

/// Сверка цен фида с товарами, заведенными на маркетплейсе.
///
/// Строка цены строится только для артикулов, присутствующих и в фиде, и в
/// листинге канала, в порядке фида; повторы фида схлопываются до первого
/// вхождения. Для артикулов канала без строки фида цена не выдумывается.
/// Пустая нормализованная цена — ошибка формата конкретной записи, а не
/// молчаливый пропуск.
pub fn reconcile_prices<T>(
    remnants: &[RemnantRecord],
    offer_ids: &[OfferCode],
    mut make: impl FnMut(&OfferCode, &str) -> Result<T, FormatError>,
) -> Result<Vec<T>, FormatError> {
    let listed: HashSet<&OfferCode> = offer_ids.iter().collect();
    let mut seen: HashSet<&OfferCode> = HashSet::new();
    let mut rows = Vec::new();

    for record in remnants {
        if !listed.contains(&record.code) || !seen.insert(&record.code) {
            continue;
        }
        let price = normalize_price(&record.price_raw);
        if price.is_empty() {
            return Err(FormatError::Price(record.price_raw.clone()));
        }
        rows.push(make(&record.code, &price)?);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(ids: &[&str]) -> Vec<OfferCode> {
        ids.iter().map(|s| OfferCode::new(*s)).collect()
    }

    #[derive(Debug, PartialEq)]
    struct Row {
        code: String,
        count: i32,
    }

    fn stock_rows(remnants: &[RemnantRecord], offer_ids: &[OfferCode]) -> Vec<Row> {
        reconcile_stocks(remnants, offer_ids, |code, count| Row {
            code: code.value().to_string(),
            count,
        })
        .unwrap()
    }

    #[test]
    fn test_stocks_end_to_end_scenario() {
        let remnants = vec![
            RemnantRecord::new("123", ">10", "1000.00 p."),
            RemnantRecord::new("456", "1", "2000.00 p."),
        ];
        let offer_ids = codes(&["123", "456", "789"]);

        let rows = stock_rows(&remnants, &offer_ids);
        assert_eq!(
            rows,
            vec![
                Row { code: "123".into(), count: 100 },
                Row { code: "456".into(), count: 0 },
                Row { code: "789".into(), count: 0 },
            ]
        );
    }

    #[test]
    fn test_stocks_cover_listing_exactly_once() {
        // Независимо от содержимого фида результат покрывает листинг канала
        // ровно по одному разу
        let remnants = vec![
            RemnantRecord::new("a", "5", "100.00"),
            RemnantRecord::new("a", "7", "100.00"), // дубль в фиде
            RemnantRecord::new("x", "3", "300.00"), // нет на канале
        ];
        let offer_ids = codes(&["b", "a", "c"]);

        let rows = stock_rows(&remnants, &offer_ids);
        let mut got: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        // Совпавшие с фидом — первыми, остальные — в порядке листинга
        assert_eq!(got, vec!["a", "b", "c"]);
        got.sort();
        got.dedup();
        assert_eq!(got.len(), offer_ids.len());
        // Дубль фида схлопнулся до первого вхождения
        assert_eq!(rows[0].count, 5);
    }

    #[test]
    fn test_stocks_empty_feed_zeroes_everything() {
        let rows = stock_rows(&[], &codes(&["1", "2"]));
        assert_eq!(
            rows,
            vec![
                Row { code: "1".into(), count: 0 },
                Row { code: "2".into(), count: 0 },
            ]
        );
    }

    #[test]
    fn test_stocks_bad_quantity_propagates() {
        let remnants = vec![RemnantRecord::new("1", "много", "100.00")];
        let result = reconcile_stocks(&remnants, &codes(&["1"]), |_, count| count);
        assert!(matches!(result, Err(FormatError::Quantity(_))));
    }

    #[test]
    fn test_prices_entry_iff_in_feed_and_listing() {
        let remnants = vec![
            RemnantRecord::new("123", ">10", "1000.00 p."),
            RemnantRecord::new("456", "1", "2000.00 p."),
            RemnantRecord::new("999", "2", "3000.00 p."), // нет на канале
        ];
        let offer_ids = codes(&["123", "456", "789"]);

        let rows = reconcile_prices(&remnants, &offer_ids, |code, price| {
            Ok((code.value().to_string(), price.to_string()))
        })
        .unwrap();

        // 789 без строки фида — цены нет, 999 вне листинга — пропущен
        assert_eq!(
            rows,
            vec![
                ("123".to_string(), "1000".to_string()),
                ("456".to_string(), "2000".to_string()),
            ]
        );
    }

    #[test]
    fn test_prices_empty_value_is_error() {
        let remnants = vec![RemnantRecord::new("1", "2", "руб.")];
        let result = reconcile_prices(&remnants, &codes(&["1"]), |_, price| {
            Ok(price.to_string())
        });
        assert!(matches!(result, Err(FormatError::Price(_))));
    }

    #[test]
    fn test_prices_duplicate_feed_rows_collapse() {
        let remnants = vec![
            RemnantRecord::new("1", "2", "100.00"),
            RemnantRecord::new("1", "2", "200.00"),
        ];
        let rows = reconcile_prices(&remnants, &codes(&["1"]), |_, price| {
            Ok(price.to_string())
        })
        .unwrap();
        assert_eq!(rows, vec!["100".to_string()]);
    }
}
