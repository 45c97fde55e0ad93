use thiserror::Error;

/// Ошибки разбора текстовых значений фида поставщика
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("некорректное значение количества: {0:?}")]
    Quantity(String),

    #[error("некорректное значение цены: {0:?}")]
    Price(String),
}

/// Преобразует текстовое количество из фида в остаток на складе.
///
/// Поставщик кодирует остатки сентинелями, порядок проверок важен:
/// - `">10"` — "больше десяти" — считаем как 100;
/// - `"1"` — ровно одна штука, по договоренности считается недоступной — 0;
/// - иначе значение разбирается как целое число.
///
/// Это бизнес-правила поставщика, а не причуда разбора: заменять их
/// "буквальными" значениями нельзя.
pub fn normalize_quantity(raw: &str) -> Result<i32, FormatError> {
    match raw {
        ">10" => Ok(100),
        "1" => Ok(0),
        other => other
            .parse::<i32>()
            .map_err(|_| FormatError::Quantity(raw.to_string())),
    }
}

/// Преобразует текстовую цену из фида в строку из цифр.
///
/// Берется подстрока до первой точки (дробная часть и все, что после нее,
/// отбрасывается — усечение, не округление), из нее выкидывается все, кроме
/// ASCII-цифр: `"5'990.00 руб."` -> `"5990"`. Если цифр до точки нет,
/// результат — пустая строка; вызывающий обязан считать ее ошибкой.
pub fn normalize_price(raw: &str) -> String {
    let integer_part = raw.split('.').next().unwrap_or("");
    integer_part.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_quantity_sentinels() {
        assert_eq!(normalize_quantity(">10").unwrap(), 100);
        assert_eq!(normalize_quantity("1").unwrap(), 0);
    }

    #[test]
    fn test_normalize_quantity_plain_numbers() {
        assert_eq!(normalize_quantity("7").unwrap(), 7);
        assert_eq!(normalize_quantity("0").unwrap(), 0);
        assert_eq!(normalize_quantity("10").unwrap(), 10);
    }

    #[test]
    fn test_normalize_quantity_invalid() {
        assert!(matches!(
            normalize_quantity("abc"),
            Err(FormatError::Quantity(_))
        ));
        assert!(normalize_quantity("").is_err());
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price("5'990.00 руб."), "5990");
        assert_eq!(normalize_price("12.5"), "12");
        assert_eq!(normalize_price("1000"), "1000");
    }

    #[test]
    fn test_normalize_price_no_digits() {
        assert_eq!(normalize_price("руб."), "");
        assert_eq!(normalize_price(""), "");
    }
}
