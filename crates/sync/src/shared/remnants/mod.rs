use std::io::{Cursor, Read};

use anyhow::Result;
use calamine::{Data, Reader, Xls};
use contracts::domain::a001_remnant::RemnantRecord;

/// Имя файла остатков внутри архива поставщика
const REMNANTS_FILE_NAME: &str = "ostatki.xls";

/// Строка заголовков таблицы остатков (нумерация с нуля); все, что выше —
/// шапка выгрузки поставщика, данные идут следом
const HEADER_ROW: usize = 17;

const COLUMN_CODE: &str = "Код";
const COLUMN_QUANTITY: &str = "Количество";
const COLUMN_PRICE: &str = "Цена";

/// Клиент фида остатков поставщика: скачивает zip-архив и разбирает
/// таблицу xls в список записей
pub struct RemnantsFeedClient {
    client: reqwest::Client,
}

impl RemnantsFeedClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Скачать архив остатков и вернуть разобранные записи фида.
    ///
    /// Архив распаковывается в памяти, на диск ничего не пишется.
    pub async fn download_remnants(&self, url: &str) -> Result<Vec<RemnantRecord>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Remnants feed request failed: {}", body);
            anyhow::bail!(
                "Remnants feed request failed with status {}: {}",
                status,
                body
            );
        }

        let archive_bytes = response.bytes().await?;
        let workbook_bytes = extract_remnants_file(&archive_bytes)?;
        let records = parse_remnants_workbook(&workbook_bytes)?;

        tracing::info!("Разобрано {} записей фида остатков", records.len());
        Ok(records)
    }
}

impl Default for RemnantsFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Достать файл остатков из zip-архива.
///
/// Ищем файл по известному имени; если поставщик переименовал его,
/// берем первую запись архива.
fn extract_remnants_file(archive_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;
    if archive.is_empty() {
        anyhow::bail!("Архив остатков пуст");
    }

    let index = (0..archive.len())
        .find(|&i| {
            archive
                .by_index(i)
                .map(|f| f.name().ends_with(REMNANTS_FILE_NAME))
                .unwrap_or(false)
        })
        .unwrap_or(0);

    let mut file = archive.by_index(index)?;
    let mut contents = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Разобрать таблицу xls в записи фида.
///
/// Колонки ищутся по заголовкам в строке HEADER_ROW, строки без кода
/// пропускаются. Числовые коды приводятся к строке здесь и только здесь.
fn parse_remnants_workbook(workbook_bytes: &[u8]) -> Result<Vec<RemnantRecord>> {
    let mut workbook = Xls::new(Cursor::new(workbook_bytes))
        .map_err(|e| anyhow::anyhow!("Не удалось открыть файл остатков: {}", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow::anyhow!("В файле остатков нет листов"))?
        .map_err(|e| anyhow::anyhow!("Не удалось прочитать лист остатков: {}", e))?;

    let mut rows = range.rows().skip(HEADER_ROW);
    let header = rows
        .next()
        .ok_or_else(|| anyhow::anyhow!("В файле остатков нет строки заголовков"))?;

    let code_idx = find_column(header, COLUMN_CODE)?;
    let quantity_idx = find_column(header, COLUMN_QUANTITY)?;
    let price_idx = find_column(header, COLUMN_PRICE)?;

    let mut records = Vec::new();
    for row in rows {
        let code = cell_to_string(row.get(code_idx));
        if code.is_empty() {
            continue;
        }
        records.push(RemnantRecord::new(
            code,
            cell_to_string(row.get(quantity_idx)),
            cell_to_string(row.get(price_idx)),
        ));
    }

    Ok(records)
}

fn find_column(header: &[Data], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|cell| cell_to_string(Some(cell)) == name)
        .ok_or_else(|| anyhow::anyhow!("В файле остатков нет колонки {:?}", name))
}

/// Приведение ячейки к строке: целые числа без дробной части,
/// пустые ячейки — пустая строка
fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) if f.fract() == 0.0 => format!("{}", *f as i64),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string_coercion() {
        assert_eq!(cell_to_string(Some(&Data::String(" 123 ".into()))), "123");
        assert_eq!(cell_to_string(Some(&Data::Int(456))), "456");
        // Числовой код из xls приходит как float без дробной части
        assert_eq!(cell_to_string(Some(&Data::Float(789.0))), "789");
        assert_eq!(cell_to_string(Some(&Data::Float(12.5))), "12.5");
        assert_eq!(cell_to_string(Some(&Data::Empty)), "");
        assert_eq!(cell_to_string(None), "");
    }

    #[test]
    fn test_find_column() {
        let header = vec![
            Data::String("Код".into()),
            Data::String("Количество".into()),
            Data::String("Цена".into()),
        ];
        assert_eq!(find_column(&header, "Количество").unwrap(), 1);
        assert!(find_column(&header, "Склад").is_err());
    }
}
