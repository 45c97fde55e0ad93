use thiserror::Error;

/// Размер части равен нулю — деление невозможно
#[derive(Debug, Error)]
#[error("размер части должен быть положительным, получено {0}")]
pub struct InvalidChunkSize(pub usize);

/// Делит срез на части по `n` элементов, последняя часть может быть короче.
///
/// Порядок элементов сохраняется, конкатенация частей равна исходному срезу.
/// Итератор ленивый; нулевой размер части — ошибка, а не паника.
pub fn divide<T>(items: &[T], n: usize) -> Result<std::slice::Chunks<'_, T>, InvalidChunkSize> {
    if n == 0 {
        return Err(InvalidChunkSize(n));
    }
    Ok(items.chunks(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divide_basic() {
        let parts: Vec<Vec<i32>> = divide(&[1, 2, 3, 4, 5], 2)
            .unwrap()
            .map(|c| c.to_vec())
            .collect();
        assert_eq!(parts, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn test_divide_empty() {
        let parts: Vec<&[i32]> = divide(&[], 2).unwrap().collect();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_divide_zero_chunk_size() {
        assert!(divide(&[1, 2, 3], 0).is_err());
    }

    #[test]
    fn test_divide_concatenation_equals_input() {
        let items: Vec<i32> = (0..137).collect();
        for n in [1, 2, 7, 100, 500] {
            let joined: Vec<i32> = divide(&items, n).unwrap().flatten().copied().collect();
            assert_eq!(joined, items);
        }
    }

    #[test]
    fn test_divide_market_batch_sizes() {
        // 2500 остатков при лимите 2000 — ровно два запроса: 2000 и 500
        let items: Vec<u8> = vec![0; 2500];
        let sizes: Vec<usize> = divide(&items, 2000).unwrap().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![2000, 500]);
    }
}
