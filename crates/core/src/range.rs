//! 页码范围解析
//!
//! 语法：逗号分隔的若干项，每项为 `N` 或 `A-B`（闭区间，两端顺序任意），页码从 1 开始。

use crate::{CoreError, Result};
use std::collections::BTreeSet;

/// 解析页码范围表达式
///
/// 超出 `[1, page_count]` 的页码被丢弃，结果去重并升序排列。
/// 格式错误的项（非数字、空项）静默跳过；但如果整个表达式没有得到任何有效页码，
/// 返回 `CoreError::InvalidRange`。
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>> {
    let mut pages = BTreeSet::new();

    for token in input.split(',').map(str::trim) {
        if token.contains('-') {
            let mut bounds = token.split('-').map(|s| s.trim().parse::<usize>());
            let (Some(Ok(start)), Some(Ok(end))) = (bounds.next(), bounds.next()) else {
                log::debug!("[Range] 跳过无效区间: {:?}", token);
                continue;
            };
            let low = start.min(end).max(1);
            let high = start.max(end).min(page_count);
            pages.extend(low..=high);
        } else {
            match token.parse::<usize>() {
                Ok(n) if (1..=page_count).contains(&n) => {
                    pages.insert(n);
                }
                _ => log::debug!("[Range] 跳过无效页码: {:?}", token),
            }
        }
    }

    if pages.is_empty() {
        return Err(CoreError::InvalidRange(input.to_string()));
    }
    Ok(pages.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mixed_expression() {
        assert_eq!(
            parse_page_range("1-3, 5, 7-10", 12).unwrap(),
            vec![1, 2, 3, 5, 7, 8, 9, 10]
        );
    }

    #[test]
    fn test_reversed_interval() {
        assert_eq!(parse_page_range("3-1", 5).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_non_numeric_is_invalid() {
        assert!(matches!(
            parse_page_range("abc", 10),
            Err(CoreError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_empty_expression_is_invalid() {
        assert!(matches!(
            parse_page_range("  ,, ", 10),
            Err(CoreError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_out_of_range_numbers_dropped() {
        assert_eq!(parse_page_range("0, 2, 9-14", 10).unwrap(), vec![2, 9, 10]);
        assert!(parse_page_range("11-20", 10).is_err());
    }

    #[test]
    fn test_malformed_tokens_skipped() {
        assert_eq!(
            parse_page_range("x, 4, 2-y, -3, 1 - 2", 6).unwrap(),
            vec![1, 2, 4]
        );
    }

    #[test]
    fn test_duplicates_removed() {
        assert_eq!(parse_page_range("2, 1-3, 2", 5).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_huge_interval_is_clamped() {
        let pages = parse_page_range("1-4000000000", 3).unwrap();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn parsed_pages_are_sorted_unique_and_bounded(input in "[0-9, -]{0,24}", page_count in 1usize..40) {
            if let Ok(pages) = parse_page_range(&input, page_count) {
                prop_assert!(!pages.is_empty());
                prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(pages.iter().all(|p| (1..=page_count).contains(p)));
            }
        }
    }
}
