use raiff_core::{Currency, NormalizedTable};
use std::collections::BTreeMap;

/// With `merge` off the tables are returned untouched. With it on, tables
/// sharing a currency are concatenated in input order, one table per
/// currency present (RSD, EUR, USD order). Currencies with no input never
/// produce an output table.
pub fn merge_tables(tables: Vec<NormalizedTable>, merge: bool) -> Vec<NormalizedTable> {
    if !merge {
        return tables;
    }

    let mut buckets: BTreeMap<Currency, Vec<NormalizedTable>> = BTreeMap::new();
    for table in tables {
        buckets.entry(table.currency()).or_default().push(table);
    }

    buckets
        .into_iter()
        .map(|(currency, group)| {
            tracing::debug!(%currency, tables = group.len(), "merging");
            NormalizedTable::concat(currency, group)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raiff_core::{ForeignAmount, TransactionRow};

    fn table(currency: Currency, balances: &[f64]) -> NormalizedTable {
        let rows = balances
            .iter()
            .map(|b| TransactionRow {
                transaction_date: None,
                completion_date: None,
                card_number: None,
                description: "X".to_string(),
                foreign_amount: ForeignAmount::Missing,
                original_amount: None,
                exchange_rate: None,
                expense: None,
                income: None,
                balance: *b,
            })
            .collect();
        NormalizedTable::new(currency, rows)
    }

    fn balances(t: &NormalizedTable) -> Vec<f64> {
        t.rows().iter().map(|r| r.balance).collect()
    }

    #[test]
    fn test_merge_off_is_identity() {
        let input = vec![table(Currency::Eur, &[1.0]), table(Currency::Eur, &[2.0])];
        let out = merge_tables(input.clone(), false);
        assert_eq!(out, input);
    }

    #[test]
    fn test_merge_same_currency_sums_rows() {
        let out = merge_tables(
            vec![table(Currency::Rsd, &[1.0, 2.0]), table(Currency::Rsd, &[3.0, 4.0, 5.0])],
            true,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 5);
        assert_eq!(balances(&out[0]), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_merge_groups_by_currency_without_empty_buckets() {
        let out = merge_tables(
            vec![
                table(Currency::Eur, &[10.0]),
                table(Currency::Rsd, &[1.0]),
                table(Currency::Eur, &[11.0]),
            ],
            true,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].currency(), Currency::Rsd);
        assert_eq!(balances(&out[0]), vec![1.0]);
        assert_eq!(out[1].currency(), Currency::Eur);
        assert_eq!(balances(&out[1]), vec![10.0, 11.0]);
    }

    #[test]
    fn test_merge_nothing() {
        assert!(merge_tables(Vec::new(), true).is_empty());
    }
}
