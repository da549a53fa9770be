//! Turn reassembled raw page rows into typed transaction rows.
//!
//! Everything here is lenient: malformed numbers and dates become `None`
//! (rendered as placeholders later), nothing is raised.

use chrono::{Datelike, NaiveDate};
use raiff_core::{ForeignAmount, TransactionRow, NO_INFORMATION};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::{PageTable, RawColumn, RawRow};

const DATE_FORMAT: &str = "%d.%m.%Y";

fn kurs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Kurs:\s*(?P<rate>\d[\d,]*(?:\.\d+)?)").expect("valid regex"))
}

/// Pages whose table starts with the payout header carry two header rows
/// that are not transactions.
pub fn strip_payout_header(rows: Vec<RawRow>, payout_marker: &str) -> Vec<RawRow> {
    let starts_with_payout = rows
        .first()
        .and_then(|r| r.get(RawColumn::Expense))
        .is_some_and(|v| v == payout_marker);
    if starts_with_payout {
        rows.into_iter().skip(2).collect()
    } else {
        rows
    }
}

/// Concatenate pages in page-number order, dropping payout headers.
pub fn reassemble(mut pages: Vec<PageTable>, payout_marker: &str) -> Vec<RawRow> {
    pages.sort_by_key(|p| p.page);
    pages
        .into_iter()
        .flat_map(|p| strip_payout_header(p.rows, payout_marker))
        .collect()
}

/// Exchange rate per row position. A conversion note (`... Kurs: <rate>`)
/// belongs to the transaction line right above it, so the rate lands on
/// `i - 1` and the note row itself is left alone.
pub fn backfill_exchange_rates(rows: &[RawRow]) -> Vec<Option<f64>> {
    let mut rates = vec![None; rows.len()];
    for (i, row) in rows.iter().enumerate() {
        let Some(caps) = row
            .get(RawColumn::OriginalAmount)
            .and_then(|v| kurs_re().captures(v))
        else {
            continue;
        };
        if i == 0 {
            tracing::warn!("exchange rate note on the first row has no owning transaction, ignored");
            continue;
        }
        match parse_amount(Some(&caps["rate"])) {
            Some(rate) => rates[i - 1] = Some(rate),
            None => tracing::warn!(row = i, rate = &caps["rate"], "unparsable exchange rate"),
        }
    }
    rates
}

/// Strip thousands separators and parse; `None` for missing or malformed.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// `%Y` also takes short years (`01.03.23` is year 23); those are garbled
/// cells, not dates.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), DATE_FORMAT)
        .ok()
        .filter(|d| (1900..=9999).contains(&d.year()))
}

/// Normalize a reassembled table. Rows without a numeric balance (header
/// fragments, conversion notes, wrapped description lines) are dropped after
/// the exchange-rate backfill has read them.
pub fn normalize_rows(rows: Vec<RawRow>) -> Vec<TransactionRow> {
    let rates = backfill_exchange_rates(&rows);

    rows.into_iter()
        .zip(rates)
        .filter_map(|(row, exchange_rate)| {
            let balance = parse_amount(row.get(RawColumn::Balance))?;

            let completion_raw = row.get(RawColumn::CompletionDate);
            let transaction_raw = row.get(RawColumn::TransactionDate).or(completion_raw);

            Some(TransactionRow {
                transaction_date: parse_date(transaction_raw),
                completion_date: parse_date(completion_raw),
                card_number: row.get(RawColumn::CardNumber).map(str::to_string),
                description: row
                    .get(RawColumn::Description)
                    .unwrap_or(NO_INFORMATION)
                    .to_string(),
                foreign_amount: ForeignAmount::parse(row.get(RawColumn::ForeignAmount)),
                original_amount: row
                    .get(RawColumn::OriginalAmount)
                    .map(|v| v.replace(',', "")),
                exchange_rate,
                expense: parse_amount(row.get(RawColumn::Expense)),
                income: parse_amount(row.get(RawColumn::Income)),
                balance,
            })
        })
        .collect()
}

/// Full cleanup for one file: reassemble pages, then normalize.
pub fn normalize(pages: Vec<PageTable>, payout_marker: &str) -> Vec<TransactionRow> {
    normalize_rows(reassemble(pages, payout_marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// date, completion, card, description, foreign, original, expense, income, balance
    fn raw(cells: [&str; 9]) -> RawRow {
        RawRow::from_cells(cells.iter().map(|c| Some(*c))).unwrap()
    }

    fn tx(desc: &str, expense: &str, balance: &str) -> RawRow {
        raw(["01.03.2023", "02.03.2023", "", desc, "", "", expense, "0.00", balance])
    }

    fn note(original: &str) -> RawRow {
        raw(["", "", "", "", "", original, "", "", ""])
    }

    #[test]
    fn test_payout_header_dropped_only_when_first() {
        let header = raw(["", "", "", "", "", "", "Isplata", "Uplata", "Stanje"]);
        let sub = raw(["", "", "", "", "", "", "", "", "RSD"]);
        let rows = vec![header.clone(), sub, tx("A", "1.00", "10.00")];
        let stripped = strip_payout_header(rows, "Isplata");
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped[0].get(RawColumn::Description), Some("A"));

        let rows = vec![tx("A", "1.00", "10.00"), header];
        assert_eq!(strip_payout_header(rows, "Isplata").len(), 2);
    }

    #[test]
    fn test_payout_header_on_empty_page() {
        assert!(strip_payout_header(Vec::new(), "Isplata").is_empty());
    }

    #[test]
    fn test_reassemble_sorts_by_page() {
        let pages = vec![
            PageTable { page: 3, rows: vec![tx("C", "1", "1")] },
            PageTable { page: 1, rows: vec![tx("A", "1", "1")] },
            PageTable { page: 2, rows: vec![tx("B", "1", "1")] },
        ];
        let rows = reassemble(pages, "Isplata");
        let descs: Vec<_> = rows.iter().map(|r| r.get(RawColumn::Description)).collect();
        assert_eq!(descs, vec![Some("A"), Some("B"), Some("C")]);
    }

    #[test]
    fn test_backfill_targets_previous_row() {
        let rows = vec![
            tx("A", "1.00", "10.00"),
            tx("EB Kupovina", "1,175.00", "9.00"),
            note("Kurs: 117.5"),
        ];
        let rates = backfill_exchange_rates(&rows);
        assert_eq!(rates, vec![None, Some(117.5), None]);
    }

    #[test]
    fn test_backfill_accepts_amount_and_code_before_marker() {
        let rows = vec![tx("EB", "1.00", "1.00"), note("10.00 EUR Kurs: 1,17.25")];
        assert_eq!(backfill_exchange_rates(&rows), vec![Some(117.25), None]);
    }

    #[test]
    fn test_backfill_no_cross_contamination() {
        let rows = vec![
            tx("A", "1", "1"),
            tx("B", "1", "1"),
            tx("EB one", "1", "1"),
            note("Kurs: 117.1"),
            tx("EB two", "1", "1"),
            note("Kurs: 118.2"),
        ];
        let rates = backfill_exchange_rates(&rows);
        assert_eq!(rates, vec![None, None, Some(117.1), None, Some(118.2), None]);
    }

    #[test]
    fn test_backfill_first_row_is_ignored() {
        let rows = vec![note("Kurs: 117.1"), tx("A", "1", "1")];
        assert_eq!(backfill_exchange_rates(&rows), vec![None, None]);
    }

    #[test]
    fn test_normalize_drops_rows_without_balance() {
        let rows = vec![
            tx("EB Kupovina", "1,175.00", "8,825.00"),
            note("Kurs: 117.5"),
            raw(["", "", "", "continued text", "", "", "", "", ""]),
        ];
        let table = normalize_rows(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].expense, Some(1175.0));
        assert_eq!(table[0].balance, 8825.0);
        assert_eq!(table[0].exchange_rate, Some(117.5));
    }

    #[test]
    fn test_normalize_falls_back_to_completion_date() {
        let row = raw(["", "05.03.2023", "", "MAXI", "", "", "1.00", "", "5.00"]);
        let table = normalize_rows(vec![row]);
        assert_eq!(table[0].transaction_date, NaiveDate::from_ymd_opt(2023, 3, 5));
        assert_eq!(table[0].completion_date, NaiveDate::from_ymd_opt(2023, 3, 5));
    }

    #[test]
    fn test_normalize_is_lenient() {
        let row = raw([
            "32.13.2023",
            "",
            "",
            "",
            "12.5 USD",
            "1,250.00 USD",
            "n/a",
            "",
            "5.00",
        ]);
        let table = normalize_rows(vec![row]);
        let r = &table[0];
        assert_eq!(r.transaction_date, None);
        assert_eq!(r.description, NO_INFORMATION);
        assert_eq!(r.foreign_amount, ForeignAmount::Text("12.5 USD".to_string()));
        assert_eq!(r.original_amount.as_deref(), Some("1250.00 USD"));
        assert_eq!(r.expense, None);
        assert_eq!(r.income, None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(Some("1,234,567.89")), Some(1234567.89));
        assert_eq!(parse_amount(Some("  ")), None);
        assert_eq!(parse_amount(Some("Stanje")), None);
        assert_eq!(parse_amount(None), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(Some(" 01.03.2023 ")), NaiveDate::from_ymd_opt(2023, 3, 1));
        assert_eq!(parse_date(Some("01.03.23")), None);
        assert_eq!(parse_date(Some("31.02.2023")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn test_short_year_row_keeps_blank_dates() {
        let rows = normalize_rows(vec![raw([
            "01.03.23", "02.03.23", "", "MAXI", "", "", "100.00", "0.00", "900.00",
        ])]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction_date, None);
        assert_eq!(rows[0].completion_date, None);
        assert_eq!(rows[0].balance, 900.0);
    }
}
