use crate::model::schema::{check_text, lookup, FieldErrors, RawRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Column titles every invoice CSV must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["transaction_id", "customer_name", "date", "item", "amount"];

pub const MSG_DATE: &str = "must be a valid date in YYYY-MM-DD format";
pub const MSG_AMOUNT_NOT_DECIMAL: &str = "must be a decimal number";
pub const MSG_AMOUNT_NOT_POSITIVE: &str = "must be greater than 0";
pub const MSG_AMOUNT_OUT_OF_RANGE: &str = "is out of range (at most 28 significant digits)";

/// One validated CSV data row, ready to be rendered into an invoice.
///
/// Instances only come out of [`InvoiceRow::from_record`], so every field has
/// already passed the schema rules and none of them change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRow {
    transaction_id: String,
    customer_name: String,
    /// Serialized as `YYYY-MM-DD`.
    date: NaiveDate,
    item: String,
    /// Serialized as text, keeping the scale written in the CSV.
    amount: Decimal,
}

impl InvoiceRow {
    /// Validates a raw CSV record, collecting every violated rule.
    pub fn from_record(record: &RawRecord) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let transaction_id = text_field(record, "transaction_id", &mut errors);
        let customer_name = text_field(record, "customer_name", &mut errors);

        let date = lookup(record, "date", &mut errors).and_then(|raw| match parse_date(raw) {
            Ok(date) => Some(date),
            Err(msg) => {
                errors.push("date", msg);
                None
            }
        });

        let item = text_field(record, "item", &mut errors);

        let amount = lookup(record, "amount", &mut errors).and_then(|raw| match parse_amount(raw) {
            Ok(amount) => Some(amount),
            Err(msg) => {
                errors.push("amount", msg);
                None
            }
        });

        match (transaction_id, customer_name, date, item, amount) {
            (Some(transaction_id), Some(customer_name), Some(date), Some(item), Some(amount))
                if errors.is_empty() =>
            {
                Ok(InvoiceRow {
                    transaction_id,
                    customer_name,
                    date,
                    item,
                    amount,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

fn text_field(record: &RawRecord, field: &str, errors: &mut FieldErrors) -> Option<String> {
    let value = lookup(record, field, errors)?;
    check_text(field, value, errors).then(|| value.to_string())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// The shape is checked before chrono sees the text, so `2026-1-5` and
/// `01/15/2026` are refused along with impossible dates such as `2026-02-30`.
pub fn parse_date(value: &str) -> Result<NaiveDate, &'static str> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(MSG_DATE);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| MSG_DATE)
}

/// Parses an exact decimal amount that must be strictly positive.
///
/// Scientific notation (`1E3`) is accepted. A well-formed number that does
/// not fit a 96-bit decimal is reported as out of range rather than as
/// non-numeric.
pub fn parse_amount(value: &str) -> Result<Decimal, &'static str> {
    let value = value.trim();
    let parsed = if value.contains(['e', 'E']) {
        Decimal::from_scientific(value)
    } else {
        Decimal::from_str(value)
    };
    let amount = parsed.map_err(|_| {
        if is_numeric(value) {
            MSG_AMOUNT_OUT_OF_RANGE
        } else {
            MSG_AMOUNT_NOT_DECIMAL
        }
    })?;
    if amount <= Decimal::ZERO {
        return Err(MSG_AMOUNT_NOT_POSITIVE);
    }
    Ok(amount)
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with at least one mantissa digit.
fn is_numeric(value: &str) -> bool {
    let (mantissa, exponent) = match value.find(['e', 'E']) {
        Some(at) => (&value[..at], Some(&value[at + 1..])),
        None => (value, None),
    };

    let mantissa = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !digits(int) || !digits(frac) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && digits(exp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schema::{MSG_EMPTY, MSG_REQUIRED};

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid() -> RawRecord {
        record(&[
            ("transaction_id", "TXN-001"),
            ("customer_name", "Acme Corp"),
            ("date", "2026-01-15"),
            ("item", "Consulting Services"),
            ("amount", "1500.00"),
        ])
    }

    fn with(field: &str, value: &str) -> RawRecord {
        let mut r = valid();
        r.insert(field.to_string(), value.to_string());
        r
    }

    #[test]
    fn accepts_a_valid_row() {
        let row = InvoiceRow::from_record(&valid()).unwrap();
        assert_eq!(row.transaction_id(), "TXN-001");
        assert_eq!(row.customer_name(), "Acme Corp");
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(row.item(), "Consulting Services");
        assert_eq!(row.amount().to_string(), "1500.00");
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        for amount in ["0", "0.00", "-1", "-100.50"] {
            let errors = InvoiceRow::from_record(&with("amount", amount)).unwrap_err();
            assert_eq!(errors.get("amount"), Some(MSG_AMOUNT_NOT_POSITIVE), "{}", amount);
        }
    }

    #[test]
    fn accepts_smallest_positive_amount() {
        let row = InvoiceRow::from_record(&with("amount", "0.01")).unwrap();
        assert_eq!(row.amount().to_string(), "0.01");
    }

    #[test]
    fn rejects_non_numeric_amount() {
        for amount in ["lots", "1.2.3", "1e", "e5", "12 00"] {
            let errors = InvoiceRow::from_record(&with("amount", amount)).unwrap_err();
            assert_eq!(errors.get("amount"), Some(MSG_AMOUNT_NOT_DECIMAL), "{}", amount);
        }
    }

    #[test]
    fn accepts_scientific_notation() {
        assert_eq!(parse_amount("1E3"), Ok(Decimal::from(1000)));
        assert_eq!(parse_amount(" 2.5e2 "), Ok(Decimal::from(250)));
    }

    #[test]
    fn oversized_amounts_are_out_of_range() {
        for amount in ["1".repeat(40), "9e40".to_string()] {
            let errors = InvoiceRow::from_record(&with("amount", &amount)).unwrap_err();
            assert_eq!(errors.get("amount"), Some(MSG_AMOUNT_OUT_OF_RANGE), "{}", amount);
        }
    }

    #[test]
    fn accepts_leap_day() {
        assert!(InvoiceRow::from_record(&with("date", "2024-02-29")).is_ok());
    }

    #[test]
    fn rejects_impossible_and_malformed_dates() {
        for date in ["2026-13-45", "01/15/2026", "2026-02-30", "2025-02-29", "2026-1-5", ""] {
            let errors = InvoiceRow::from_record(&with("date", date)).unwrap_err();
            assert_eq!(errors.get("date"), Some(MSG_DATE), "{}", date);
        }
    }

    #[test]
    fn rejects_empty_text_fields() {
        let errors = InvoiceRow::from_record(&with("customer_name", "")).unwrap_err();
        assert_eq!(errors.get("customer_name"), Some(MSG_EMPTY));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn collects_every_violation_of_a_row() {
        let mut r = with("date", "2026-13-45");
        r.insert("amount".to_string(), "-5".to_string());
        r.insert("item".to_string(), String::new());

        let errors = InvoiceRow::from_record(&r).unwrap_err();
        assert_eq!(errors.len(), 3);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "item", "amount"]);
    }

    #[test]
    fn missing_cells_are_required() {
        let mut r = valid();
        r.remove("item");
        let errors = InvoiceRow::from_record(&r).unwrap_err();
        assert_eq!(errors.get("item"), Some(MSG_REQUIRED));
    }
}
