//! Loading expenses from an export of the backend's expense table.
//!
//! Two formats are accepted: a JSON array of records, and CSV with a header
//! row naming the record fields (`id,title,amount,currency,category,date,...`).

use std::{fs, path::Path};

use crate::{Error, expense::Expense};

/// The file formats an export can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// A JSON array of expense records.
    Json,
    /// Comma separated values with a header row.
    Csv,
}

impl ExportFormat {
    /// Guess the format from the file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Read and parse the export at `path`.
///
/// # Errors
/// This function will return a:
/// - [Error::Io] if the file cannot be read,
/// - [Error::InvalidJson] or [Error::InvalidCsv] if its contents cannot be parsed.
pub fn load_expenses(path: &Path) -> Result<Vec<Expense>, Error> {
    let text = fs::read_to_string(path)
        .inspect_err(|error| tracing::error!("Could not read {}: {error}", path.display()))?;

    let expenses = match ExportFormat::from_path(path) {
        ExportFormat::Json => parse_json(&text)?,
        ExportFormat::Csv => parse_csv(&text)?,
    };

    tracing::info!("Loaded {} expenses from {}", expenses.len(), path.display());

    Ok(expenses)
}

/// Parse a JSON array of expense records.
///
/// # Errors
///
/// Returns [Error::InvalidJson] if `text` is not an array of valid records.
pub fn parse_json(text: &str) -> Result<Vec<Expense>, Error> {
    let expenses: Vec<Expense> = serde_json::from_str(text)?;
    check_amounts(&expenses);

    Ok(expenses)
}

/// Parse CSV records with a header row.
///
/// Optional columns (notes, contact, reminder fields) may be left out of the
/// header or left empty.
///
/// # Errors
///
/// Returns [Error::InvalidCsv] if a row cannot be parsed as a record.
pub fn parse_csv(text: &str) -> Result<Vec<Expense>, Error> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let expenses = reader
        .deserialize()
        .collect::<Result<Vec<Expense>, csv::Error>>()?;
    check_amounts(&expenses);

    Ok(expenses)
}

/// Amounts are validated when expenses are entered, so a bad one here means
/// the record was written by something else.
fn check_amounts(expenses: &[Expense]) {
    for expense in expenses {
        if !(expense.amount.is_finite() && expense.amount > 0.0) {
            tracing::warn!(
                "Expense {} has an invalid amount {}",
                expense.id,
                expense.amount
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use time::macros::{date, datetime};

    use super::{ExportFormat, parse_csv, parse_json};
    use crate::{
        Error,
        category::Category,
        expense::{ExpenseDate, ExpenseId, TransactionKind},
    };

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("export.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("export.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("export")), ExportFormat::Json);
    }

    #[test]
    fn parses_json_array() {
        let text = r#"[
            {"id": "a", "title": "Lunch", "amount": 12.5, "currency": "USD",
             "category": "food", "date": "2026-10-01", "notes": "team offsite",
             "created_at": "2026-10-01T12:00:00Z"},
            {"id": "b", "title": "Loan", "amount": 40, "currency": "USD",
             "category": "other", "date": "2026-10-02",
             "created_at": "2026-10-02T12:00:00Z", "transactionType": "give",
             "contact": "sam@example.com"}
        ]"#;

        let expenses = parse_json(text).unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].notes.as_deref(), Some("team offsite"));
        assert_eq!(expenses[1].transaction_kind, TransactionKind::Give);
        assert_eq!(expenses[1].contact.as_deref(), Some("sam@example.com"));
    }

    #[test]
    fn json_must_be_array() {
        let result = parse_json(r#"{"id": "a"}"#);

        assert!(matches!(result, Err(Error::InvalidJson(_))));
    }

    #[test]
    fn parses_csv_with_optional_columns() {
        let text = "\
id,title,amount,currency,category,date,notes,created_at
1,\"Lunch, with team\",12.5,USD,food,2026-10-01,offsite,2026-10-01T12:00:00Z
2,Bus,3,EUR,transport,2026-10-02,,2026-10-02T08:00:00Z
";

        let expenses = parse_csv(text).unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].id, ExpenseId::new("1"));
        assert_eq!(expenses[0].title, "Lunch, with team");
        assert_eq!(expenses[0].category, Category::Food);
        assert_eq!(expenses[0].date, ExpenseDate::Calendar(date!(2026-10-01)));
        assert_eq!(expenses[0].created_at, datetime!(2026-10-01 12:00 UTC));
        assert_eq!(expenses[1].amount, 3.0);
        assert_eq!(expenses[1].currency, "EUR");
        assert_eq!(expenses[1].notes, None);
        assert_eq!(expenses[1].transaction_kind, TransactionKind::Expense);
    }

    #[test]
    fn parses_json_with_null_optional_fields() {
        let text = r#"[
            {"id": "a", "title": "Lunch", "amount": 12.5, "currency": "USD",
             "category": "food", "date": "2026-10-01", "notes": null,
             "created_at": "2026-10-01T12:00:00Z", "transactionType": null,
             "contact": null, "sendEmailReminder": null, "sendSmsReminder": null,
             "reminderDate": null}
        ]"#;

        let expenses = parse_json(text).unwrap();

        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].transaction_kind, TransactionKind::Expense);
        assert!(!expenses[0].send_email_reminder);
        assert_eq!(expenses[0].reminder_date, None);
    }

    #[test]
    fn parses_csv_with_empty_optional_columns() {
        let text = "\
id,title,amount,currency,category,date,notes,created_at,transactionType,contact,sendEmailReminder,sendSmsReminder,reminderDate
1,Lunch,12.5,USD,food,2026-10-01,,2026-10-01T12:00:00Z,,,,,
2,Loan,40,USD,other,2026-10-02,,2026-10-02T12:00:00Z,give,sam@example.com,true,false,2026-11-02
";

        let expenses = parse_csv(text).unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].transaction_kind, TransactionKind::Expense);
        assert_eq!(expenses[0].contact, None);
        assert!(!expenses[0].send_email_reminder);
        assert_eq!(expenses[0].reminder_date, None);
        assert_eq!(expenses[1].transaction_kind, TransactionKind::Give);
        assert_eq!(expenses[1].active_reminder(), Some(date!(2026-11-02)));
    }

    #[test]
    fn csv_keeps_rows_with_malformed_dates() {
        let text = "\
id,title,amount,currency,category,date,created_at
1,Mystery,5,USD,food,last tuesday,2026-10-01T12:00:00Z
";

        let expenses = parse_csv(text).unwrap();

        assert_eq!(
            expenses[0].date,
            ExpenseDate::Unparsed("last tuesday".to_owned())
        );
    }

    #[test]
    fn csv_with_bad_amount_is_an_error() {
        let text = "\
id,title,amount,currency,category,date,created_at
1,Lunch,twelve,USD,food,2026-10-01,2026-10-01T12:00:00Z
";

        assert!(matches!(parse_csv(text), Err(Error::InvalidCsv(_))));
    }
}
