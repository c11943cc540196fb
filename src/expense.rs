//! The expense record and the types used to create and edit one.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    category::Category,
    currency::{Currency, DEFAULT_CURRENCY},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The opaque identifier the store assigns to an expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Wrap an identifier received from the store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, random identifier.
    pub fn new_random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for ExpenseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a record is a plain expense or money lent to or borrowed from someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent.
    #[default]
    Expense,
    /// Money given to a contact that is expected back.
    Give,
    /// Money borrowed from a contact that must be paid back.
    Borrow,
}

impl TransactionKind {
    /// Give and borrow records track money owed between the user and a contact.
    pub fn is_tracked(self) -> bool {
        matches!(self, Self::Give | Self::Borrow)
    }

    /// Map a stored value to a kind, treating anything unrecognized as a plain expense.
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "expense" | "" => Self::Expense,
            "give" => Self::Give,
            "borrow" => Self::Borrow,
            other => {
                tracing::warn!("Unknown transaction type \"{other}\", treating it as an expense");
                Self::Expense
            }
        }
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(TransactionKind::from_str_lossy(&value))
    }
}

/// The calendar date of an expense as it was received from the store.
///
/// Records created by this crate always hold a [ExpenseDate::Calendar] date.
/// Records synced from elsewhere may carry a date string that cannot be
/// parsed, these are kept as [ExpenseDate::Unparsed] so they still show up in
/// unfiltered lists, but they never match a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseDate {
    /// A valid calendar date.
    Calendar(Date),
    /// The raw text of a date that could not be parsed.
    Unparsed(String),
}

impl ExpenseDate {
    /// The calendar date, if it could be parsed.
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Calendar(date) => Some(*date),
            Self::Unparsed(_) => None,
        }
    }

    /// Parse an ISO 8601 date, e.g. "2025-01-31".
    ///
    /// Date-times such as "2025-01-31T10:00:00Z" are accepted and the time
    /// part is ignored. Anything else becomes [ExpenseDate::Unparsed].
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);

        match Date::parse(date_part, DATE_FORMAT) {
            Ok(date) => Self::Calendar(date),
            Err(error) => {
                tracing::warn!("Could not parse expense date \"{text}\": {error}");
                Self::Unparsed(text.to_owned())
            }
        }
    }
}

impl From<Date> for ExpenseDate {
    fn from(date: Date) -> Self {
        Self::Calendar(date)
    }
}

impl Display for ExpenseDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calendar(date) => match date.format(DATE_FORMAT) {
                Ok(text) => write!(f, "{text}"),
                Err(_) => write!(f, "{date}"),
            },
            Self::Unparsed(text) => write!(f, "{text}"),
        }
    }
}

impl Serialize for ExpenseDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExpenseDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(ExpenseDate::parse(&text))
    }
}

/// A recorded expense, or money given or borrowed.
///
/// Field names follow the records stored by the backend, so an export can be
/// deserialized directly.
///
/// To create a new `Expense`, use [Expense::build] and hand the result to an
/// [crate::ExpenseStore].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Assigned by the store.
    pub id: ExpenseId,
    /// What the money was spent on.
    pub title: String,
    /// The amount spent, always greater than zero.
    pub amount: f64,
    /// The code of the currency the amount was recorded in.
    pub currency: String,
    /// The spending category.
    pub category: Category,
    /// The day the money was spent.
    pub date: ExpenseDate,
    /// Free text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the store created the record.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Plain expense, give or borrow.
    #[serde(
        rename = "transactionType",
        default,
        deserialize_with = "null_as_default"
    )]
    pub transaction_kind: TransactionKind,
    /// Who the money was given to or borrowed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Send an email reminder on [Expense::reminder_date].
    #[serde(
        rename = "sendEmailReminder",
        default,
        deserialize_with = "null_as_default"
    )]
    pub send_email_reminder: bool,
    /// Send an SMS reminder on [Expense::reminder_date].
    #[serde(
        rename = "sendSmsReminder",
        default,
        deserialize_with = "null_as_default"
    )]
    pub send_sms_reminder: bool,
    /// When to remind the user about money given or borrowed.
    #[serde(
        rename = "reminderDate",
        default,
        serialize_with = "iso_date::option::serialize",
        deserialize_with = "lenient_reminder_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub reminder_date: Option<Date>,
}

/// Optional columns are written as `null` (or left empty in CSV) by clients
/// that never set them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_reminder_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();

    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(ExpenseDate::parse(&text).as_date())
}

impl Expense {
    /// Start building a new expense.
    ///
    /// Shortcut for [NewExpense] for discoverability.
    pub fn build(title: &str, amount: f64, category: Category, date: Date) -> NewExpense {
        NewExpense {
            title: title.to_owned(),
            amount,
            currency: DEFAULT_CURRENCY.code.to_owned(),
            category,
            date,
            notes: None,
            transaction_kind: TransactionKind::Expense,
            contact: None,
            send_email_reminder: false,
            send_sms_reminder: false,
            reminder_date: None,
        }
    }

    /// The notes, or an empty string if there are none.
    pub fn notes_or_empty(&self) -> &str {
        self.notes.as_deref().unwrap_or_default()
    }

    /// The date a reminder should be sent, if one is actually scheduled.
    ///
    /// A reminder date only counts for give and borrow records with at
    /// least one reminder channel switched on.
    pub fn active_reminder(&self) -> Option<Date> {
        let has_channel = self.send_email_reminder || self.send_sms_reminder;

        if self.transaction_kind.is_tracked() && has_channel {
            self.reminder_date
        } else {
            None
        }
    }
}

/// The fields of an expense before the store assigns its ID and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What the money was spent on, must not be empty.
    pub title: String,
    /// Must be a finite number greater than zero.
    pub amount: f64,
    /// Defaults to [DEFAULT_CURRENCY].
    pub currency: String,
    /// The spending category.
    pub category: Category,
    /// Must not be later than today.
    pub date: Date,
    /// Free text notes.
    pub notes: Option<String>,
    /// Plain expense, give or borrow.
    pub transaction_kind: TransactionKind,
    /// Expected for give and borrow records.
    pub contact: Option<String>,
    /// Send an email reminder.
    pub send_email_reminder: bool,
    /// Send an SMS reminder.
    pub send_sms_reminder: bool,
    /// When to send the reminders.
    pub reminder_date: Option<Date>,
}

impl NewExpense {
    /// Set the currency code.
    pub fn currency(mut self, code: &str) -> Self {
        self.currency = code.to_owned();
        self
    }

    /// Set the notes, an empty string clears them.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = non_empty(notes);
        self
    }

    /// Record money given to or borrowed from `contact`.
    pub fn transaction(mut self, kind: TransactionKind, contact: &str) -> Self {
        self.transaction_kind = kind;
        self.contact = non_empty(contact);
        self
    }

    /// Schedule reminders for a give or borrow record.
    pub fn reminders(mut self, email: bool, sms: bool, date: Option<Date>) -> Self {
        self.send_email_reminder = email;
        self.send_sms_reminder = sms;
        self.reminder_date = date;
        self
    }

    /// Check the fields a user can get wrong in the form.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyTitle] if the title is empty or only whitespace,
    /// - [Error::InvalidAmount] if the amount is not a number greater than zero,
    /// - [Error::FutureDate] if the date is later than `today`.
    pub fn validate(&self, today: Date) -> Result<(), Error> {
        validate_title(&self.title)?;
        validate_amount(self.amount)?;

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        if self.transaction_kind.is_tracked() && self.contact.is_none() {
            tracing::warn!(
                "{:?} record \"{}\" has no contact",
                self.transaction_kind,
                self.title
            );
        }

        Ok(())
    }

    /// Turn the validated fields into a stored record.
    pub(crate) fn into_expense(self, id: ExpenseId, created_at: OffsetDateTime) -> Expense {
        Expense {
            id,
            title: self.title.trim().to_owned(),
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            date: ExpenseDate::Calendar(self.date),
            notes: self.notes,
            created_at,
            transaction_kind: self.transaction_kind,
            contact: self.contact,
            send_email_reminder: self.send_email_reminder,
            send_sms_reminder: self.send_sms_reminder,
            reminder_date: self.reminder_date,
        }
    }
}

/// A partial update to an expense, `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    /// The new title.
    pub title: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new category.
    pub category: Option<Category>,
    /// The new date.
    pub date: Option<Date>,
    /// The new notes, `Some("")` clears them.
    pub notes: Option<String>,
    /// The new currency code, must be one of [crate::CURRENCIES].
    pub currency: Option<String>,
    /// Switch between plain expense, give and borrow.
    pub transaction_kind: Option<TransactionKind>,
    /// The new contact, `Some("")` clears it.
    pub contact: Option<String>,
    /// Turn email reminders on or off.
    pub send_email_reminder: Option<bool>,
    /// Turn SMS reminders on or off.
    pub send_sms_reminder: Option<bool>,
    /// The new reminder date, `Some(None)` clears it.
    pub reminder_date: Option<Option<Date>>,
}

impl ExpenseUpdate {
    /// Apply the update to `expense`.
    ///
    /// Nothing is changed if any of the new values are invalid.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyTitle] if the new title is empty,
    /// - [Error::InvalidAmount] if the new amount is not greater than zero,
    /// - [Error::InvalidCurrency] if the new currency is not supported.
    pub fn apply(self, expense: &mut Expense) -> Result<(), Error> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }

        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }

        let currency = self
            .currency
            .as_deref()
            .map(Currency::from_code)
            .transpose()?;

        if let Some(title) = self.title {
            expense.title = title.trim().to_owned();
        }

        if let Some(amount) = self.amount {
            expense.amount = amount;
        }

        if let Some(category) = self.category {
            expense.category = category;
        }

        if let Some(date) = self.date {
            expense.date = ExpenseDate::Calendar(date);
        }

        if let Some(notes) = self.notes {
            expense.notes = non_empty(&notes);
        }

        if let Some(currency) = currency {
            expense.currency = currency.code.to_owned();
        }

        if let Some(kind) = self.transaction_kind {
            expense.transaction_kind = kind;
        }

        if let Some(contact) = self.contact {
            expense.contact = non_empty(&contact);
        }

        if let Some(email) = self.send_email_reminder {
            expense.send_email_reminder = email;
        }

        if let Some(sms) = self.send_sms_reminder {
            expense.send_sms_reminder = sms;
        }

        if let Some(reminder_date) = self.reminder_date {
            expense.reminder_date = reminder_date;
        }

        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), Error> {
    if title.trim().is_empty() {
        Err(Error::EmptyTitle)
    } else {
        Ok(())
    }
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::{Expense, ExpenseDate, ExpenseId, ExpenseUpdate, TransactionKind};
    use crate::{Error, category::Category};

    fn stored_expense() -> Expense {
        Expense::build("Lunch", 12.5, Category::Food, date!(2026-10-01))
            .notes("team offsite")
            .into_expense(ExpenseId::new("abc"), datetime!(2026-10-01 12:00 UTC))
    }

    #[test]
    fn validate_accepts_today() {
        let today = date!(2026-10-16);
        let new_expense = Expense::build("Coffee", 4.5, Category::Food, today);

        assert_eq!(new_expense.validate(today), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_title() {
        let new_expense = Expense::build("   ", 4.5, Category::Food, date!(2026-10-16));

        assert_eq!(new_expense.validate(date!(2026-10-16)), Err(Error::EmptyTitle));
    }

    #[test]
    fn validate_rejects_non_positive_amount() {
        let today = date!(2026-10-16);

        for amount in [0.0, -3.0] {
            let new_expense = Expense::build("Coffee", amount, Category::Food, today);
            assert_eq!(new_expense.validate(today), Err(Error::InvalidAmount(amount)));
        }

        let new_expense = Expense::build("Coffee", f64::NAN, Category::Food, today);
        assert!(matches!(
            new_expense.validate(today),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn validate_rejects_future_date() {
        let new_expense =
            Expense::build("Concert", 80.0, Category::Entertainment, date!(2026-10-17));

        assert_eq!(
            new_expense.validate(date!(2026-10-16)),
            Err(Error::FutureDate(date!(2026-10-17)))
        );
    }

    #[test]
    fn builder_clears_empty_notes_and_contact() {
        let new_expense = Expense::build("Loan", 50.0, Category::Other, date!(2026-10-16))
            .notes("  ")
            .transaction(TransactionKind::Give, "");

        assert_eq!(new_expense.notes, None);
        assert_eq!(new_expense.contact, None);
        assert_eq!(new_expense.transaction_kind, TransactionKind::Give);
    }

    #[test]
    fn reminder_only_active_for_tracked_kinds_with_channel() {
        let reminder_date = Some(date!(2026-11-01));
        let created_at = datetime!(2026-10-16 9:00 UTC);
        let build = |kind, email| {
            Expense::build("Loan", 50.0, Category::Other, date!(2026-10-16))
                .transaction(kind, "sam@example.com")
                .reminders(email, false, reminder_date)
                .into_expense(ExpenseId::new_random(), created_at)
        };

        assert_eq!(build(TransactionKind::Give, true).active_reminder(), reminder_date);
        assert_eq!(build(TransactionKind::Borrow, true).active_reminder(), reminder_date);
        assert_eq!(build(TransactionKind::Give, false).active_reminder(), None);
        assert_eq!(build(TransactionKind::Expense, true).active_reminder(), None);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut expense = stored_expense();
        let update = ExpenseUpdate {
            amount: Some(15.0),
            notes: Some(String::new()),
            ..Default::default()
        };

        update.apply(&mut expense).unwrap();

        assert_eq!(expense.title, "Lunch");
        assert_eq!(expense.amount, 15.0);
        assert_eq!(expense.notes, None);
    }

    #[test]
    fn invalid_update_leaves_expense_unchanged() {
        let mut expense = stored_expense();
        let want = expense.clone();
        let update = ExpenseUpdate {
            title: Some("Dinner".to_owned()),
            amount: Some(-1.0),
            ..Default::default()
        };

        assert_eq!(update.apply(&mut expense), Err(Error::InvalidAmount(-1.0)));
        assert_eq!(expense, want);
    }

    #[test]
    fn update_changes_transaction_and_reminders() {
        let mut expense = stored_expense();
        let update = ExpenseUpdate {
            currency: Some("eur".to_owned()),
            transaction_kind: Some(TransactionKind::Give),
            contact: Some("sam@example.com".to_owned()),
            send_sms_reminder: Some(true),
            reminder_date: Some(Some(date!(2026-11-01))),
            ..Default::default()
        };

        update.apply(&mut expense).unwrap();

        assert_eq!(expense.currency, "EUR");
        assert_eq!(expense.transaction_kind, TransactionKind::Give);
        assert_eq!(expense.contact.as_deref(), Some("sam@example.com"));
        assert_eq!(expense.active_reminder(), Some(date!(2026-11-01)));

        let clear = ExpenseUpdate {
            contact: Some(String::new()),
            reminder_date: Some(None),
            ..Default::default()
        };
        clear.apply(&mut expense).unwrap();

        assert_eq!(expense.contact, None);
        assert_eq!(expense.reminder_date, None);
        assert!(expense.send_sms_reminder);
    }

    #[test]
    fn unsupported_currency_update_leaves_expense_unchanged() {
        let mut expense = stored_expense();
        let want = expense.clone();
        let update = ExpenseUpdate {
            title: Some("Dinner".to_owned()),
            currency: Some("XYZ".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            update.apply(&mut expense),
            Err(Error::InvalidCurrency("XYZ".to_owned()))
        );
        assert_eq!(expense, want);
    }

    #[test]
    fn parse_date_ignores_time_part() {
        assert_eq!(
            ExpenseDate::parse("2026-10-01T08:30:00Z"),
            ExpenseDate::Calendar(date!(2026-10-01))
        );
    }

    #[test]
    fn parse_keeps_malformed_date_text() {
        assert_eq!(
            ExpenseDate::parse("01/10/2026"),
            ExpenseDate::Unparsed("01/10/2026".to_owned())
        );
        assert_eq!(ExpenseDate::parse("not a date").as_date(), None);
    }

    #[test]
    fn deserializes_backend_record() {
        let json = r#"{
            "id": "7f3c",
            "title": "Book",
            "amount": 20,
            "currency": "EUR",
            "category": "shopping",
            "date": "2026-09-30",
            "created_at": "2026-09-30T10:15:00Z",
            "transactionType": "borrow",
            "contact": "alex@example.com",
            "sendEmailReminder": true,
            "reminderDate": "2026-10-30"
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(expense.id, ExpenseId::new("7f3c"));
        assert_eq!(expense.amount, 20.0);
        assert_eq!(expense.category, Category::Shopping);
        assert_eq!(expense.date.as_date(), Some(date!(2026-09-30)));
        assert_eq!(expense.notes, None);
        assert_eq!(expense.created_at, datetime!(2026-09-30 10:15 UTC));
        assert_eq!(expense.transaction_kind, TransactionKind::Borrow);
        assert!(!expense.send_sms_reminder);
        assert_eq!(expense.active_reminder(), Some(date!(2026-10-30)));
    }

    #[test]
    fn null_optional_fields_use_defaults() {
        let json = r#"{
            "id": "7f3d",
            "title": "Lunch",
            "amount": 12,
            "currency": "USD",
            "category": "food",
            "date": "2026-10-01",
            "notes": null,
            "created_at": "2026-10-01T12:00:00Z",
            "transactionType": null,
            "contact": null,
            "sendEmailReminder": null,
            "sendSmsReminder": null,
            "reminderDate": null
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(expense.transaction_kind, TransactionKind::Expense);
        assert!(!expense.send_email_reminder);
        assert!(!expense.send_sms_reminder);
        assert_eq!(expense.reminder_date, None);
        assert_eq!(expense.contact, None);
    }

    #[test]
    fn unknown_transaction_type_is_an_expense() {
        let kind: TransactionKind = serde_json::from_str("\"loan\"").unwrap();

        assert_eq!(kind, TransactionKind::Expense);
    }

    #[test]
    fn serializes_date_as_iso_string() {
        let json = serde_json::to_value(stored_expense()).unwrap();

        assert_eq!(json["date"], "2026-10-01");
        assert_eq!(json["transactionType"], "expense");
        assert!(json.get("reminderDate").is_none());
    }
}
