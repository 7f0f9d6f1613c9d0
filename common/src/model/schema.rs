use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A flat record as read from one CSV row: column title -> raw cell text.
pub type RawRecord = HashMap<String, String>;

pub const MSG_REQUIRED: &str = "field required";
pub const MSG_EMPTY: &str = "must not be empty";

/// A single violated rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule violated by one record, in the order the fields were checked.
///
/// Rendered as `'field': message, 'other': message` so a whole row can be
/// reported on one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Message recorded for `field`, if that field failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Turns the collected errors into a result: `Ok(value())` when nothing failed.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Checks that `value` is non-empty, recording a violation for `field` otherwise.
pub(crate) fn check_text(field: &str, value: &str, errors: &mut FieldErrors) -> bool {
    if value.is_empty() {
        errors.push(field, MSG_EMPTY);
        return false;
    }
    true
}

/// Looks `field` up in `record`, recording "field required" when the cell is absent.
pub(crate) fn lookup<'a>(
    record: &'a RawRecord,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match record.get(field) {
        Some(value) => Some(value.as_str()),
        None => {
            errors.push(field, MSG_REQUIRED);
            None
        }
    }
}

/// An item the batch validator refused, with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected<I, E> {
    /// 0-based position of the item in the validated sequence.
    pub index: usize,
    pub item: I,
    pub errors: E,
}

/// Validates every item of `items` with `validate` before deciding.
///
/// Returns all accepted records in input order when every item passes.
/// Otherwise returns every rejected item, in input order; a failure never stops
/// the pass early, so the caller can report all problems at once.
pub fn validate_all<I, T, E, F>(
    items: impl IntoIterator<Item = I>,
    mut validate: F,
) -> Result<Vec<T>, Vec<Rejected<I, E>>>
where
    F: FnMut(&I) -> Result<T, E>,
{
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match validate(&item) {
            Ok(record) => accepted.push(record),
            Err(errors) => rejected.push(Rejected {
                index,
                item,
                errors,
            }),
        }
    }

    if rejected.is_empty() {
        Ok(accepted)
    } else {
        Err(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive(n: &i32) -> Result<i32, String> {
        if *n > 0 {
            Ok(*n * 10)
        } else {
            Err(format!("{} is not positive", n))
        }
    }

    #[test]
    fn validate_all_keeps_order_when_everything_passes() {
        assert_eq!(validate_all(vec![1, 2, 3], positive), Ok(vec![10, 20, 30]));
    }

    #[test]
    fn validate_all_reports_every_failure() {
        let mut calls = 0;
        let result = validate_all(vec![-1, 2, 0, 4], |n| {
            calls += 1;
            positive(n)
        });

        assert_eq!(calls, 4);
        let rejected = result.unwrap_err();
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].index, 0);
        assert_eq!(rejected[0].item, -1);
        assert_eq!(rejected[1].index, 2);
        assert_eq!(rejected[1].errors, "0 is not positive");
    }

    #[test]
    fn validate_all_on_empty_input_is_ok() {
        let result: Result<Vec<i32>, _> = validate_all(Vec::<i32>::new(), positive);
        assert_eq!(result, Ok(vec![]));
    }

    #[test]
    fn field_errors_display_lists_every_field() {
        let mut errors = FieldErrors::new();
        errors.push("date", "bad date");
        errors.push("amount", "must be greater than 0");
        assert_eq!(
            errors.to_string(),
            "'date': bad date, 'amount': must be greater than 0"
        );
        assert_eq!(errors.get("amount"), Some("must be greater than 0"));
        assert_eq!(errors.get("item"), None);
    }
}
