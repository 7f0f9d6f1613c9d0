use crate::model::schema::{check_text, FieldErrors};
use serde::Serialize;

/// The party issuing every invoice of a run.
///
/// Supplied once per run (CLI flags or the GUI form) and shared read-only by
/// all rendered documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerInfo {
    full_name: String,
    address: String,
    /// Company identification number (IČO).
    ico: String,
}

impl SellerInfo {
    pub fn new(
        full_name: impl Into<String>,
        address: impl Into<String>,
        ico: impl Into<String>,
    ) -> Result<Self, FieldErrors> {
        let (full_name, address, ico) = (full_name.into(), address.into(), ico.into());

        let mut errors = FieldErrors::new();
        check_text("full_name", &full_name, &mut errors);
        check_text("address", &address, &mut errors);
        check_text("ico", &ico, &mut errors);

        errors.into_result(|| SellerInfo {
            full_name,
            address,
            ico,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn ico(&self) -> &str {
        &self.ico
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_valid_seller() {
        let seller = SellerInfo::new("John Doe", "123 Main St, Prague", "12345678").unwrap();
        assert_eq!(seller.full_name(), "John Doe");
        assert_eq!(seller.address(), "123 Main St, Prague");
        assert_eq!(seller.ico(), "12345678");
    }

    #[test]
    fn reports_every_empty_field() {
        let errors = SellerInfo::new("", "123 Main St", "").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("full_name").is_some());
        assert!(errors.get("ico").is_some());
        assert!(errors.get("address").is_none());
    }
}
