//! # The KYC Record
//!
//! The fact being negotiated: who the subject is, when the check was
//! performed, and how long it remains valid. Records are immutable — a
//! changed fact is a new record issued under the same linear identifier,
//! never an edit of the old one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kyc_core::SubjectId;

/// An immutable KYC fact about one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycRecord {
    /// Numeric record id, the human-facing reference.
    pub kyc_id: u64,
    /// The subject's user id.
    pub user_id: SubjectId,
    /// The subject's display name.
    pub user_name: String,
    /// Date the KYC check was performed.
    pub kyc_date: NaiveDate,
    /// Date until which the check remains valid.
    pub valid_until: NaiveDate,
    /// Reference to the external verification document.
    pub doc_id: String,
}

impl KycRecord {
    /// Assemble a record from client input.
    pub fn new(
        kyc_id: u64,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        kyc_date: NaiveDate,
        valid_until: NaiveDate,
        doc_id: impl Into<String>,
    ) -> Self {
        Self {
            kyc_id,
            user_id: SubjectId::new(user_id),
            user_name: user_name.into(),
            kyc_date,
            valid_until,
            doc_id: doc_id.into(),
        }
    }
}

impl std::fmt::Display for KycRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "kyc #{} for {} (checked {}, valid until {})",
            self.kyc_id, self.user_id, self.kyc_date, self.valid_until
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn serde_roundtrip() {
        let record = KycRecord::new(
            111,
            "biksen",
            "Jiya Sen",
            date("2017-02-09"),
            date("2019-09-15"),
            "A001",
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: KycRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn dates_serialize_as_strings() {
        let record = KycRecord::new(111, "biksen", "Jiya Sen", date("2017-02-09"), date("2019-09-15"), "A001");
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["kyc_date"], "2017-02-09");
        assert_eq!(v["valid_until"], "2019-09-15");
    }
}
