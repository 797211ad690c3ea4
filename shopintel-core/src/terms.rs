//! Terms of service shown before the dashboard can be used.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::TermsError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TermsSection {
    pub title: &'static str,
    pub content: &'static str,
}

pub const TERMS_NOTICE: &str = "You must read and accept these terms to use ShopIntel. Pay special attention to the forecast disclaimer and privacy sections.";

pub const TERMS_SECTIONS: [TermsSection; 6] = [
    TermsSection {
        title: "Data Ownership",
        content: "You retain full ownership of all data you upload to ShopIntel. We do not claim any ownership rights to your data.",
    },
    TermsSection {
        title: "Privacy Commitment",
        content: "Your data is private by default. It is never shared, sold, or used for training models without your explicit consent. Admins can only see metadata (file names, sizes, timestamps).",
    },
    TermsSection {
        title: "Forecast Disclaimer",
        content: "All sales forecasts are probabilistic estimates based on historical patterns. They are not guarantees of future performance. You are solely responsible for business decisions made using these insights.",
    },
    TermsSection {
        title: "Service Limitations",
        content: "ShopIntel is provided 'AS IS' without warranties. We are not liable for financial losses, inventory decisions, or business outcomes resulting from platform usage.",
    },
    TermsSection {
        title: "Account Management",
        content: "Accounts inactive for 30 days are automatically deactivated. You can request deletion of your data at any time. We comply with data protection regulations.",
    },
    TermsSection {
        title: "Acceptable Use",
        content: "You agree not to upload malicious content, attempt unauthorized access, or use the service for illegal activities. Violations may result in account termination.",
    },
];

/// Proof that the terms were accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TermsAcceptance {
    pub accepted_at: DateTime<Utc>,
    pub sections: usize,
}

/// Accept stays unavailable until the reader confirms they read every section.
#[derive(Clone, Debug, Default)]
pub struct TermsAgreement {
    acknowledged: bool,
}

impl TermsAgreement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &'static [TermsSection] {
        &TERMS_SECTIONS
    }

    /// "I have read and understand all terms"
    pub fn acknowledge(&mut self, read_all: bool) {
        self.acknowledged = read_all;
    }

    pub fn can_accept(&self) -> bool {
        self.acknowledged
    }

    pub fn accept(&self) -> Result<TermsAcceptance, TermsError> {
        if !self.acknowledged {
            return Err(TermsError::NotAcknowledged);
        }
        info!("Terms accepted");
        Ok(TermsAcceptance {
            accepted_at: Utc::now(),
            sections: TERMS_SECTIONS.len(),
        })
    }
}
