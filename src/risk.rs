use serde::Serialize;

/// Filing status of a product as recorded by the regulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductStatus {
    Approved,
    Cancelled,
    NotFound,
    Notified,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::Approved,
        ProductStatus::Cancelled,
        ProductStatus::NotFound,
        ProductStatus::Notified,
    ];

    /// Statuses whose products count as safe.
    pub const SAFE: [ProductStatus; 2] = [ProductStatus::Approved, ProductStatus::Notified];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Approved => "approved",
            ProductStatus::Cancelled => "cancelled",
            ProductStatus::NotFound => "not_found",
            ProductStatus::Notified => "notified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Unsafe,
    Unknown,
}

impl RiskLevel {
    /// Risk is never stored; it is always derived from the raw status column.
    pub fn from_status(status: &str) -> Self {
        match ProductStatus::parse(status) {
            Some(ProductStatus::Approved | ProductStatus::Notified) => RiskLevel::Safe,
            Some(ProductStatus::Cancelled) => RiskLevel::Unsafe,
            Some(ProductStatus::NotFound) | None => RiskLevel::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_status_literal_maps_to_a_risk_level() {
        for status in ProductStatus::ALL {
            let expected = match status {
                ProductStatus::Approved | ProductStatus::Notified => RiskLevel::Safe,
                ProductStatus::Cancelled => RiskLevel::Unsafe,
                ProductStatus::NotFound => RiskLevel::Unknown,
            };
            assert_eq!(RiskLevel::from_status(status.as_str()), expected, "{status:?}");
        }
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        assert_eq!(RiskLevel::from_status(""), RiskLevel::Unknown);
        assert_eq!(RiskLevel::from_status("CANCELLED"), RiskLevel::Unknown);
        assert_eq!(RiskLevel::from_status("pending"), RiskLevel::Unknown);
    }

    #[test]
    fn test_safe_statuses_derive_safe() {
        for status in ProductStatus::SAFE {
            assert_eq!(RiskLevel::from_status(status.as_str()), RiskLevel::Safe);
        }
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Unsafe).unwrap();
        assert_eq!(json, "\"unsafe\"");
    }
}
