use rust_decimal::Decimal;

/// Number of reports shown on the dashboard's "recent" panel
pub const RECENT_REPORTS_LIMIT: i64 = 10;

/// Date format accepted by every form and API field (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Human-friendly date format used in rendered pages (e.g. "Mar 01, 2024")
pub const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";

// =============================================================================
// ACCOUNT CONSTANTS
// =============================================================================

/// Username held by the seeded administrator; not available for registration
pub const RESERVED_ADMIN_USERNAME: &str = "admin";

// =============================================================================
// INVOICE FEE DEFAULTS
// =============================================================================

/// Processing fee applied when the form leaves it blank (5.00)
pub const DEFAULT_PROCESSING_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Storage fee applied when the form leaves it blank (2.00)
pub const DEFAULT_STORAGE_FEE: Decimal = Decimal::from_parts(200, 0, 0, false, 2);

/// Late fee applied when the form leaves it blank (1.00)
pub const DEFAULT_LATE_FEE: Decimal = Decimal::from_parts(100, 0, 0, false, 2);

/// Largest amount an invoice fee or total column holds, `NUMERIC(10,2)` (99999999.99)
pub const MAX_INVOICE_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

// =============================================================================
// CATALOG CONSTANTS
// =============================================================================

/// Largest estimated item value, `NUMERIC(12,2)` (9999999999.99)
pub const MAX_ITEM_VALUE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_fee_defaults() {
        assert_eq!(DEFAULT_PROCESSING_FEE, Decimal::from_str("5.00").unwrap());
        assert_eq!(DEFAULT_STORAGE_FEE, Decimal::from_str("2.00").unwrap());
        assert_eq!(DEFAULT_LATE_FEE, Decimal::from_str("1.00").unwrap());
    }

    #[test]
    fn test_column_limits() {
        assert_eq!(MAX_INVOICE_AMOUNT, Decimal::from_str("99999999.99").unwrap());
        assert_eq!(MAX_ITEM_VALUE, Decimal::from_str("9999999999.99").unwrap());
    }
}
