/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (start, due, snapshot) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Monetary amounts and performance indices use fixed-point decimals.
pub type Money = rust_decimal::Decimal;
