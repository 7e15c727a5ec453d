// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";

// Session configuration
pub const SESSION_NAME: &str = "finboard_session";
pub const SESSION_EXPIRY_DAYS: i64 = 3;
pub const MIN_SESSION_SECRET_LENGTH: usize = 64;
pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_ACCOUNT_TYPE: &str = "account_type";

// Overview windows (chart buckets)
pub const WEEKLY_WINDOW_DAYS: usize = 7;
pub const MONTHLY_WINDOW_DAYS: usize = 28;
pub const YEARLY_WINDOW_MONTHS: usize = 12;

// Distribution / recency caps
pub const TOP_SLICES: usize = 5;
pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;
pub const DEFAULT_SALES_LIMIT: u32 = 10;
pub const MAX_SALES_LIMIT: u32 = 100;

// Chart colors
pub const FALLBACK_SLICE_COLOR: &str = "#ccc";
pub const MALE_SLICE_COLOR: &str = "#3B82F6";
pub const FEMALE_SLICE_COLOR: &str = "#EC4899";

// Labels
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const UNKNOWN_LABEL: &str = "Unknown";

// Validation limits
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;
pub const MAX_RECORD_NAME_LENGTH: usize = 255;
pub const MAX_PRODUCT_NAME_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_NAME_LENGTH: usize = 100;

// Error messages
pub const ERR_DATABASE_ACCESS: &str = "Database access error";
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_UNAUTHORIZED: &str = "Not logged in";
pub const ERR_ADMIN_ONLY: &str = "Admin access required";
pub const ERR_EMPLOYEE_ONLY: &str = "Employee access required";
pub const ERR_BUSINESS_ONLY: &str = "Business account required";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid credentials";
