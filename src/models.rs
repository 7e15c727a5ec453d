use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    /// Case-insensitive parse of a stored role string.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Personal,
    Business,
}

impl AccountType {
    /// Total, case-insensitive normalization of the account-type synonyms
    /// found in stored rows and signup metadata. Unknown strings map to
    /// no value rather than an error.
    pub fn parse(raw: &str) -> Option<AccountType> {
        match raw.trim().to_lowercase().as_str() {
            "personnel" | "personal" | "private" => Some(AccountType::Personal),
            "business" | "company" | "commercial" => Some(AccountType::Business),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Personal => "Personal",
            AccountType::Business => "Business",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
    Product,
    All,
}

impl CategoryKind {
    pub fn parse(raw: &str) -> Option<CategoryKind> {
        match raw.trim().to_lowercase().as_str() {
            "income" => Some(CategoryKind::Income),
            "expense" => Some(CategoryKind::Expense),
            "product" => Some(CategoryKind::Product),
            "all" => Some(CategoryKind::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Product => "product",
            CategoryKind::All => "all",
        }
    }
}

/// The signed-in user's profile row, as cached by the profile service.
/// Password hashes never leave the auth module.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub account_type: Option<AccountType>,
    pub gender: Option<String>,
    pub tel_number: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub language: String,
    pub theme: Option<String>,
    pub avatar_url: Option<String>,
    pub manager_id: Option<String>,
    pub goal: Option<f64>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub kind: CategoryKind,
    /// `None` marks a global category visible to every user.
    pub user_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub barcode: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IncomeKind {
    Source,
    Product,
}

/// One merged income row. Source-based rows carry the amount directly;
/// product-sale rows derive it from price * quantity and attribute the
/// selling employee.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IncomeRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub quantity: Option<f64>,
    pub date: String,
    pub notes: Option<String>,
    pub employee_name: Option<String>,
    pub payment_method: Option<String>,
    pub kind: IncomeKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    Normal,
    Product,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExpenseRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub quantity: Option<f64>,
    pub date: String,
    pub notes: Option<String>,
    pub receipt: Option<String>,
    pub kind: ExpenseKind,
}

// ---- request payloads ----

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub account_type: Option<String>,
    pub role: Option<String>,
    pub gender: Option<String>,
    pub tel_number: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateCategoryPayload {
    pub name: String,
    pub color: String,
    pub kind: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateProductPayload {
    pub name: String,
    pub price: f64,
    pub barcode: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateIncomeSourcePayload {
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub notes: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RecordSalePayload {
    pub product_id: String,
    pub quantity: f64,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateNormalExpensePayload {
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub notes: Option<String>,
    pub receipt: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateProductExpensePayload {
    pub product_id: String,
    pub quantity: f64,
    pub date: String,
    pub notes: Option<String>,
    pub receipt: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProfilePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub tel_number: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GoalPayload {
    pub goal: Option<f64>,
}
