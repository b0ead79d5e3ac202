//! Shared domain types.
//!
//! The applicant table is a plain `Vec` of typed records rather than a generic
//! data frame: the schema is fixed, and typed fields let the cleaning steps be
//! checked by the compiler instead of by column-name lookups at runtime.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "children",
    "days_employed",
    "education",
    "family_status",
    "income_type",
    "debt",
    "total_income",
    "purpose",
];

/// Columns the categorizer adds. On input they are ignored and re-derived.
pub const DERIVED_COLUMNS: [&str; 2] = ["total_income_category", "purpose_category"];

/// `children` values that mark a broken record rather than a real count.
pub const CHILDREN_SENTINELS: [i64; 2] = [-1, 20];

/// One loan applicant.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub children: i64,
    /// Employment length in days. Negative values are a known export artifact.
    pub days_employed: Option<f64>,
    /// Monthly income. Integer-valued once the cleaner has run.
    pub total_income: Option<f64>,
    pub income_type: String,
    pub education: String,
    pub family_status: String,
    pub purpose: String,
    /// 1 if the applicant missed a payment at least once.
    pub debt: u8,
    /// Values of columns the pipeline does not interpret, in header order.
    pub extra: Vec<String>,

    pub total_income_category: Option<IncomeCategory>,
    pub purpose_category: Option<PurposeCategory>,
}

/// The in-memory applicant table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicantTable {
    /// Names of the uninterpreted columns carried in `ApplicantRecord::extra`.
    pub extra_columns: Vec<String>,
    pub records: Vec<ApplicantRecord>,
}

impl ApplicantTable {
    pub fn new(extra_columns: Vec<String>, records: Vec<ApplicantRecord>) -> Self {
        Self {
            extra_columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True once the categorizer has filled both derived columns on every row.
    pub fn is_categorized(&self) -> bool {
        self.records
            .iter()
            .all(|r| r.total_income_category.is_some() && r.purpose_category.is_some())
    }
}

/// Numeric columns that may hold missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    TotalIncome,
    DaysEmployed,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 2] = [NumericColumn::TotalIncome, NumericColumn::DaysEmployed];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::TotalIncome => "total_income",
            NumericColumn::DaysEmployed => "days_employed",
        }
    }

    pub fn get(self, record: &ApplicantRecord) -> Option<f64> {
        match self {
            NumericColumn::TotalIncome => record.total_income,
            NumericColumn::DaysEmployed => record.days_employed,
        }
    }

    pub fn set(self, record: &mut ApplicantRecord, value: f64) {
        match self {
            NumericColumn::TotalIncome => record.total_income = Some(value),
            NumericColumn::DaysEmployed => record.days_employed = Some(value),
        }
    }
}

/// Text columns usable as a grouping key for imputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColumn {
    IncomeType,
    Education,
    FamilyStatus,
    Purpose,
}

impl TextColumn {
    pub fn name(self) -> &'static str {
        match self {
            TextColumn::IncomeType => "income_type",
            TextColumn::Education => "education",
            TextColumn::FamilyStatus => "family_status",
            TextColumn::Purpose => "purpose",
        }
    }

    pub fn get(self, record: &ApplicantRecord) -> &str {
        match self {
            TextColumn::IncomeType => &record.income_type,
            TextColumn::Education => &record.education,
            TextColumn::FamilyStatus => &record.family_status,
            TextColumn::Purpose => &record.purpose,
        }
    }
}

/// Income bracket derived from `total_income`. `A` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    A,
    B,
    C,
    D,
    E,
}

impl IncomeCategory {
    pub const ALL: [IncomeCategory; 5] = [
        IncomeCategory::A,
        IncomeCategory::B,
        IncomeCategory::C,
        IncomeCategory::D,
        IncomeCategory::E,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IncomeCategory::A => "A",
            IncomeCategory::B => "B",
            IncomeCategory::C => "C",
            IncomeCategory::D => "D",
            IncomeCategory::E => "E",
        }
    }
}

impl fmt::Display for IncomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loan purpose bucket derived from the free-text `purpose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PurposeCategory {
    #[serde(rename = "car operations")]
    CarOperations,
    #[serde(rename = "conducting a wedding")]
    Wedding,
    #[serde(rename = "getting an education")]
    Education,
    #[serde(rename = "no category")]
    NoCategory,
    #[serde(rename = "real estate transactions")]
    RealEstate,
}

impl PurposeCategory {
    pub const ALL: [PurposeCategory; 5] = [
        PurposeCategory::CarOperations,
        PurposeCategory::RealEstate,
        PurposeCategory::Wedding,
        PurposeCategory::Education,
        PurposeCategory::NoCategory,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PurposeCategory::CarOperations => "car operations",
            PurposeCategory::RealEstate => "real estate transactions",
            PurposeCategory::Wedding => "conducting a wedding",
            PurposeCategory::Education => "getting an education",
            PurposeCategory::NoCategory => "no category",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for PurposeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Columns the aggregator cross-tabulates against `debt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Children,
    FamilyStatus,
    TotalIncomeCategory,
    PurposeCategory,
}

impl GroupKey {
    pub const ALL: [GroupKey; 4] = [
        GroupKey::Children,
        GroupKey::FamilyStatus,
        GroupKey::TotalIncomeCategory,
        GroupKey::PurposeCategory,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            GroupKey::Children => "children",
            GroupKey::FamilyStatus => "family_status",
            GroupKey::TotalIncomeCategory => "total_income_category",
            GroupKey::PurposeCategory => "purpose_category",
        }
    }

    /// The hypothesis this key's table is meant to inform.
    pub fn question(self) -> &'static str {
        match self {
            GroupKey::Children => {
                "Is there a relationship between the number of children and repaying the loan on time?"
            }
            GroupKey::FamilyStatus => {
                "Is there a relationship between marital status and repaying the loan on time?"
            }
            GroupKey::TotalIncomeCategory => {
                "Is there a relationship between income level and repaying the loan on time?"
            }
            GroupKey::PurposeCategory => {
                "How do different loan purposes affect repaying the loan on time?"
            }
        }
    }
}

/// What to do with fully-duplicated rows once they are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Count duplicates but leave them in the table.
    #[default]
    Keep,
    /// Count duplicates, then remove every occurrence after the first.
    Drop,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    pub delimiter: u8,
    pub duplicates: DuplicatePolicy,
    /// Optional JSON replacement for the built-in purpose keyword table.
    pub keywords: Option<PathBuf>,
    pub export_clean: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            delimiter: b',',
            duplicates: DuplicatePolicy::Keep,
            keywords: None,
            export_clean: None,
            export_report: None,
        }
    }
}
