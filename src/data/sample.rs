//! Synthetic applicant datasets.
//!
//! Generates tables shaped like the bank's export, including its defects, so
//! the pipeline can be exercised without the real data:
//!
//! - `days_employed` and `total_income` missing together on ~10% of rows
//! - employees' `days_employed` stored negative, pensioners' absurdly large
//! - sentinel `children` values (-1, 20)
//! - `education` in mixed case
//! - exact duplicate rows (copies of rows with missing cells)
//!
//! Output is deterministic for a given seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{ApplicantRecord, ApplicantTable};
use crate::error::AppError;

/// Columns the bank export carries that the pipeline does not interpret.
pub const SOURCE_EXTRA_COLUMNS: [&str; 4] = ["dob_years", "education_id", "family_status_id", "gender"];

const INCOME_TYPES: [(&str, f64); 4] = [
    ("сотрудник", 0.52),
    ("компаньон", 0.24),
    ("пенсионер", 0.17),
    ("госслужащий", 0.07),
];

const EDUCATION: [(&str, f64); 5] = [
    ("среднее", 0.71),
    ("высшее", 0.24),
    ("неоконченное высшее", 0.035),
    ("начальное", 0.013),
    ("ученая степень", 0.002),
];

const FAMILY_STATUS: [(&str, f64); 5] = [
    ("женат / замужем", 0.58),
    ("гражданский брак", 0.19),
    ("Не женат / не замужем", 0.13),
    ("в разводе", 0.055),
    ("вдовец / вдова", 0.045),
];

const PURPOSES: [&str; 20] = [
    "покупка жилья",
    "приобретение автомобиля",
    "дополнительное образование",
    "сыграть свадьбу",
    "операции с жильем",
    "образование",
    "на проведение свадьбы",
    "покупка жилья для семьи",
    "покупка недвижимости",
    "покупка коммерческой недвижимости",
    "покупка жилой недвижимости",
    "строительство собственной недвижимости",
    "недвижимость",
    "строительство недвижимости",
    "на покупку подержанного автомобиля",
    "на покупку своего автомобиля",
    "получение высшего образования",
    "свадьба",
    "заняться образованием",
    "ремонт жилью",
];

const CHILDREN: [(i64, f64); 6] = [(0, 0.66), (1, 0.22), (2, 0.095), (3, 0.015), (4, 0.002), (5, 0.001)];

/// Parameters for [`generate_sample`].
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    /// Share of rows with both numeric cells missing.
    pub missing_share: f64,
    /// Share of rows with a sentinel `children` value.
    pub sentinel_share: f64,
    /// Share of rows that are copies of earlier rows.
    pub duplicate_share: f64,
    /// Probability of `debt = 1`.
    pub debt_share: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 1_000,
            seed: 42,
            missing_share: 0.10,
            sentinel_share: 0.006,
            duplicate_share: 0.003,
            debt_share: 0.08,
        }
    }
}

/// Generate a synthetic applicant table.
pub fn generate_sample(config: &SampleConfig) -> Result<ApplicantTable, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(2, "Row count must be > 0."));
    }
    for (name, p) in [
        ("missing share", config.missing_share),
        ("sentinel share", config.sentinel_share),
        ("duplicate share", config.duplicate_share),
        ("debt share", config.debt_share),
    ] {
        if !(0.0..1.0).contains(&p) {
            return Err(AppError::new(2, format!("Invalid {name}: {p} (must be in [0, 1)).")));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let income = LogNormal::<f64>::new(145_000f64.ln(), 0.55)
        .map_err(|e| AppError::new(4, format!("Income distribution error: {e}")))?;
    let tenure = Normal::<f64>::new(2_200.0, 1_800.0)
        .map_err(|e| AppError::new(4, format!("Tenure distribution error: {e}")))?;

    let mut records: Vec<ApplicantRecord> = Vec::with_capacity(config.rows);
    // Keep one observed row per income type so every group has a median.
    let mut seeded = [false; INCOME_TYPES.len()];

    for _ in 0..config.rows {
        if rng.gen_bool(config.duplicate_share) {
            let copy = records
                .iter()
                .filter(|r| r.total_income.is_none())
                .choose(&mut rng)
                .cloned();
            if let Some(copy) = copy {
                records.push(copy);
                continue;
            }
        }

        let type_idx = pick_index(&mut rng, &INCOME_TYPES.map(|(_, w)| w));
        let income_type = INCOME_TYPES[type_idx].0;
        let pensioner = income_type == "пенсионер";

        let missing = seeded[type_idx] && rng.gen_bool(config.missing_share);
        seeded[type_idx] |= !missing;

        let days_employed = (!missing).then(|| {
            if pensioner {
                rng.gen_range(330_000.0..401_000.0)
            } else {
                -tenure.sample(&mut rng).abs().max(24.0)
            }
        });
        let total_income = (!missing).then(|| income.sample(&mut rng));

        let children = if rng.gen_bool(config.sentinel_share) {
            *[-1, 20].choose(&mut rng).unwrap_or(&-1)
        } else {
            CHILDREN[pick_index(&mut rng, &CHILDREN.map(|(_, w)| w))].0
        };

        let education_idx = pick_index(&mut rng, &EDUCATION.map(|(_, w)| w));
        let family_idx = pick_index(&mut rng, &FAMILY_STATUS.map(|(_, w)| w));
        let dob_years = if pensioner { rng.gen_range(55..76) } else { rng.gen_range(19..65) };

        records.push(ApplicantRecord {
            children,
            days_employed,
            total_income,
            income_type: income_type.to_string(),
            education: vary_case(&mut rng, EDUCATION[education_idx].0),
            family_status: FAMILY_STATUS[family_idx].0.to_string(),
            purpose: PURPOSES.choose(&mut rng).copied().unwrap_or(PURPOSES[0]).to_string(),
            debt: u8::from(rng.gen_bool(config.debt_share)),
            extra: vec![
                dob_years.to_string(),
                education_idx.to_string(),
                family_idx.to_string(),
                if rng.gen_bool(0.66) { "F" } else { "M" }.to_string(),
            ],
            total_income_category: None,
            purpose_category: None,
        });
    }

    Ok(ApplicantTable::new(
        SOURCE_EXTRA_COLUMNS.iter().map(|c| c.to_string()).collect(),
        records,
    ))
}

/// Draw an index with probability proportional to its weight.
fn pick_index(rng: &mut StdRng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    let mut u = rng.gen_range(0.0..total);
    for (i, w) in weights.iter().enumerate() {
        if u < *w {
            return i;
        }
        u -= w;
    }
    weights.len() - 1
}

/// Most values stay lowercase; some come back capitalized or shouted.
fn vary_case(rng: &mut StdRng, text: &str) -> String {
    match rng.gen_range(0..20) {
        0 => text.to_uppercase(),
        1 => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CHILDREN_SENTINELS;

    #[test]
    fn same_seed_same_table() {
        let config = SampleConfig { rows: 300, ..SampleConfig::default() };
        assert_eq!(generate_sample(&config).unwrap(), generate_sample(&config).unwrap());
    }

    #[test]
    fn sample_carries_the_known_defects() {
        let config = SampleConfig {
            rows: 3_000,
            sentinel_share: 0.02,
            duplicate_share: 0.05,
            ..SampleConfig::default()
        };
        let table = generate_sample(&config).unwrap();

        assert_eq!(table.len(), 3_000);
        assert_eq!(table.extra_columns, SOURCE_EXTRA_COLUMNS);
        assert!(table.records.iter().any(|r| r.total_income.is_none()));
        assert!(table.records.iter().any(|r| r.days_employed.is_some_and(|d| d < 0.0)));
        assert!(table.records.iter().any(|r| CHILDREN_SENTINELS.contains(&r.children)));
        assert!(table.records.iter().any(|r| r.education != r.education.to_lowercase()));
    }

    #[test]
    fn zero_rows_is_rejected() {
        let config = SampleConfig { rows: 0, ..SampleConfig::default() };
        assert_eq!(generate_sample(&config).unwrap_err().exit_code(), 2);
    }
}
