//! Income brackets.
//!
//! | bracket | `total_income`            |
//! | ------- | ------------------------- |
//! | E       | up to 30 000              |
//! | D       | 30 001 – 50 000           |
//! | C       | 50 001 – 200 000          |
//! | B       | 200 001 – 1 000 000       |
//! | A       | 1 000 001 and more        |
//!
//! Upper bounds are inclusive, so a boundary value lands in the lower bracket.

use crate::domain::IncomeCategory;

/// Inclusive upper bound of each bracket, lowest first. Anything above is `A`.
const BRACKETS: [(i64, IncomeCategory); 4] = [
    (30_000, IncomeCategory::E),
    (50_000, IncomeCategory::D),
    (200_000, IncomeCategory::C),
    (1_000_000, IncomeCategory::B),
];

/// Map an integer income to its bracket.
pub fn categorize_income(total_income: i64) -> IncomeCategory {
    BRACKETS
        .iter()
        .find(|(upper, _)| total_income <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(IncomeCategory::A)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_belong_to_lower_bracket() {
        assert_eq!(categorize_income(0), IncomeCategory::E);
        assert_eq!(categorize_income(25_000), IncomeCategory::E);
        assert_eq!(categorize_income(30_000), IncomeCategory::E);
        assert_eq!(categorize_income(30_001), IncomeCategory::D);
        assert_eq!(categorize_income(50_000), IncomeCategory::D);
        assert_eq!(categorize_income(50_001), IncomeCategory::C);
        assert_eq!(categorize_income(200_000), IncomeCategory::C);
        assert_eq!(categorize_income(200_001), IncomeCategory::B);
        assert_eq!(categorize_income(235_000), IncomeCategory::B);
        assert_eq!(categorize_income(1_000_000), IncomeCategory::B);
        assert_eq!(categorize_income(1_000_001), IncomeCategory::A);
    }

    proptest! {
        // Higher income never lands in a lower bracket (A sorts before E).
        #[test]
        fn brackets_are_monotone(a in 0i64..5_000_000, b in 0i64..5_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(categorize_income(hi) <= categorize_income(lo));
        }
    }
}
