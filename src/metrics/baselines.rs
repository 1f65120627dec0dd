//! Age- and sex-adjusted expectations the pillar scorers compare against.

use super::types::Sex;

/// Added to the age-bucket VO2max base for males.
const MALE_VO2_OFFSET: f64 = 6.0;

/// Expected VO2max (ml/kg/min) for the given age and sex.
pub fn vo2_max_baseline(age: i32, sex: Sex) -> f64 {
    let base = match age {
        i32::MIN..=29 => 38.0,
        30..=39 => 36.0,
        40..=49 => 33.0,
        50..=59 => 30.0,
        60..=69 => 27.0,
        _ => 24.0,
    };
    match sex {
        Sex::Male => base + MALE_VO2_OFFSET,
        Sex::Female => base,
    }
}

/// Expected simple reaction time in milliseconds; rises with age.
pub fn reaction_time_baseline(age: i32) -> i32 {
    match age {
        i32::MIN..=19 => 200,
        20..=29 => 220,
        30..=39 => 240,
        40..=49 => 260,
        50..=59 => 280,
        60..=69 => 300,
        _ => 320,
    }
}
