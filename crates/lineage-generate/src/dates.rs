use chrono::{Days, Months, NaiveDate};

use crate::errors::GenerationError;
use crate::model::AgeModel;
use crate::random::RandomSource;

/// Half-width, in years, of the birth window around a seed date.
pub const BIRTH_WINDOW_YEARS: i32 = 2;
/// Earliest marriage age relative to the reference spouse.
pub const MARRIAGE_MIN_AGE: i32 = 16;
/// Latest marriage age relative to the reference spouse.
pub const MARRIAGE_MAX_AGE: i32 = 22;

/// Shift a date by whole years; Feb 29 lands on Feb 28 in common years.
pub fn add_years(date: NaiveDate, years: i32) -> Result<NaiveDate, GenerationError> {
    let months = Months::new(years.unsigned_abs() * 12);
    let shifted = if years >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.ok_or_else(|| GenerationError::DateOutOfRange(format!("{date} shifted by {years} years")))
}

/// Uniform date in the inclusive range `[start, end]`.
pub fn date_between<R: RandomSource + ?Sized>(
    rng: &mut R,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<NaiveDate, GenerationError> {
    let span = (end - start).num_days();
    if span < 0 {
        return Err(GenerationError::DateOutOfRange(format!(
            "empty window {start}..={end}"
        )));
    }
    let offset = rng.uniform_int(span as u64);
    start
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| GenerationError::DateOutOfRange(format!("{start} plus {offset} days")))
}

/// Birth date within `[seed + (offset - 2)y, seed + (offset + 2)y]`.
pub fn birth_date<R: RandomSource + ?Sized>(
    rng: &mut R,
    seed_date: NaiveDate,
    age_offset: i32,
) -> Result<NaiveDate, GenerationError> {
    let start = add_years(seed_date, age_offset - BIRTH_WINDOW_YEARS)?;
    let end = add_years(seed_date, age_offset + BIRTH_WINDOW_YEARS)?;
    date_between(rng, start, end)
}

/// Inclusive bounds of the age-year that starts at `birth + age` years.
///
/// The window ends the day before the next anniversary, and never more
/// than 364 days after its start.
pub fn death_window(birth: NaiveDate, age: i32) -> Result<(NaiveDate, NaiveDate), GenerationError> {
    let start = add_years(birth, age)?;
    let anniversary_eve = add_years(birth, age + 1)?
        .pred_opt()
        .ok_or_else(|| GenerationError::DateOutOfRange(format!("day before {birth} + {age}y")))?;
    let cap = start
        .checked_add_days(Days::new(364))
        .ok_or_else(|| GenerationError::DateOutOfRange(format!("{start} plus 364 days")))?;
    Ok((start, anniversary_eve.min(cap).max(start)))
}

/// Death date somewhere in the person's stated age-year.
pub fn death_date<R: RandomSource + ?Sized>(
    rng: &mut R,
    birth: NaiveDate,
    age: i32,
) -> Result<NaiveDate, GenerationError> {
    let (start, end) = death_window(birth, age)?;
    date_between(rng, start, end)
}

/// Marriage date between the spouse's 16th and 22nd birthdays.
pub fn marriage_date<R: RandomSource + ?Sized>(
    rng: &mut R,
    spouse_birth: NaiveDate,
) -> Result<NaiveDate, GenerationError> {
    let start = add_years(spouse_birth, MARRIAGE_MIN_AGE)?;
    let end = add_years(spouse_birth, MARRIAGE_MAX_AGE)?;
    date_between(rng, start, end)
}

/// Draw an age at death; the flag reports whether clamping changed it.
pub fn sample_age<R: RandomSource + ?Sized>(rng: &mut R, model: &AgeModel) -> (i32, bool) {
    let raw = rng.normal(model.mean, model.std_dev).round();
    let raw = raw.clamp(i32::MIN as f64, i32::MAX as f64) as i32;
    if !model.clamp {
        return (raw, false);
    }
    let age = raw.clamp(model.min, model.max);
    (age, age != raw)
}
