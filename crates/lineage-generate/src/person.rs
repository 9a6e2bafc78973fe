use chrono::NaiveDate;
use lineage_core::{Error as CoreError, Person, PersonId, Sex};
use tracing::debug;

use crate::context::GenerationContext;
use crate::dates;
use crate::errors::GenerationError;
use crate::ids::IdAllocator;
use crate::model::SexWeights;
use crate::random::RandomSource;

/// What the caller pins down about a new person; everything else is sampled.
#[derive(Debug, Clone)]
pub struct PersonSpec {
    pub sex: Option<Sex>,
    pub last_name: Option<String>,
    pub birth_seed: NaiveDate,
    /// Years added to `birth_seed` before sampling the birth window.
    pub age_offset: i32,
    pub generation: i32,
}

impl PersonSpec {
    pub fn new(birth_seed: NaiveDate, age_offset: i32, generation: i32) -> Self {
        Self {
            sex: None,
            last_name: None,
            birth_seed,
            age_offset,
            generation,
        }
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn last_name(mut self, last: impl Into<String>) -> Self {
        self.last_name = Some(last.into());
        self
    }
}

pub fn sample_sex<R: RandomSource>(rng: &mut R, weights: &SexWeights) -> Sex {
    let roll = rng.uniform_float();
    if roll < weights.male {
        Sex::Male
    } else if roll < weights.male + weights.female {
        Sex::Female
    } else {
        Sex::Unknown
    }
}

/// Build a fully populated person and register it in the tree.
///
/// Draw order is fixed: sex, first and middle name, id, surname, birth
/// place, death place, birth date, age, death date.
pub fn create_person<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    spec: PersonSpec,
) -> Result<PersonId, GenerationError> {
    let sex = match spec.sex {
        Some(sex) => sex,
        None => sample_sex(&mut ctx.rng, &ctx.config.sex),
    };
    let first = ctx.names.first_name(sex, &mut ctx.rng);
    let middle = ctx.names.first_name(sex, &mut ctx.rng);
    let id = ctx.ids.next_id()?;
    let last = match spec.last_name {
        Some(last) => last,
        None => ctx.names.surname(&mut ctx.rng),
    };

    let birth_place = ctx.reference.pick_place(&mut ctx.rng);
    let death_place = ctx.reference.pick_place(&mut ctx.rng);

    let birth_date = dates::birth_date(&mut ctx.rng, spec.birth_seed, spec.age_offset)?;
    let (age, clamped) = dates::sample_age(&mut ctx.rng, &ctx.config.age);
    if clamped {
        ctx.report.record_age_clamped();
        debug!(person = %id, age, "age clamped");
    }
    let death_date = dates::death_date(&mut ctx.rng, birth_date, age)?;

    let person = Person {
        id,
        first,
        middle,
        birth_last: last.clone(),
        last,
        sex,
        birth_county_code: birth_place.county_code,
        birth_county: birth_place.county,
        birth_city: birth_place.city,
        death_county_code: death_place.county_code,
        death_county: death_place.county,
        death_city: death_place.city,
        birth_date,
        death_date,
        age,
        generation: spec.generation,
        is_married: false,
        mother: None,
        father: None,
        children: Vec::new(),
    };

    ctx.tree.insert_person(person).map_err(|err| match err {
        CoreError::DuplicatePerson(id) => GenerationError::DuplicateId(id),
        other => GenerationError::Integrity(other),
    })?;
    ctx.report.record_generation(spec.generation);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures;
    use crate::model::GenerationReport;

    #[test]
    fn sex_weights_split_unit_interval() {
        let weights = SexWeights::default();
        let mut rng = fixtures::source(3);
        let mut seen = [0usize; 3];
        for _ in 0..2000 {
            match sample_sex(&mut rng, &weights) {
                Sex::Male => seen[0] += 1,
                Sex::Female => seen[1] += 1,
                Sex::Unknown => seen[2] += 1,
            }
        }
        assert!(seen[0] > 800 && seen[1] > 800);
        assert!(seen[2] < 120);
    }

    #[test]
    fn created_person_is_registered_and_complete() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = fixtures::config();
        let mut ctx = GenerationContext::new(
            fixtures::source(7),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );

        let spec = PersonSpec::new(config.birth_seed_date, 0, 0)
            .sex(Sex::Female)
            .last_name("Hartley");
        let id = create_person(&mut ctx, spec).expect("person");
        let person = ctx.tree.person(id).expect("stored");

        assert_eq!(person.id.to_string(), "P000001");
        assert_eq!(person.sex, Sex::Female);
        assert_eq!(person.last, "Hartley");
        assert_eq!(person.birth_last, "Hartley");
        assert!(["Edith", "Mabel"].contains(&person.first.as_str()));
        assert!(person.death_date >= person.birth_date);
        assert!(!person.is_married);
        assert!(person.children.is_empty());
        if person.birth_county_code == "031" {
            assert_eq!(person.birth_city, "Chicago");
        }
    }

    struct StuckIds;

    impl IdAllocator for StuckIds {
        fn next_id(&mut self) -> Result<PersonId, GenerationError> {
            Ok(PersonId::new(1))
        }
    }

    #[test]
    fn reused_identifier_is_reported() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = fixtures::config();
        let mut ctx = GenerationContext::new(
            fixtures::source(7),
            StuckIds,
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );

        let spec = PersonSpec::new(config.birth_seed_date, 0, 0);
        create_person(&mut ctx, spec.clone()).expect("first");
        let err = create_person(&mut ctx, spec).expect_err("duplicate");
        assert!(matches!(err, GenerationError::DuplicateId(ref id) if id == "P000001"));
    }
}
