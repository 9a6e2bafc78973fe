use lineage_core::{Error as CoreError, Marriage, MarriageKey, PersonId, Sex};

use crate::context::GenerationContext;
use crate::dates;
use crate::errors::GenerationError;
use crate::ids::IdAllocator;
use crate::random::RandomSource;

/// Record a union between `a` and `b`.
///
/// Repeating an existing pair, in either order, returns the stored key
/// without drawing randomness or touching either spouse. A new union picks
/// a place, dates it between the younger spouse's 16th and 22nd birthdays,
/// and flags both spouses married. When exactly one spouse is female she
/// takes the other's surname; any other combination keeps both names.
pub fn marry<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    a: PersonId,
    b: PersonId,
) -> Result<MarriageKey, GenerationError> {
    let key = MarriageKey::new(a, b);
    if ctx.tree.has_marriage(&key) {
        return Ok(key);
    }
    if a == b {
        return Err(CoreError::InvalidTree(format!("{a} cannot marry themselves")).into());
    }

    let (first, second) = key.spouses();
    let spouse1 = ctx.tree.person(first)?.clone();
    let spouse2 = ctx.tree.person(second)?.clone();
    for spouse in [&spouse1, &spouse2] {
        if spouse.is_married {
            return Err(CoreError::InvalidTree(format!("{} is already married", spouse.id)).into());
        }
    }

    let place = ctx.reference.pick_place(&mut ctx.rng);
    let younger_birth = spouse1.birth_date.max(spouse2.birth_date);
    let marriage_date = dates::marriage_date(&mut ctx.rng, younger_birth)?;

    let adoption = match (spouse1.sex, spouse2.sex) {
        (Sex::Female, other) if other != Sex::Female => Some((first, spouse2.last.clone())),
        (other, Sex::Female) if other != Sex::Female => Some((second, spouse1.last.clone())),
        _ => None,
    };
    if let Some((id, surname)) = adoption {
        ctx.tree.person_mut(id)?.last = surname;
    }
    ctx.tree.person_mut(first)?.is_married = true;
    ctx.tree.person_mut(second)?.is_married = true;

    ctx.tree.insert_marriage(Marriage {
        spouse1: first,
        spouse2: second,
        marriage_county_code: place.county_code,
        marriage_county: place.county,
        marriage_city: place.city,
        marriage_date,
    });
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures;
    use crate::model::GenerationReport;
    use crate::person::{PersonSpec, create_person};

    fn couple<R: RandomSource, I: IdAllocator>(
        ctx: &mut GenerationContext<'_, R, I>,
        first: Sex,
        second: Sex,
    ) -> (PersonId, PersonId) {
        let seed = ctx.config.birth_seed_date;
        let a = create_person(ctx, PersonSpec::new(seed, 0, 0).sex(first).last_name("Abbott"))
            .expect("a");
        let b = create_person(ctx, PersonSpec::new(seed, 0, 0).sex(second).last_name("Brandt"))
            .expect("b");
        (a, b)
    }

    #[test]
    fn wife_adopts_husband_surname() {
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
        let (wife, husband) = couple(&mut ctx, Sex::Female, Sex::Male);

        let key = marry(&mut ctx, husband, wife).expect("marry");
        assert_eq!(key.to_string(), "P000001,P000002");

        let wife = ctx.tree.person(wife).expect("wife");
        assert_eq!(wife.last, "Brandt");
        assert_eq!(wife.birth_last, "Abbott");
        assert!(wife.is_married);
        assert_eq!(ctx.tree.person(husband).expect("husband").last, "Brandt");

        let marriage = &ctx.tree.marriages[&key];
        let younger = wife.birth_date.max(ctx.tree.person(husband).expect("husband").birth_date);
        assert!(marriage.marriage_date >= dates::add_years(younger, 16).expect("16"));
        assert!(marriage.marriage_date <= dates::add_years(younger, 22).expect("22"));
    }

    #[test]
    fn repeated_marriage_is_a_no_op() {
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
        let (a, b) = couple(&mut ctx, Sex::Male, Sex::Female);

        let key = marry(&mut ctx, a, b).expect("first");
        let before = ctx.tree.clone();
        let mut probe = ctx.rng.clone();
        let again = marry(&mut ctx, b, a).expect("again");

        assert_eq!(key, again);
        assert_eq!(ctx.tree, before);
        assert_eq!(ctx.tree.marriages.len(), 1);
        assert_eq!(ctx.rng.uniform_int(1_000_000), probe.uniform_int(1_000_000));
    }

    #[test]
    fn same_sex_union_keeps_names() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = fixtures::config();
        let mut ctx = GenerationContext::new(
            fixtures::source(9),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );
        let (a, b) = couple(&mut ctx, Sex::Female, Sex::Female);
        marry(&mut ctx, a, b).expect("marry");
        assert_eq!(ctx.tree.person(a).expect("a").last, "Abbott");
        assert_eq!(ctx.tree.person(b).expect("b").last, "Brandt");
    }

    #[test]
    fn second_spouse_is_rejected() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = fixtures::config();
        let mut ctx = GenerationContext::new(
            fixtures::source(9),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );
        let (a, b) = couple(&mut ctx, Sex::Male, Sex::Female);
        let (c, _) = couple(&mut ctx, Sex::Female, Sex::Male);
        marry(&mut ctx, a, b).expect("marry");
        assert!(marry(&mut ctx, a, c).is_err());
    }
}
