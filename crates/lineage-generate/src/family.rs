use chrono::NaiveDate;
use lineage_core::PersonId;

use crate::context::GenerationContext;
use crate::errors::GenerationError;
use crate::ids::IdAllocator;
use crate::model::ChildCountModel;
use crate::person::{PersonSpec, create_person};
use crate::random::RandomSource;

/// People generated together: same birth surname, era and generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingCluster {
    pub members: Vec<PersonId>,
    pub surname: String,
    pub birth_seed: NaiveDate,
    pub age_offset: i32,
    pub generation: i32,
}

impl SiblingCluster {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// [`PersonSpec`] for another member of this cluster's generation.
    pub fn peer_spec(&self) -> PersonSpec {
        PersonSpec::new(self.birth_seed, self.age_offset, self.generation)
    }
}

/// Rounded normal draw clamped to `[0, max]`, raised to 1 when required.
pub fn sample_child_count<R: RandomSource>(
    rng: &mut R,
    model: &ChildCountModel,
    require_at_least_one: bool,
) -> u32 {
    let raw = rng.normal(model.mean, model.std_dev).round();
    let count = raw.clamp(0.0, f64::from(model.max)) as u32;
    if require_at_least_one { count.max(1) } else { count }
}

/// Anchor plus freshly sampled siblings sharing its birth surname.
///
/// The anchor is always the first member.
pub fn build_sibling_cluster<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    anchor: PersonId,
    birth_seed: NaiveDate,
    age_offset: i32,
) -> Result<SiblingCluster, GenerationError> {
    let anchor_record = ctx.tree.person(anchor)?;
    let surname = anchor_record.birth_last.clone();
    let generation = anchor_record.generation;

    let count = sample_child_count(&mut ctx.rng, &ctx.config.child_count, true);
    let mut cluster = SiblingCluster {
        members: vec![anchor],
        surname,
        birth_seed,
        age_offset,
        generation,
    };
    for _ in 1..count {
        let spec = cluster.peer_spec().last_name(cluster.surname.clone());
        cluster.members.push(create_person(ctx, spec)?);
    }
    ctx.report.record_sibling_cluster();
    Ok(cluster)
}

/// Create a couple's children without linking them to the couple.
///
/// Children are born a generation gap after the mother and carry the
/// father's current surname.
pub fn spawn_children<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    mother: PersonId,
    father: PersonId,
    require_at_least_one: bool,
) -> Result<SiblingCluster, GenerationError> {
    let mother_record = ctx.tree.person(mother)?;
    let birth_seed = mother_record.birth_date;
    let generation = mother_record.generation - 1;
    let surname = ctx.tree.person(father)?.last.clone();

    let count = sample_child_count(&mut ctx.rng, &ctx.config.child_count, require_at_least_one);
    let mut cluster = SiblingCluster {
        members: Vec::with_capacity(count as usize),
        surname,
        birth_seed,
        age_offset: ctx.config.younger_offset(),
        generation,
    };
    for _ in 0..count {
        let spec = cluster.peer_spec().last_name(cluster.surname.clone());
        cluster.members.push(create_person(ctx, spec)?);
    }
    ctx.report.record_child_cluster(cluster.len());
    Ok(cluster)
}

/// Create a couple's children and link them to both parents.
pub fn make_children<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    mother: PersonId,
    father: PersonId,
    require_at_least_one: bool,
) -> Result<SiblingCluster, GenerationError> {
    let cluster = spawn_children(ctx, mother, father, require_at_least_one)?;
    for child in &cluster.members {
        ctx.tree.link_child(*child, mother, father)?;
    }
    Ok(cluster)
}
