use lineage_core::{PersonId, Sex};
use tracing::debug;

use crate::context::GenerationContext;
use crate::errors::GenerationError;
use crate::family::{SiblingCluster, build_sibling_cluster, make_children};
use crate::ids::IdAllocator;
use crate::marriage::marry;
use crate::person::create_person;
use crate::random::RandomSource;

/// Grow the tree outward from `cluster`.
///
/// Gives the cluster a pair of parents, builds each parent's own sibling
/// cluster, runs the lateral partnering pass over the cluster, and only
/// then ascends into the two parent clusters at `depth + 1`. Partners'
/// sibling clusters are expanded at the same depth with `sideways + 1`.
/// Recursion stops at the configured depth limits.
pub fn expand<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    cluster: &SiblingCluster,
    depth: u32,
    sideways: u32,
) -> Result<(), GenerationError> {
    if depth >= ctx.config.tree_depth_limit || cluster.is_empty() {
        return Ok(());
    }
    ctx.report.record_cluster_expanded();
    debug!(
        depth,
        sideways,
        size = cluster.len(),
        surname = %cluster.surname,
        "expanding cluster"
    );

    let (mother_cluster, father_cluster) = add_parents(ctx, cluster)?;

    for member in &cluster.members {
        partner_member(ctx, cluster, *member, depth, sideways)?;
    }

    expand(ctx, &mother_cluster, depth + 1, sideways)?;
    expand(ctx, &father_cluster, depth + 1, sideways)
}

/// Create, marry and link the cluster's parents; return their sibling
/// clusters as `(mother's, father's)`.
fn add_parents<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    cluster: &SiblingCluster,
) -> Result<(SiblingCluster, SiblingCluster), GenerationError> {
    let birth_seed = cluster.birth_seed;
    let age_offset = cluster.age_offset + ctx.config.older_offset();
    let generation = cluster.generation + 1;

    let mut father_spec = cluster.peer_spec().sex(Sex::Male).last_name(cluster.surname.clone());
    father_spec.age_offset = age_offset;
    father_spec.generation = generation;
    let father = create_person(ctx, father_spec)?;

    let mut mother_spec = cluster.peer_spec().sex(Sex::Female);
    mother_spec.age_offset = age_offset;
    mother_spec.generation = generation;
    let mother = create_person(ctx, mother_spec)?;

    marry(ctx, father, mother)?;
    for child in &cluster.members {
        ctx.tree.link_child(*child, mother, father)?;
    }

    let mother_cluster = build_sibling_cluster(ctx, mother, birth_seed, age_offset)?;
    let father_cluster = build_sibling_cluster(ctx, father, birth_seed, age_offset)?;
    Ok((mother_cluster, father_cluster))
}

/// Lateral pass for one cluster member.
fn partner_member<R: RandomSource, I: IdAllocator>(
    ctx: &mut GenerationContext<'_, R, I>,
    cluster: &SiblingCluster,
    member: PersonId,
    depth: u32,
    sideways: u32,
) -> Result<(), GenerationError> {
    let person = ctx.tree.person(member)?;
    if person.is_married {
        return Ok(());
    }
    // Unknown sex never partners or parents.
    let Some(partner_sex) = person.sex.opposite() else {
        return Ok(());
    };
    let member_sex = person.sex;
    if ctx.rng.uniform_float() >= ctx.config.partner_probability {
        return Ok(());
    }

    let partner = create_person(ctx, cluster.peer_spec().sex(partner_sex))?;
    marry(ctx, member, partner)?;
    ctx.report.record_partnership();

    let (mother, father) = if member_sex == Sex::Female {
        (member, partner)
    } else {
        (partner, member)
    };
    make_children(ctx, mother, father, false)?;

    if sideways + 1 < ctx.config.sibling_partner_depth_limit {
        let partner_cluster =
            build_sibling_cluster(ctx, partner, cluster.birth_seed, cluster.age_offset)?;
        expand(ctx, &partner_cluster, depth, sideways + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures;
    use crate::family::spawn_children;
    use crate::model::{ChildCountModel, GenerationReport, TreeConfig};
    use crate::person::PersonSpec;

    fn root_cluster<R: RandomSource, I: IdAllocator>(
        ctx: &mut GenerationContext<'_, R, I>,
    ) -> SiblingCluster {
        let seed = ctx.config.birth_seed_date;
        let father = create_person(ctx, PersonSpec::new(seed, 0, 1).sex(Sex::Male))
            .expect("seed father");
        let mother = create_person(ctx, PersonSpec::new(seed, 0, 1).sex(Sex::Female))
            .expect("seed mother");
        marry(ctx, father, mother).expect("seed marriage");
        spawn_children(ctx, mother, father, true).expect("root cluster")
    }

    #[test]
    fn zero_depth_limit_adds_nobody() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = TreeConfig {
            tree_depth_limit: 0,
            ..TreeConfig::default()
        };
        let mut ctx = GenerationContext::new(
            fixtures::source(7),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );
        let root = root_cluster(&mut ctx);
        let before = ctx.tree.population();
        expand(&mut ctx, &root, 0, 0).expect("expand");
        assert_eq!(ctx.tree.population(), before);
    }

    #[test]
    fn one_level_gives_root_cluster_parents() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = TreeConfig {
            tree_depth_limit: 1,
            partner_probability: 0.0,
            ..TreeConfig::default()
        };
        let mut ctx = GenerationContext::new(
            fixtures::source(7),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );
        let root = root_cluster(&mut ctx);
        expand(&mut ctx, &root, 0, 0).expect("expand");

        let first = ctx.tree.person(root.members[0]).expect("root child");
        let (mother, father) = (first.mother.expect("mother"), first.father.expect("father"));
        for member in &root.members {
            let person = ctx.tree.person(*member).expect("member");
            assert_eq!(person.mother, Some(mother));
            assert_eq!(person.father, Some(father));
        }
        let father = ctx.tree.person(father).expect("father");
        assert_eq!(father.birth_last, root.surname);
        assert_eq!(father.generation, 1);
        assert_eq!(ctx.tree.person(mother).expect("mother").last, root.surname);
        assert!(ctx.tree.people.values().all(|p| p.generation <= 1));
        lineage_core::validate_tree(&ctx.tree).expect("consistent");
    }

    #[test]
    fn unknown_sex_members_are_never_partnered() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = TreeConfig {
            tree_depth_limit: 1,
            partner_probability: 1.0,
            ..TreeConfig::default()
        };
        let mut ctx = GenerationContext::new(
            fixtures::source(17),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );
        let seed = config.birth_seed_date;
        let mut members = Vec::new();
        for _ in 0..3 {
            let spec = PersonSpec::new(seed, 0, 0).sex(Sex::Unknown).last_name("Vale");
            members.push(create_person(&mut ctx, spec).expect("unknown"));
        }
        let cluster = SiblingCluster {
            members: members.clone(),
            surname: "Vale".to_string(),
            birth_seed: seed,
            age_offset: 0,
            generation: 0,
        };
        expand(&mut ctx, &cluster, 0, 0).expect("expand");

        for id in members {
            let person = ctx.tree.person(id).expect("unknown");
            assert!(!person.is_married);
            assert!(person.children.is_empty());
        }
    }

    #[test]
    fn lateral_couples_may_stay_childless() {
        let reference = fixtures::reference();
        let names = fixtures::names();
        let config = TreeConfig {
            tree_depth_limit: 1,
            sibling_partner_depth_limit: 1,
            partner_probability: 1.0,
            child_count: ChildCountModel {
                mean: -5.0,
                std_dev: 0.0,
                max: 10,
            },
            ..TreeConfig::default()
        };
        let mut ctx = GenerationContext::new(
            fixtures::source(23),
            fixtures::ids(),
            &reference,
            &names,
            &config,
            GenerationReport::default(),
        );
        let seed = config.birth_seed_date;
        let spec = PersonSpec::new(seed, 0, 0).sex(Sex::Male).last_name("Oaks");
        let member = create_person(&mut ctx, spec).expect("member");
        let cluster = SiblingCluster {
            members: vec![member],
            surname: "Oaks".to_string(),
            birth_seed: seed,
            age_offset: 0,
            generation: 0,
        };
        expand(&mut ctx, &cluster, 0, 0).expect("expand");

        let person = ctx.tree.person(member).expect("member");
        assert!(person.is_married);
        assert!(person.children.is_empty());
        // Cluster parents still get their one child.
        let mother = person.mother.expect("mother");
        let father = person.father.expect("father");
        assert_eq!(ctx.tree.children_of(mother, father), vec![member]);
    }
}
