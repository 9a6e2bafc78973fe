use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::person::{Person, PersonId};
use crate::tree::FamilyTree;

/// Structural problem found in a family tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeIssue {
    pub code: String,
    /// Person id or marriage key the issue is about.
    pub subject: String,
    pub message: String,
}

impl TreeIssue {
    fn new(code: &str, subject: impl ToString, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            subject: subject.to_string(),
            message: message.into(),
        }
    }
}

/// Validate internal consistency of a family tree.
///
/// Returns the first issue found by [`tree_issues`].
pub fn validate_tree(tree: &FamilyTree) -> Result<()> {
    match tree_issues(tree).into_iter().next() {
        Some(issue) => Err(Error::InvalidTree(format!(
            "{} ({}): {}",
            issue.code, issue.subject, issue.message
        ))),
        None => Ok(()),
    }
}

/// Collect every structural issue in a family tree.
///
/// This checks:
/// - store keys match record identifiers
/// - parent links and children lists agree in both directions
/// - parents are born before their children
/// - marriage keys are canonical, spouses exist and are flagged married
/// - nobody takes part in more than one marriage
/// - nobody dies before being born
pub fn tree_issues(tree: &FamilyTree) -> Vec<TreeIssue> {
    let mut issues = Vec::new();

    for (id, person) in &tree.people {
        if *id != person.id {
            issues.push(TreeIssue::new(
                "id_mismatch",
                id,
                format!("stored under {} but records id {}", id, person.id),
            ));
        }
        if person.death_date < person.birth_date {
            issues.push(TreeIssue::new(
                "death_before_birth",
                id,
                format!("died {} before birth {}", person.death_date, person.birth_date),
            ));
        }
        check_parent_link(tree, person, person.mother, "mother", &mut issues);
        check_parent_link(tree, person, person.father, "father", &mut issues);
        check_children(tree, person, &mut issues);
    }

    let mut unions: BTreeMap<PersonId, usize> = BTreeMap::new();
    for (key, marriage) in &tree.marriages {
        if marriage.key() != *key {
            issues.push(TreeIssue::new(
                "marriage_key_mismatch",
                key,
                format!("spouses {} and {} do not match key", marriage.spouse1, marriage.spouse2),
            ));
        }
        if marriage.spouse1 == marriage.spouse2 {
            issues.push(TreeIssue::new("self_marriage", key, "spouses are the same person"));
        }
        for spouse in [marriage.spouse1, marriage.spouse2] {
            *unions.entry(spouse).or_insert(0) += 1;
            match tree.people.get(&spouse) {
                None => issues.push(TreeIssue::new(
                    "dangling_spouse",
                    key,
                    format!("spouse {spouse} not found"),
                )),
                Some(record) if !record.is_married => issues.push(TreeIssue::new(
                    "spouse_not_married",
                    key,
                    format!("spouse {spouse} is not flagged married"),
                )),
                Some(_) => {}
            }
        }
    }

    for (id, count) in unions {
        if count > 1 {
            issues.push(TreeIssue::new(
                "multiple_marriages",
                id,
                format!("takes part in {count} marriages"),
            ));
        }
    }

    issues
}

fn check_parent_link(
    tree: &FamilyTree,
    person: &Person,
    parent: Option<PersonId>,
    role: &str,
    issues: &mut Vec<TreeIssue>,
) {
    let Some(parent_id) = parent else {
        return;
    };
    if parent_id == person.id {
        issues.push(TreeIssue::new(
            "self_parent",
            person.id,
            format!("is recorded as own {role}"),
        ));
        return;
    }
    let Some(parent) = tree.people.get(&parent_id) else {
        issues.push(TreeIssue::new(
            "dangling_parent",
            person.id,
            format!("{role} {parent_id} not found"),
        ));
        return;
    };
    if !parent.children.contains(&person.id) {
        issues.push(TreeIssue::new(
            "missing_child_link",
            person.id,
            format!("{role} {parent_id} does not list this child"),
        ));
    }
    if parent.birth_date >= person.birth_date {
        issues.push(TreeIssue::new(
            "parent_not_older",
            person.id,
            format!(
                "{role} {parent_id} born {} is not older than child born {}",
                parent.birth_date, person.birth_date
            ),
        ));
    }
}

fn check_children(tree: &FamilyTree, person: &Person, issues: &mut Vec<TreeIssue>) {
    let mut seen = BTreeSet::new();
    for child_id in &person.children {
        if !seen.insert(*child_id) {
            issues.push(TreeIssue::new(
                "duplicate_child",
                person.id,
                format!("lists child {child_id} more than once"),
            ));
            continue;
        }
        match tree.people.get(child_id) {
            None => issues.push(TreeIssue::new(
                "dangling_child",
                person.id,
                format!("child {child_id} not found"),
            )),
            Some(child) => {
                if child.mother != Some(person.id) && child.father != Some(person.id) {
                    issues.push(TreeIssue::new(
                        "missing_parent_link",
                        person.id,
                        format!("child {child_id} does not link back to this parent"),
                    ));
                }
            }
        }
    }
}
