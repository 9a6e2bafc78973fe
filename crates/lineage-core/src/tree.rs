use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::marriage::{Marriage, MarriageKey};
use crate::person::{Person, PersonId};

/// Owned store of people and marriages for one generation run.
///
/// People are keyed by identifier, marriages by canonical pair. Both maps
/// iterate in key order, which keeps serialization stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FamilyTree {
    pub people: BTreeMap<PersonId, Person>,
    pub marriages: BTreeMap<MarriageKey, Marriage>,
}

impl FamilyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn population(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.people
            .get(&id)
            .ok_or_else(|| Error::UnknownPerson(id.to_string()))
    }

    pub fn person_mut(&mut self, id: PersonId) -> Result<&mut Person> {
        self.people
            .get_mut(&id)
            .ok_or_else(|| Error::UnknownPerson(id.to_string()))
    }

    pub fn insert_person(&mut self, person: Person) -> Result<()> {
        if self.people.contains_key(&person.id) {
            return Err(Error::DuplicatePerson(person.id.to_string()));
        }
        self.people.insert(person.id, person);
        Ok(())
    }

    pub fn has_marriage(&self, key: &MarriageKey) -> bool {
        self.marriages.contains_key(key)
    }

    /// Store a marriage; returns `false` and leaves the store untouched when
    /// the pair is already recorded.
    pub fn insert_marriage(&mut self, marriage: Marriage) -> bool {
        let key = marriage.key();
        if self.marriages.contains_key(&key) {
            return false;
        }
        self.marriages.insert(key, marriage);
        true
    }

    /// Attach `child` to both parents, updating the child's back-links and
    /// each parent's children list.
    pub fn link_child(&mut self, child: PersonId, mother: PersonId, father: PersonId) -> Result<()> {
        self.person(mother)?;
        self.person(father)?;

        let record = self.person_mut(child)?;
        if record.mother.is_some() || record.father.is_some() {
            return Err(Error::ParentAlreadySet(child.to_string()));
        }
        record.mother = Some(mother);
        record.father = Some(father);

        self.person_mut(mother)?.children.push(child);
        self.person_mut(father)?.children.push(child);
        Ok(())
    }

    /// Children of a couple in birth-registration order.
    pub fn children_of(&self, mother: PersonId, father: PersonId) -> Vec<PersonId> {
        self.people
            .get(&mother)
            .map(|record| {
                record
                    .children
                    .iter()
                    .copied()
                    .filter(|child| {
                        self.people
                            .get(child)
                            .is_some_and(|c| c.father == Some(father))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
