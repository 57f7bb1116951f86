pub mod entity {
    use std::collections::{BTreeSet, HashMap};

    pub type Id = u32;
    pub type Name = String;

    /// Sorted, de-duplicated universe of people. A person's [`Id`] is their
    /// position in sorted order.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Roster {
        names: Vec<Name>,
        index: HashMap<Name, Id>,
    }

    impl Roster {
        pub fn new<I, S>(names: I) -> Roster
        where
            I: IntoIterator<Item = S>,
            S: Into<Name>,
        {
            let names: Vec<Name> = names
                .into_iter()
                .map(Into::into)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let index = names
                .iter()
                .enumerate()
                .map(|(id, name)| (name.clone(), id as Id))
                .collect();
            Roster { names, index }
        }

        pub fn id(&self, name: &str) -> Option<Id> {
            self.index.get(name).copied()
        }

        /// # Panics
        ///
        /// Panics if `id` did not come from this roster.
        pub fn name(&self, id: Id) -> &str {
            &self.names[id as usize]
        }

        pub fn names(&self) -> &[Name] {
            &self.names
        }

        pub fn ids(&self) -> std::ops::Range<Id> {
            0..self.names.len() as Id
        }

        pub fn len(&self) -> usize {
            self.names.len()
        }

        pub fn is_empty(&self) -> bool {
            self.names.is_empty()
        }
    }
}

pub mod preference {
    use std::collections::hash_map::Entry;
    use std::collections::HashMap;

    use itertools::Itertools;
    use tracing::{debug, warn};

    use super::entity::{Id, Name, Roster};
    use crate::error::TentError;

    pub type Score = i64;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PreferenceEntry {
        pub from: Name,
        pub to: Name,
        pub score: Score,
    }

    impl PreferenceEntry {
        pub fn new(from: impl Into<Name>, to: impl Into<Name>, score: Score) -> PreferenceEntry {
            PreferenceEntry { from: from.into(), to: to.into(), score }
        }

        /// Parses a `from,to,score` record. `line` is only used for error reporting.
        pub fn parse(fields: &[&str], line: u64) -> Result<PreferenceEntry, TentError> {
            match fields {
                [from, to, score] => {
                    let score = score.trim().parse::<Score>().map_err(|e| {
                        TentError::MalformedPreferenceRow {
                            line,
                            reason: format!("score {:?} is not an integer ({})", score, e),
                        }
                    })?;
                    Ok(PreferenceEntry::new(from.trim(), to.trim(), score))
                }
                _ => Err(TentError::MalformedPreferenceRow {
                    line,
                    reason: format!("expected 3 fields, found {}", fields.len()),
                }),
            }
        }
    }

    impl Roster {
        /// Everyone named on either side of a preference.
        pub fn from_preferences(entries: &[PreferenceEntry]) -> Roster {
            Roster::new(
                entries
                    .iter()
                    .flat_map(|entry| [entry.from.as_str(), entry.to.as_str()]),
            )
        }
    }

    /// Directed pairwise scores over every ordered pair of distinct people.
    #[derive(Debug, Clone, PartialEq)]
    pub struct PreferenceModel {
        scores: HashMap<(Id, Id), Score>,
        default: Score,
    }

    impl PreferenceModel {
        pub fn build(entries: &[PreferenceEntry], roster: &Roster) -> PreferenceModel {
            let default = 0;
            let mut given = HashMap::new();
            for entry in entries {
                let (Some(from), Some(to)) = (roster.id(&entry.from), roster.id(&entry.to)) else {
                    warn!("Ignoring preference {} -> {}: not on the roster", entry.from, entry.to);
                    continue;
                };
                if from == to {
                    warn!("Ignoring self preference of {}", entry.from);
                    continue;
                }
                match given.entry((from, to)) {
                    Entry::Occupied(_) => {
                        warn!("Duplicate preference {} -> {}, keeping the first", entry.from, entry.to)
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(entry.score);
                    }
                }
            }

            let scores: HashMap<(Id, Id), Score> = roster
                .ids()
                .permutations(2)
                .map(|pair| {
                    let key = (pair[0], pair[1]);
                    (key, given.get(&key).copied().unwrap_or(default))
                })
                .collect();
            debug!(
                "Built preference table: {} given, {} ordered pairs",
                given.len(),
                scores.len()
            );
            PreferenceModel { scores, default }
        }

        pub fn get_pair(&self, ids: [Id; 2]) -> Score {
            self.scores.get(&(ids[0], ids[1])).copied().unwrap_or(self.default)
        }

        pub fn lookup(&self, roster: &Roster, from: &str, to: &str) -> Score {
            match (roster.id(from), roster.id(to)) {
                (Some(from), Some(to)) => self.get_pair([from, to]),
                _ => self.default,
            }
        }

        pub fn len(&self) -> usize {
            self.scores.len()
        }

        pub fn is_empty(&self) -> bool {
            self.scores.is_empty()
        }
    }
}

pub mod slot {
    use std::collections::HashMap;

    use itertools::Itertools;

    use super::entity::{Id, Name};
    use crate::error::TentError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TentCapacity {
        pub label: Name,
        pub capacity: i64,
    }

    impl TentCapacity {
        pub fn new(label: impl Into<Name>, capacity: i64) -> TentCapacity {
            TentCapacity { label: label.into(), capacity }
        }

        /// Parses a `label,capacity` record.
        pub fn parse(fields: &[&str]) -> Result<TentCapacity, TentError> {
            match fields {
                [label, capacity] => {
                    let label = label.trim();
                    let capacity = capacity.trim();
                    match capacity.parse::<i64>() {
                        Ok(value) if value >= 0 => Ok(TentCapacity::new(label, value)),
                        _ => Err(TentError::InvalidCapacity {
                            label: label.to_string(),
                            value: capacity.to_string(),
                        }),
                    }
                }
                _ => Err(TentError::InvalidCapacity {
                    label: fields.first().map(|f| f.trim()).unwrap_or_default().to_string(),
                    value: fields.iter().skip(1).join(","),
                }),
            }
        }
    }

    /// One entry per seat, holding the id of the tent the seat belongs to.
    /// Tent ids index into `labels`, which keeps declaration order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SlotPool {
        labels: Vec<Name>,
        slots: Vec<Id>,
    }

    impl SlotPool {
        /// Total number of seats the records declare, computed without
        /// allocating them.
        pub fn seat_count(capacities: &[TentCapacity]) -> Result<usize, TentError> {
            capacities.iter().try_fold(0usize, |total, record| {
                usize::try_from(record.capacity)
                    .ok()
                    .and_then(|capacity| total.checked_add(capacity))
                    .ok_or_else(|| TentError::InvalidCapacity {
                        label: record.label.clone(),
                        value: record.capacity.to_string(),
                    })
            })
        }

        /// Like [`SlotPool::build`], but checks the seat count against `people`
        /// before any seat is allocated.
        pub fn build_for(capacities: &[TentCapacity], people: usize) -> Result<SlotPool, TentError> {
            let seats = SlotPool::seat_count(capacities)?;
            if seats != people {
                return Err(TentError::CapacityMismatch { seats, people });
            }
            SlotPool::build(capacities)
        }

        pub fn build(capacities: &[TentCapacity]) -> Result<SlotPool, TentError> {
            let mut labels: Vec<Name> = Vec::new();
            let mut slots = Vec::new();
            for record in capacities {
                if record.capacity < 0 {
                    return Err(TentError::InvalidCapacity {
                        label: record.label.clone(),
                        value: record.capacity.to_string(),
                    });
                }
                let tent = match labels.iter().position(|label| *label == record.label) {
                    Some(index) => index as Id,
                    None => {
                        labels.push(record.label.clone());
                        (labels.len() - 1) as Id
                    }
                };
                slots.extend(std::iter::repeat(tent).take(record.capacity as usize));
            }
            Ok(SlotPool { labels, slots })
        }

        pub fn as_slice(&self) -> &[Id] {
            &self.slots
        }

        /// # Panics
        ///
        /// Panics if `tent` did not come from this pool.
        pub fn label(&self, tent: Id) -> &str {
            &self.labels[tent as usize]
        }

        pub fn labels(&self) -> &[Name] {
            &self.labels
        }

        pub fn label_counts(&self) -> HashMap<Id, usize> {
            self.slots.iter().copied().counts()
        }

        pub fn len(&self) -> usize {
            self.slots.len()
        }

        pub fn is_empty(&self) -> bool {
            self.slots.is_empty()
        }

        pub(crate) fn swap(&mut self, a: usize, b: usize) {
            self.slots.swap(a, b);
        }
    }
}

pub mod group {
    use std::collections::{HashMap, HashSet};

    use super::entity::{Id, Roster};
    use super::slot::SlotPool;
    use crate::error::TentError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Seat {
        pub person: Id,
        pub tent: Id,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Group {
        pub tent: Id,
        pub members: Vec<Id>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Assignment {
        pub seats: Vec<Seat>,
    }

    impl Assignment {
        /// Seats the i-th person of the roster in the i-th slot.
        pub fn assign(roster: &Roster, slots: &SlotPool) -> Result<Assignment, TentError> {
            if roster.len() != slots.len() {
                return Err(TentError::CapacityMismatch {
                    seats: slots.len(),
                    people: roster.len(),
                });
            }
            let seats = roster
                .ids()
                .zip(slots.as_slice().iter().copied())
                .map(|(person, tent)| Seat { person, tent })
                .collect();
            Ok(Assignment { seats })
        }

        /// Partitions seats by tent, in order of each tent's first appearance.
        pub fn group_by(&self) -> Vec<Group> {
            let mut groups: Vec<Group> = Vec::new();
            let mut positions: HashMap<Id, usize> = HashMap::new();
            for seat in &self.seats {
                let position = *positions.entry(seat.tent).or_insert_with(|| {
                    groups.push(Group { tent: seat.tent, members: Vec::new() });
                    groups.len() - 1
                });
                groups[position].members.push(seat.person);
            }
            groups
        }

        pub fn tent_of(&self, person: Id) -> Option<Id> {
            self.seats.iter().find(|seat| seat.person == person).map(|seat| seat.tent)
        }

        /// Whether both assignments seat everyone in the same tent, regardless of seat order.
        pub fn same_seating(&self, other: &Assignment) -> bool {
            let ours: HashSet<&Seat> = self.seats.iter().collect();
            let theirs: HashSet<&Seat> = other.seats.iter().collect();
            ours == theirs
        }
    }
}
