use itertools::Itertools;

use crate::model::entity::Id;
use crate::model::group::{Assignment, Group};
use crate::model::preference::{PreferenceModel, Score};

pub fn individual_value(from: Id, to: Id, prefs: &PreferenceModel) -> Score {
    prefs.get_pair([from, to])
}

/// Sum over every ordered pair of distinct members. Mutual preferences count
/// once in each direction. Sums saturate at the bounds of [`Score`].
pub fn group_value(members: &[Id], prefs: &PreferenceModel) -> Score {
    members
        .iter()
        .permutations(2)
        .map(|pair| individual_value(*pair[0], *pair[1], prefs))
        .fold(0, Score::saturating_add)
}

impl Group {
    pub fn calc_score(&self, prefs: &PreferenceModel) -> Score {
        group_value(&self.members, prefs)
    }
}

pub fn total_value(assignment: &Assignment, prefs: &PreferenceModel) -> Score {
    assignment
        .group_by()
        .iter()
        .map(|group| group.calc_score(prefs))
        .fold(0, Score::saturating_add)
}
