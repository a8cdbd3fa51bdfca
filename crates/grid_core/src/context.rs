use fxhash::FxHashMap;

use crate::achievements::{Achievement, AchievementCatalog};
use crate::constraint::Constraint;
use crate::models::{AchievementId, DatasetVersion, LeagueDataset};

/// A dataset paired with the catalog that interprets it.
///
/// The achievement list is fetched from the catalog once here rather than on
/// every query.
pub struct LeagueContext<'a> {
    pub dataset: &'a LeagueDataset,
    pub catalog: &'a dyn AchievementCatalog,
    achievements: Vec<Achievement>,
    slots: FxHashMap<AchievementId, usize>,
}

impl<'a> LeagueContext<'a> {
    pub fn new(dataset: &'a LeagueDataset, catalog: &'a dyn AchievementCatalog) -> Self {
        let achievements = catalog.list_achievements(dataset.sport, dataset.season_index.as_ref());
        let slots = achievements.iter().enumerate().map(|(slot, a)| (a.id.clone(), slot)).collect();
        Self { dataset, catalog, achievements, slots }
    }

    pub fn version(&self) -> DatasetVersion {
        self.dataset.version
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn achievement(&self, id: &AchievementId) -> Option<&Achievement> {
        self.slots.get(id).map(|&slot| &self.achievements[slot])
    }

    pub fn constraint_for(achievement: &Achievement) -> Constraint {
        Constraint::achievement(achievement.id.clone(), achievement.is_season_specific())
    }

    pub fn label(&self, constraint: &Constraint) -> String {
        match constraint {
            Constraint::Team { team_id } => self
                .dataset
                .team(*team_id)
                .map(|team| team.display_name())
                .unwrap_or_else(|| format!("Team {team_id}")),
            Constraint::Achievement { id, .. } => {
                self.achievement(id).map(|a| a.label.clone()).unwrap_or_else(|| id.to_string())
            }
        }
    }
}
