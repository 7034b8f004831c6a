use super::domain::{Intern, OverflowAction, OverflowGroup, Qualification};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Per-qualification overflow decisions with a fallback for qualifications not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowPlan {
    #[serde(default)]
    pub default_action: OverflowAction,
    #[serde(default)]
    pub actions: BTreeMap<Qualification, OverflowAction>,
}

impl OverflowPlan {
    pub fn new(default_action: OverflowAction) -> Self {
        Self {
            default_action,
            actions: BTreeMap::new(),
        }
    }

    pub fn with(mut self, qualification: impl Into<String>, action: OverflowAction) -> Self {
        self.actions
            .insert(Qualification(qualification.into()), action);
        self
    }

    pub fn action_for(&self, qualification: &Qualification) -> OverflowAction {
        self.actions
            .get(qualification)
            .copied()
            .unwrap_or(self.default_action)
    }
}

/// Applies overflow decisions. Spreading deliberately exceeds nominal capacity.
pub(crate) struct OverflowResolver<R> {
    rng: R,
}

impl<R: Rng> OverflowResolver<R> {
    pub(crate) fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Groups are handled in the order given; the generator is only drawn for groups
    /// that are actually spread.
    pub(crate) fn resolve(
        &mut self,
        roster: &mut [Intern],
        groups: &[OverflowGroup],
        plan: &OverflowPlan,
    ) -> Vec<String> {
        let mut warnings = Vec::with_capacity(groups.len());

        for group in groups {
            let action = plan.action_for(&group.qualification);
            if action == OverflowAction::Spread && !group.facilities.is_empty() {
                let mut facilities = group.facilities.clone();
                facilities.shuffle(&mut self.rng);

                for (position, &index) in group.interns.iter().enumerate() {
                    if let Some(intern) = roster.get_mut(index) {
                        intern.assigned_facility =
                            Some(facilities[position % facilities.len()].clone());
                    }
                }

                warn!(
                    qualification = %group.qualification,
                    interns = group.count(),
                    facilities = facilities.len(),
                    "overflow spread beyond capacity"
                );
                warnings.push(format!(
                    "{}: {} intern(s) spread evenly beyond capacity",
                    group.qualification,
                    group.count()
                ));
            } else {
                warn!(
                    qualification = %group.qualification,
                    interns = group.count(),
                    "overflow left unassigned"
                );
                warnings.push(format!(
                    "{}: {} intern(s) left unassigned (no capacity)",
                    group.qualification,
                    group.count()
                ));
            }
        }

        warnings
    }
}
