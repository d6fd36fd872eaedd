//! Subject-to-class matching and the per-class eligible teacher sets.

use crate::config::SchedulerConfig;
use crate::data::{ClassSection, SchedulingInput};
use itertools::Itertools;
use log::{debug, warn};
use std::collections::HashMap;

/// Whether a record scoped to (level, section[, field of study]) applies to `class`.
///
/// Field of study only takes part in the match at specialized levels.
pub(crate) fn scope_matches(
    config: &SchedulerConfig,
    class: &ClassSection,
    level: i32,
    section: &str,
    field_of_study: Option<&str>,
) -> bool {
    section == class.section
        && level == class.level
        && (!config.is_specialized(class.level)
            || field_of_study == class.field_of_study.as_deref())
}

/// Teachers allowed in one class, with the subject each would teach.
#[derive(Debug, Clone, Default)]
pub struct ClassEligibility {
    /// (subject index, teacher index) in subject order.
    pairs: Vec<(usize, usize)>,
    /// Sorted, duplicate-free teacher indices.
    teachers: Vec<usize>,
    subject_by_teacher: HashMap<usize, usize>,
}

impl ClassEligibility {
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn teachers(&self) -> &[usize] {
        &self.teachers
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
    }

    pub fn is_eligible(&self, teacher: usize) -> bool {
        self.teachers.binary_search(&teacher).is_ok()
    }

    /// Subject index taught by `teacher` in this class; the last matching subject wins.
    pub fn subject_of(&self, teacher: usize) -> Option<usize> {
        self.subject_by_teacher.get(&teacher).copied()
    }
}

/// Eligibility of every class, aligned with `SchedulingInput::classes`.
///
/// Computed once per run and shared by model construction and extraction.
#[derive(Debug, Clone)]
pub struct Eligibility {
    classes: Vec<ClassEligibility>,
}

impl Eligibility {
    pub fn resolve(input: &SchedulingInput, config: &SchedulerConfig) -> Self {
        let teacher_index: HashMap<&str, usize> = input
            .teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.user_id.as_str(), i))
            .collect();

        // Unknown teacher references are dropped once, up front.
        let subject_teachers: Vec<Vec<usize>> = input
            .subjects
            .iter()
            .map(|subject| {
                subject
                    .teacher_ids
                    .iter()
                    .filter_map(|id| {
                        let index = teacher_index.get(id.as_str()).copied();
                        if index.is_none() {
                            warn!(
                                "Subject {} lists unknown teacher {}, skipping it.",
                                subject.subject_id, id
                            );
                        }
                        index
                    })
                    .unique()
                    .collect()
            })
            .collect();

        let classes = input
            .classes
            .iter()
            .map(|class| {
                let mut eligibility = ClassEligibility::default();
                for (s, subject) in input.subjects.iter().enumerate() {
                    if !scope_matches(
                        config,
                        class,
                        subject.level,
                        &subject.section,
                        subject.field_of_study.as_deref(),
                    ) {
                        continue;
                    }
                    for &t in &subject_teachers[s] {
                        eligibility.pairs.push((s, t));
                        eligibility.subject_by_teacher.insert(t, s);
                    }
                }
                eligibility.teachers = eligibility
                    .pairs
                    .iter()
                    .map(|(_, t)| *t)
                    .sorted()
                    .dedup()
                    .collect();
                debug!(
                    "Class {} has {} eligible teachers over {} subject pairs.",
                    class.class_id,
                    eligibility.teachers.len(),
                    eligibility.pairs.len()
                );
                eligibility
            })
            .collect();

        Self { classes }
    }

    pub fn class(&self, class: usize) -> &ClassEligibility {
        &self.classes[class]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEligibility> {
        self.classes.iter()
    }
}
