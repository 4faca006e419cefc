//! Assembly of the per-participant survey package.
//!
//! The package is everything the rendering layer needs: cases in the
//! participant's order, the guideline tables attached to each case, whether
//! those tables are shown, and the timed condition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::assignment::{Assignment, Condition, generate_assignment};
use crate::catalog::{Case, GuidelineRow, GuidelineTable, StudyCatalog, StudyOption, StudyOptions};
use crate::seed::{Seed, derive_seed};

/// Default identifier of the demo walkthrough.
pub const DEMO_IDENTIFIER: &str = "demo";

/// Overrides applied on top of the drawn condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionPolicy {
    /// Identifier served by the demo walkthrough path.
    #[serde(default = "default_demo_identifier")]
    pub demo_identifier: String,
    /// Identifiers that are always timed.
    #[serde(default)]
    pub forced_timed: BTreeSet<String>,
}

fn default_demo_identifier() -> String {
    DEMO_IDENTIFIER.to_string()
}

impl Default for ConditionPolicy {
    fn default() -> Self {
        Self {
            demo_identifier: default_demo_identifier(),
            forced_timed: BTreeSet::new(),
        }
    }
}

impl ConditionPolicy {
    pub fn is_demo(&self, identifier: &str) -> bool {
        identifier.eq_ignore_ascii_case(&self.demo_identifier)
    }

    /// Final condition for an identifier given the drawn one.
    pub fn resolve(&self, identifier: &str, drawn: Condition) -> Condition {
        if self.forced_timed.contains(identifier) {
            tracing::debug!(identifier, "forced timed condition");
            Condition::Timed
        } else {
            drawn
        }
    }
}

/// Guideline table for one topic of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGuidance {
    pub topic: String,
    pub rows: Vec<GuidelineRow>,
}

/// A case at its presentation position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedCase {
    /// Zero-based position in the participant's order.
    pub position: usize,
    /// Index of the case in the canonical case list.
    pub case_index: usize,
    pub case_text: String,
    /// Whether the guideline tables are shown for this case.
    pub show_guidance: bool,
    pub guidance: Vec<TopicGuidance>,
}

/// Everything handed to the rendering layer for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationPackage {
    pub identifier: String,
    pub seed: Seed,
    pub condition: Condition,
    /// Comma-separated case indices, echoed back on submit.
    pub order: String,
    /// Guidance bitstring in presentation order, echoed back on submit.
    pub guidance_bits: String,
    pub questions: Vec<PresentedCase>,
    pub options: Vec<StudyOption>,
}

impl PresentationPackage {
    pub fn is_timed(&self) -> bool {
        self.condition.is_timed()
    }
}

/// Combine an assignment with the static study content.
///
/// Topics with no guideline entry are attached with an empty table.
pub fn assemble_presentation(
    identifier: &str,
    cases: &[Case],
    assignment: &Assignment,
    guidelines: &GuidelineTable,
    options: &StudyOptions,
    policy: &ConditionPolicy,
) -> PresentationPackage {
    let questions = assignment
        .presented()
        .filter_map(|(position, case_index, show_guidance)| {
            let case = cases.get(case_index)?;
            let guidance = case
                .topics
                .iter()
                .map(|topic| TopicGuidance {
                    topic: topic.clone(),
                    rows: guidelines.rows(topic).map(<[_]>::to_vec).unwrap_or_default(),
                })
                .collect();
            Some(PresentedCase {
                position,
                case_index,
                case_text: case.case_text.clone(),
                show_guidance,
                guidance,
            })
        })
        .collect();

    PresentationPackage {
        identifier: identifier.to_string(),
        seed: assignment.seed,
        condition: policy.resolve(identifier, assignment.condition),
        order: assignment.order_string(),
        guidance_bits: assignment.guidance_bits(),
        questions,
        options: options.with_aliases(),
    }
}

/// Derive, draw and assemble the package for `identifier` in one step.
pub fn present_for(
    identifier: &str,
    catalog: &StudyCatalog,
    policy: &ConditionPolicy,
) -> PresentationPackage {
    let seed = derive_seed(identifier);
    let assignment = generate_assignment(seed, catalog.case_count());
    assemble_presentation(
        identifier,
        &catalog.cases,
        &assignment,
        &catalog.guidelines,
        &catalog.options,
        policy,
    )
}

/// Package for the demo walkthrough.
///
/// The demo identifier is drawn over the demo case set and is always
/// untimed. A participant who types the demo identifier into the survey
/// query goes through [`present_for`] like anyone else.
pub fn present_demo(catalog: &StudyCatalog, policy: &ConditionPolicy) -> PresentationPackage {
    let mut package = present_for(&policy.demo_identifier, catalog, policy);
    package.condition = Condition::Untimed;
    package
}
