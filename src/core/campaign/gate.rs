//! Step Validation Gate
//!
//! Per-step readiness predicates over the draft. The gate is pure and binary:
//! it is consulted synchronously on every advance attempt and either holds or
//! it does not — there is no partial advancement and no error path.
//!
//! Rules are supplied as configuration; [`ValidationGate::standard`] carries
//! the stock rule set. A step with no rules is always ready.

use indexmap::IndexMap;

use crate::core::campaign::draft::CampaignDraft;
use crate::core::campaign::wizard::WizardStep;

type Predicate = Box<dyn Fn(&CampaignDraft) -> bool + Send + Sync>;

/// One named readiness requirement for a step.
pub struct GateRule {
    step: WizardStep,
    description: &'static str,
    check: Predicate,
}

impl GateRule {
    pub fn new(
        step: WizardStep,
        description: &'static str,
        check: impl Fn(&CampaignDraft) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            step,
            description,
            check: Box::new(check),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Readiness predicate `(step, draft) -> bool` built from a rule table.
pub struct ValidationGate {
    rules: IndexMap<WizardStep, Vec<GateRule>>,
}

impl ValidationGate {
    /// Gate with no rules: every step is always ready.
    pub fn permissive() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Build a gate from a rule list.
    pub fn from_rules(rules: Vec<GateRule>) -> Self {
        let mut map: IndexMap<WizardStep, Vec<GateRule>> = IndexMap::new();
        for rule in rules {
            map.entry(rule.step).or_default().push(rule);
        }
        Self { rules: map }
    }

    /// The stock rule set for the campaign wizard.
    pub fn standard() -> Self {
        fn non_empty(s: &Option<String>) -> bool {
            s.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
        }

        Self::from_rules(vec![
            GateRule::new(WizardStep::Basics, "address is filled in", |d| {
                non_empty(&d.address)
            }),
            GateRule::new(WizardStep::Basics, "property type is selected", |d| {
                non_empty(&d.property_type)
            }),
            GateRule::new(WizardStep::PropertyInfo, "price is positive", |d| {
                d.price.map(|v| v > 0.0).unwrap_or(false)
            }),
            GateRule::new(WizardStep::PropertyInfo, "bedroom count is positive", |d| {
                d.bedrooms.map(|v| v > 0).unwrap_or(false)
            }),
            GateRule::new(
                WizardStep::PropertyInfo,
                "bathroom count is positive",
                |d| d.bathrooms.map(|v| v > 0.0).unwrap_or(false),
            ),
            GateRule::new(
                WizardStep::PropertyInfo,
                "square footage is positive",
                |d| d.square_feet.map(|v| v > 0).unwrap_or(false),
            ),
            GateRule::new(
                WizardStep::Materials,
                "at least one marketing material is selected",
                |d| !d.selected_materials.is_empty(),
            ),
            GateRule::new(WizardStep::Generate, "content has been generated", |d| {
                d.has_generated_copy()
            }),
        ])
    }

    /// Whether `step` is ready to be advanced past, given `draft`.
    pub fn is_satisfied(&self, step: WizardStep, draft: &CampaignDraft) -> bool {
        self.rules
            .get(&step)
            .map(|rules| rules.iter().all(|r| (r.check)(draft)))
            .unwrap_or(true)
    }

    /// Descriptions of the rules currently failing for `step`. Display hint
    /// only; advancement decisions go through [`Self::is_satisfied`].
    pub fn failing_rules(&self, step: WizardStep, draft: &CampaignDraft) -> Vec<&'static str> {
        self.rules
            .get(&step)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|r| !(r.check)(draft))
                    .map(|r| r.description)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
