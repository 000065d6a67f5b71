//! Module weights for ensemble scoring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five independent sub-assessments, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Source,
    CrossCheck,
    Logic,
    Context,
    Bias,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::Source,
        Module::CrossCheck,
        Module::Logic,
        Module::Context,
        Module::Bias,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Module::Source     => "source",
            Module::CrossCheck => "cross_check",
            Module::Logic      => "logic",
            Module::Context    => "context",
            Module::Bias       => "bias",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Module::Source     => "Source Reputation",
            Module::CrossCheck => "Cross-Check",
            Module::Logic      => "Logical Integrity",
            Module::Context    => "Contextual Completeness",
            Module::Bias       => "Rhetorical Neutrality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("weight for `{module}` must be finite and non-negative, got {value}")]
    Invalid { module: &'static str, value: f64 },
}

/// Importance multiplier per module.
///
/// Any non-negative value is accepted; weights are not required to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleWeights {
    pub source: f64,
    pub cross_check: f64,
    pub logic: f64,
    pub context: f64,
    pub bias: f64,
}

/// Expert prior weights. They sum to 100 for convenience only.
pub const DEFAULT_WEIGHTS: ModuleWeights = ModuleWeights {
    source:      30.0,
    cross_check: 25.0,
    logic:       20.0,
    context:     15.0,
    bias:        10.0,
};

impl Default for ModuleWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ModuleWeights {
    pub fn get(&self, module: Module) -> f64 {
        match module {
            Module::Source     => self.source,
            Module::CrossCheck => self.cross_check,
            Module::Logic      => self.logic,
            Module::Context    => self.context,
            Module::Bias       => self.bias,
        }
    }

    /// Convert to array for iteration, in [`Module::ALL`] order.
    pub fn as_array(&self) -> [f64; 5] {
        [self.source, self.cross_check, self.logic, self.context, self.bias]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Reject negative or non-finite weights.
    pub fn validate(&self) -> Result<(), WeightError> {
        for module in Module::ALL {
            let value = self.get(module);
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::Invalid { module: module.key(), value });
            }
        }
        Ok(())
    }

    /// Copy with every negative or non-finite weight replaced by 0.
    pub fn sanitized(&self) -> Self {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        Self {
            source:      clean(self.source),
            cross_check: clean(self.cross_check),
            logic:       clean(self.logic),
            context:     clean(self.context),
            bias:        clean(self.bias),
        }
    }

    /// Multiply every weight by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            source:      self.source * factor,
            cross_check: self.cross_check * factor,
            logic:       self.logic * factor,
            context:     self.context * factor,
            bias:        self.bias * factor,
        }
    }
}
