use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{INPUT_TOKEN_COST, OUTPUT_TOKEN_COST};

/// Token counts reported by the vision service for one call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Estimated spend in USD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Per-1K-token prices in USD.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPricing {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Default for TokenPricing {
    fn default() -> Self {
        Self {
            input_per_1k: INPUT_TOKEN_COST,
            output_per_1k: OUTPUT_TOKEN_COST,
        }
    }
}

fn count(usage: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| usage.get(*key).and_then(Value::as_u64))
}

impl TokenUsage {
    /// Reads the `usage` (or `token_usage`) block of a response.
    ///
    /// Both the `input_tokens`/`output_tokens` and the
    /// `prompt_tokens`/`completion_tokens` spellings are accepted. A missing
    /// total is the sum of the parts.
    pub fn from_response(response: &Value) -> Option<Self> {
        let usage = response
            .get("usage")
            .or_else(|| response.get("token_usage"))
            .filter(|usage| usage.is_object())?;

        let input_tokens = count(usage, &["input_tokens", "prompt_tokens"]).unwrap_or(0);
        let output_tokens = count(usage, &["output_tokens", "completion_tokens"]).unwrap_or(0);
        let total_tokens =
            count(usage, &["total_tokens"]).unwrap_or(input_tokens + output_tokens);

        Some(Self {
            input_tokens,
            output_tokens,
            total_tokens,
        })
    }

    pub fn cost(&self, pricing: &TokenPricing) -> CostEstimate {
        let input_cost = self.input_tokens as f64 / 1000.0 * pricing.input_per_1k;
        let output_cost = self.output_tokens as f64 / 1000.0 * pricing.output_per_1k;
        CostEstimate {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}

impl std::ops::Add for TokenUsage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
        }
    }
}

impl std::iter::Sum for TokenUsage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, usage| acc + usage)
    }
}
