use itertools::Itertools;

use crate::types::OdometryParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberFormat {
    /// Shortest text that parses back to the same value.
    #[default]
    Shortest,
    /// Exactly this many decimals.
    Fixed(usize),
}

pub fn pr_number(value: f64, format: NumberFormat) -> String {
    match format {
        NumberFormat::Shortest => value.to_string(),
        NumberFormat::Fixed(decimals) => format!("{value:.decimals$}"),
    }
}

// no trailing newline, the caller owns line termination
pub fn pr_params(params: &OdometryParams, format: NumberFormat) -> String {
    params
        .values()
        .iter()
        .map(|&v| pr_number(v, format))
        .join(" ")
}
