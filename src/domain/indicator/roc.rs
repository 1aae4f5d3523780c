//! ROC (Rate of Change) evaluated at the latest bar.
//!
//! ROC(n) = ((C[last] - C[last-n]) / C[last-n]) * 100
//! Needs n + 1 values. No guard on a zero base: the result is then infinite
//! or NaN and downstream completeness checks see it.

pub fn percent_change(values: &[f64], offset: usize) -> Option<f64> {
    if values.len() <= offset {
        return None;
    }
    let last = values.len() - 1;
    let base = values[last - offset];
    Some((values[last] - base) / base * 100.0)
}
