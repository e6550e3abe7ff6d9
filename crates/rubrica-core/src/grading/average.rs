//! Student running average
//!
//! The average is always rebuilt from the full set of recorded grades, never
//! adjusted incrementally. It is the sum of the weighted finals: notas carry
//! their own percentage, so a group whose notas total 100% yields a 0-100
//! style average.

use super::round2;
use crate::roster::{Calificacion, Student};

/// Sum of weighted finals, rounded to two decimals; 0 with no grades
pub fn recompute_average(calificaciones: &[Calificacion]) -> f64 {
    round2(calificaciones.iter().map(|c| c.final_score).sum())
}

impl Student {
    /// Refresh `average` from the current grade set and return it
    pub fn recompute_average(&mut self) -> f64 {
        self.average = recompute_average(&self.calificaciones);
        self.average
    }
}
