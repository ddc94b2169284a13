use std::fmt::{Debug, Display, Formatter};

use crate::quantity::cost::Cost;

/// Cost display that keeps "unknown" distinct from zero.
pub struct MaybeCost(pub Option<Cost>);

impl Debug for MaybeCost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for MaybeCost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(cost) => Display::fmt(&cost, f),
            None => write!(f, "unknown"),
        }
    }
}
