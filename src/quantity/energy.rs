use std::ops::{Div, Mul};

use crate::quantity::{cost::Cost, power::Watts, rate::KilowattHourRate, time::Hours};

quantity!(WattHours, suffix: "Wh", precision: 3);
quantity!(KilowattHours, suffix: "kWh", precision: 6);

impl From<WattHours> for KilowattHours {
    fn from(energy: WattHours) -> Self {
        Self(energy.0 * 0.001)
    }
}

impl Div<Hours> for WattHours {
    type Output = Watts;

    fn div(self, rhs: Hours) -> Self::Output {
        Watts(self.0 / rhs.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}
