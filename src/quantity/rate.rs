quantity!(KilowattHourRate, suffix: "/kWh", precision: 4);
