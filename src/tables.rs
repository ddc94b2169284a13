use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{fmt::MaybeCost, quantity::cost::Cost, report::Assessment};

/// Builds the terminal view of the assessment: one row per projection
/// period, with the no-phantom counterfactual alongside.
#[must_use]
pub fn build_assessment_table(assessment: &Assessment) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec![
        Cell::new("Period"),
        Cell::new("Energy").set_alignment(CellAlignment::Right),
        Cell::new("Cost").set_alignment(CellAlignment::Right),
        Cell::new("No-phantom\nenergy").set_alignment(CellAlignment::Right),
        Cell::new("No-phantom\ncost").set_alignment(CellAlignment::Right),
    ]);

    table.add_row(vec![
        Cell::new("Daily").add_attribute(Attribute::Bold),
        Cell::new(assessment.daily.total_energy()).set_alignment(CellAlignment::Right),
        cost_cell(assessment.daily_costs.total),
        Cell::new(assessment.daily.active_energy)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Dim),
        counterfactual_cell(assessment.daily_costs.active_only),
    ]);
    if let Some(projection) = &assessment.projection {
        table.add_row(vec![
            Cell::new("Monthly").add_attribute(Attribute::Bold),
            Cell::new(projection.monthly.energy).set_alignment(CellAlignment::Right),
            cost_cell(projection.monthly.cost),
            Cell::new(projection.no_phantom_monthly.energy)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            counterfactual_cell(projection.no_phantom_monthly.cost),
        ]);
        table.add_row(vec![
            Cell::new("Yearly").add_attribute(Attribute::Bold),
            Cell::new(projection.yearly.energy).set_alignment(CellAlignment::Right),
            cost_cell(projection.yearly.cost),
            Cell::new(projection.no_phantom_yearly.energy)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            counterfactual_cell(projection.no_phantom_yearly.cost),
        ]);
    }
    table
}

fn cost_cell(cost: Option<Cost>) -> Cell {
    let cell = Cell::new(MaybeCost(cost)).set_alignment(CellAlignment::Right);
    if cost.is_some_and(|cost| cost > Cost::ZERO) {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn counterfactual_cell(cost: Option<Cost>) -> Cell {
    let cell = Cell::new(MaybeCost(cost)).set_alignment(CellAlignment::Right);
    if cost.is_some() { cell.fg(Color::Green) } else { cell }
}
