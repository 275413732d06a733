use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use steppingstone::optimizer::{MarginalCost, PivotReport};
use steppingstone::problem::{Position, Problem};

pub fn cell_label(problem: &Problem, pos: Position) -> String {
    format!(
        "{} -> {}",
        problem.sources()[pos.row],
        problem.destinations()[pos.col]
    )
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Allocation grid with supply column, demand row and total cost.
pub fn print_allocation(name: &str, problem: &Problem, alloc: &steppingstone::problem::Table) {
    println!("\nTable: {}", name);
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let margins = problem.margins();
    let mut header = vec![Cell::new(&margins.corner).add_attribute(Attribute::Bold)];
    header.extend(
        problem
            .destinations()
            .iter()
            .map(|d| Cell::new(d).add_attribute(Attribute::Bold)),
    );
    header.push(Cell::new(&margins.supply).fg(Color::Cyan));
    table.add_row(header);

    for (row, label) in problem.sources().iter().enumerate() {
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        for col in 0..problem.cols() {
            let cell = match alloc.slot(Position::new(row, col)).quantity() {
                Some(q) => Cell::new(q).fg(Color::Green),
                None => Cell::new("-"),
            };
            cells.push(cell);
        }
        cells.push(Cell::new(problem.supply()[row]).fg(Color::Cyan));
        table.add_row(cells);
    }

    let mut demand = vec![Cell::new(&margins.demand).fg(Color::Cyan)];
    demand.extend(problem.demand().iter().map(|d| Cell::new(d).fg(Color::Cyan)));
    demand.push(Cell::new(""));
    table.add_row(demand);

    right_align(&mut table, 1, problem.cols() + 1);
    println!("{}", table);
    println!("Total costs: {}", alloc.total_cost());
}

/// One row per unallocated cell: its loop, marginal cost and bottleneck.
pub fn print_marginal_costs(problem: &Problem, candidates: &[MarginalCost]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Empty Cell").add_attribute(Attribute::Bold),
        Cell::new("Marginal").fg(Color::Cyan),
        Cell::new("Max Shift"),
        Cell::new("Leaving"),
        Cell::new("Loop"),
    ]);

    for m in candidates {
        let marginal = if m.is_improving() {
            Cell::new(m.cost).fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            Cell::new(m.cost).fg(Color::Green)
        };
        let path: Vec<String> = m
            .path
            .signed()
            .map(|(sign, c)| format!("{}{}", sign, c.pos))
            .collect();

        table.add_row(vec![
            Cell::new(cell_label(problem, m.entering())),
            marginal,
            Cell::new(m.quantity),
            Cell::new(cell_label(problem, m.leaving.pos)),
            Cell::new(path.join(" ")),
        ]);
    }

    right_align(&mut table, 1, 2);
    println!("\n{}", table);
}

pub fn print_history(problem: &Problem, history: &[PivotReport]) {
    if history.is_empty() {
        println!("\nNo pivots were needed.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Entering"),
        Cell::new("Leaving"),
        Cell::new("Loop"),
        Cell::new("Shift"),
        Cell::new("Marginal").fg(Color::Cyan),
        Cell::new("Delta").fg(Color::Green),
    ]);

    for (i, r) in history.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(cell_label(problem, r.entering)),
            Cell::new(cell_label(problem, r.leaving)),
            Cell::new(r.loop_len),
            Cell::new(r.quantity),
            Cell::new(r.marginal_cost).fg(Color::Cyan),
            Cell::new(r.cost_delta).fg(Color::Green),
        ]);
    }

    right_align(&mut table, 3, 6);
    println!("\n{}", table);
}
