use crate::error::{TpResult, TransportError};
use crate::problem::{MarginLabels, Problem, Table};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Marks an unallocated cell in an initial solution file.
pub const EMPTY_TOKEN: &str = "-";

struct Line {
    number: usize,
    fields: Vec<String>,
}

/// Reads delimited records, dropping empty fields so that columns padded with
/// repeated delimiters (e.g. aligned with spaces) still line up.
fn read_lines<R: Read>(reader: R, delimiter: u8) -> TpResult<Vec<Line>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut lines = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let rec = result?;
        let number = rec
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);
        let fields: Vec<String> = rec
            .iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();
        if !fields.is_empty() {
            lines.push(Line { number, fields });
        }
    }
    Ok(lines)
}

fn parse_quantity(line: &Line, field: usize) -> TpResult<u64> {
    let token = &line.fields[field];
    token.parse().map_err(|_| {
        TransportError::parse(
            line.number,
            format!("field {} ('{}') is not a non-negative integer", field + 1, token),
        )
    })
}

/// Parses a problem instance:
///
/// ```text
/// Source,  D1, D2, D3, Supply
/// S1,       4,  6,  9,     20
/// S2,       8,  4,  3,     30
/// Demand,  15, 20, 15
/// ```
///
/// The corner label of the header may be omitted. Unbalanced instances are rejected.
pub fn load_problem<R: Read>(reader: R, delimiter: u8) -> TpResult<Problem> {
    let lines = read_lines(reader, delimiter)?;
    if lines.len() < 3 {
        return Err(TransportError::Validation(format!(
            "Problem file needs a header, at least one source row and a demand row; found {} line(s)",
            lines.len()
        )));
    }

    let header = &lines[0];
    let source_lines = &lines[1..lines.len() - 1];
    let demand_line = &lines[lines.len() - 1];

    let first = &source_lines[0];
    if first.fields.len() < 3 {
        return Err(TransportError::parse(
            first.number,
            "a source row needs a label, at least one cost and a supply",
        ));
    }
    let cols = first.fields.len() - 2;

    let mut margins = MarginLabels::default();
    let destinations: Vec<String> = match header.fields.len() {
        n if n == cols + 2 => {
            margins.corner = header.fields[0].clone();
            margins.supply = header.fields[cols + 1].clone();
            header.fields[1..=cols].to_vec()
        }
        n if n == cols + 1 => {
            margins.corner = String::new();
            margins.supply = header.fields[cols].clone();
            header.fields[..cols].to_vec()
        }
        n => {
            return Err(TransportError::parse(
                header.number,
                format!("header has {} fields but source rows have {} costs", n, cols),
            ))
        }
    };

    let mut sources = Vec::with_capacity(source_lines.len());
    let mut costs = Vec::with_capacity(source_lines.len());
    let mut supply = Vec::with_capacity(source_lines.len());

    for line in source_lines {
        if line.fields.len() != cols + 2 {
            return Err(TransportError::parse(
                line.number,
                format!(
                    "expected {} fields (label, {} costs, supply), found {}",
                    cols + 2,
                    cols,
                    line.fields.len()
                ),
            ));
        }
        sources.push(line.fields[0].clone());
        costs.push(
            (1..=cols)
                .map(|j| parse_quantity(line, j))
                .collect::<TpResult<Vec<u64>>>()?,
        );
        supply.push(parse_quantity(line, cols + 1)?);
    }

    if demand_line.fields.len() < cols + 1 {
        return Err(TransportError::parse(
            demand_line.number,
            format!(
                "demand row needs a label and {} values, found {} fields",
                cols,
                demand_line.fields.len()
            ),
        ));
    }
    let demand = (1..=cols)
        .map(|j| parse_quantity(demand_line, j))
        .collect::<TpResult<Vec<u64>>>()?;
    margins.demand = demand_line.fields[0].clone();

    let problem = Problem::new(costs, supply, demand)?
        .with_labels(sources, destinations)?
        .with_margins(margins);

    if !problem.is_balanced() {
        return Err(TransportError::Validation(format!(
            "Unbalanced instance: total supply {} != total demand {}",
            problem.supply().iter().sum::<u64>(),
            problem.demand().iter().sum::<u64>()
        )));
    }

    info!(
        "📦 Loaded problem: {} sources x {} destinations",
        problem.rows(),
        problem.cols()
    );
    Ok(problem)
}

/// Parses an initial basic feasible solution for `problem`: a header line, then
/// one row per source with a label and one entry per destination. `-` marks
/// an unallocated cell; any integer, including `0`, an occupied one. Trailing
/// fields (such as a supply column) are ignored.
///
/// Fails fast unless the table has exactly M+N-1 occupied cells and matches
/// the supply and demand totals.
pub fn load_solution<R: Read>(reader: R, problem: &Problem, delimiter: u8) -> TpResult<Table> {
    let lines = read_lines(reader, delimiter)?;
    let (rows, cols) = (problem.rows(), problem.cols());

    if lines.len() < rows + 1 {
        return Err(TransportError::Validation(format!(
            "Initial solution needs a header and {} source rows; found {} line(s)",
            rows,
            lines.len()
        )));
    }

    let mut allocations = Vec::with_capacity(rows);
    for line in &lines[1..=rows] {
        if line.fields.len() < cols + 1 {
            return Err(TransportError::parse(
                line.number,
                format!(
                    "expected a label and {} entries, found {} fields",
                    cols,
                    line.fields.len()
                ),
            ));
        }
        let entries = (1..=cols)
            .map(|j| {
                if line.fields[j] == EMPTY_TOKEN {
                    Ok(None)
                } else {
                    parse_quantity(line, j).map(Some)
                }
            })
            .collect::<TpResult<Vec<Option<u64>>>>()?;
        allocations.push(entries);
    }
    if lines.len() > rows + 1 {
        debug!("Ignoring {} trailing line(s) in solution file", lines.len() - rows - 1);
    }

    let table = Table::from_allocations(problem, &allocations)?;
    info!(
        "🧮 Initial solution: {} occupied cells, total cost {}",
        table.occupied_count(),
        table.total_cost()
    );
    Ok(table)
}

pub fn load_problem_from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> TpResult<Problem> {
    debug!("Reading problem from {}", path.as_ref().display());
    let file = File::open(path)?;
    load_problem(file, delimiter)
}

pub fn load_solution_from_path<P: AsRef<Path>>(
    path: P,
    problem: &Problem,
    delimiter: u8,
) -> TpResult<Table> {
    debug!("Reading initial solution from {}", path.as_ref().display());
    let file = File::open(path)?;
    load_solution(file, problem, delimiter)
}
