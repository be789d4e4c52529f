//! Cross referencer: the fixed four-stage pass that completes every entity.
//!
//! Stages run in order with no back-edges: name assignment, output
//! attachment, variable resolution, usage computation. Lookup misses are
//! normal operation — they fall back to defaults, never to errors.

use sheetvet_model::{Formula, Name, Variable};
use tracing::debug;

use crate::loader::ValueSnapshot;

/// Run all four stages over the run's three collections.
pub fn cross_reference(
    formulas: &mut [Formula],
    names: &mut [Name],
    constants: &mut [Variable],
    values: &ValueSnapshot,
) {
    for constant in constants.iter_mut() {
        assign_name(constant, names);
    }
    for formula in formulas.iter_mut() {
        assign_name(&mut formula.var, names);
    }

    for constant in constants.iter_mut() {
        attach_output(constant, values);
    }
    for formula in formulas.iter_mut() {
        attach_output(&mut formula.var, values);
    }
    for name in names.iter_mut() {
        attach_output(&mut name.var, values);
    }

    for formula in formulas.iter_mut() {
        resolve_variables(formula, names);
    }

    compute_usage(names, formulas);

    debug!(
        used_names = names.iter().filter(|n| n.is_used).count(),
        "cross-reference complete"
    );
}

/// Stage 1: adopt the name of the first matching `Name` under the identity
/// rule, else default to the entity's own coordinate.
fn assign_name(var: &mut Variable, names: &[Name]) {
    var.name = names
        .iter()
        .find(|n| n.var.same_target(var))
        .map(|n| n.var.name.clone())
        .or_else(|| var.coordinate().map(str::to_string))
        .unwrap_or_default();
}

/// Stage 2: read the value-mode cell at the entity's position. Entities with
/// no cell get no output; a missing cached value stays `None`.
fn attach_output(var: &mut Variable, values: &ValueSnapshot) {
    if let Some(cell) = &var.cell {
        var.output = values
            .lookup(&cell.sheet, cell.row, cell.col)
            .map(str::to_string);
    }
}

/// Stage 3: replace candidate tokens with the `Name` entities they resolve
/// to. A token matches a name's text, or the coordinate of the cell a name
/// is bound to (a formula that says `B1` still consumes the name covering
/// B1). First-seen token order, duplicate tokens collapsed, unmatched tokens
/// silently dropped.
fn resolve_variables(formula: &mut Formula, names: &[Name]) {
    let mut seen: Vec<&str> = Vec::new();
    let mut resolved = Vec::new();
    for token in &formula.candidates {
        if seen.contains(&token.as_str()) {
            continue;
        }
        seen.push(token);
        resolved.extend(
            names
                .iter()
                .filter(|n| n.var.name == *token || n.var.coordinate() == Some(token))
                .cloned(),
        );
    }
    formula.variables = resolved;
}

/// Stage 4: a name is used iff it appears in some formula's resolved list.
fn compute_usage(names: &mut [Name], formulas: &[Formula]) {
    for name in names.iter_mut() {
        name.is_used = formulas
            .iter()
            .any(|f| f.variables.iter().any(|v| v.var.name == name.var.name));
    }
}
