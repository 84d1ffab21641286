//! Decision dependency ordering
//!
//! Decisions reference the decisions they require by id. The compiler
//! evaluates them in an order where every decision follows its
//! requirements, found by depth-first search with a recursion stack.

use crate::error::CompileError;
use std::collections::HashMap;
use tabula_core::ast::Model;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Order a model's decisions so requirements come first.
///
/// Returns decision indices in evaluation order. Unknown references and
/// cycles are pushed to `errors`; the returned order then still covers every
/// decision, with the offending edges ignored.
pub fn order_decisions(model: &Model, errors: &mut Vec<CompileError>) -> Vec<usize> {
    let by_id: HashMap<&str, usize> = model
        .decisions
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.id.as_deref().map(|id| (id, i)))
        .collect();

    // Resolve edges up front so unknown references are reported once
    let mut edges: Vec<Vec<usize>> = Vec::with_capacity(model.decisions.len());
    for decision in &model.decisions {
        let mut targets = Vec::new();
        for reference in decision.required_decision_refs() {
            let target = by_id.get(reference.as_str()).copied().or_else(|| {
                model
                    .decisions
                    .iter()
                    .position(|d| d.name.eq_ignore_ascii_case(&reference))
            });
            match target {
                Some(index) => targets.push(index),
                None => errors.push(CompileError::UnknownRequiredDecision {
                    model: model.name.clone(),
                    decision: decision.name.clone(),
                    reference,
                }),
            }
        }
        edges.push(targets);
    }

    let mut marks = vec![Mark::Unvisited; model.decisions.len()];
    let mut order = Vec::with_capacity(model.decisions.len());
    let mut path = Vec::new();

    for start in 0..model.decisions.len() {
        if marks[start] == Mark::Unvisited {
            visit(start, model, &edges, &mut marks, &mut path, &mut order, errors);
        }
    }

    order
}

fn visit(
    index: usize,
    model: &Model,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    path: &mut Vec<usize>,
    order: &mut Vec<usize>,
    errors: &mut Vec<CompileError>,
) {
    marks[index] = Mark::InProgress;
    path.push(index);

    for &next in &edges[index] {
        match marks[next] {
            Mark::Unvisited => visit(next, model, edges, marks, path, order, errors),
            Mark::InProgress => {
                let start = path.iter().position(|&p| p == next).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|&i| model.decisions[i].name.clone())
                    .collect();
                cycle.push(model.decisions[next].name.clone());
                errors.push(CompileError::DecisionCycle {
                    model: model.name.clone(),
                    path: cycle,
                });
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[index] = Mark::Done;
    order.push(index);
}
