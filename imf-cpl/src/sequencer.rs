//! Normalization of resource lists into source spans, and comparison.
//!
//! A resource list becomes the sequence of source spans it plays, in
//! timeline order. A repeated resource replays its span, it does not extend
//! it. Adjacent spans of the same track file and encoding where one ends
//! where the next begins merge into one. Positions are exact seconds, so
//! lists at different edit rates compare by the instants they denote.
//!
//! Consecutive replays of one span are kept as a single [`Run`], so the
//! cost of normalizing is linear in the number of resources whatever their
//! repeat counts.

use imf_core::Rational;
use serde::Serialize;
use uuid::Uuid;

use crate::resource::EditResource;

/// A contiguous range of one track file, `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub track_file_id: Uuid,
    pub source_encoding: Uuid,
    pub start: Rational,
    pub end: Rational,
}

impl Span {
    fn continues(&self, next: &Span) -> bool {
        self.track_file_id == next.track_file_id
            && self.source_encoding == next.source_encoding
            && self.end == next.start
    }
}

/// A span played `replays` times back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Run {
    pub span: Span,
    pub replays: u64,
}

/// First position where two normalized run sequences differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    /// Index into the normalized sequences.
    pub index: usize,
    /// Run on the left side, `None` past its end.
    pub left: Option<Run>,
    /// Run on the right side, `None` past its end.
    pub right: Option<Run>,
}

/// Outcome of comparing two resource lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Equivalence {
    pub equivalent: bool,
    pub divergence: Option<Divergence>,
}

/// Append `replays` copies of `span`, folding them into an equal last run.
fn push_run(runs: &mut Vec<Run>, span: Span, replays: u64) {
    match runs.last_mut() {
        Some(last) if last.span == span => last.replays = last.replays.saturating_add(replays),
        _ => runs.push(Run { span, replays }),
    }
}

/// Merge adjacent continuous spans and group consecutive replays.
///
/// Only the first replay of a resource can merge with what precedes it,
/// since a span of nonzero length never continues itself.
pub fn normalize(resources: &[EditResource]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::with_capacity(resources.len());
    for resource in resources {
        let span = Span {
            track_file_id: resource.track_file_id(),
            source_encoding: resource.source_encoding(),
            start: resource.source_start(),
            end: resource.source_end(),
        };
        let replays = resource.repeat_count();

        match runs.last_mut() {
            Some(last) if last.span.continues(&span) => {
                let merged = Span {
                    end: span.end,
                    ..last.span
                };
                last.replays -= 1;
                if last.replays == 0 {
                    runs.pop();
                }
                push_run(&mut runs, merged, 1);
                if replays > 1 {
                    push_run(&mut runs, span, replays - 1);
                }
            }
            _ => push_run(&mut runs, span, replays),
        }
    }
    runs
}

/// Compare two resource lists for equivalent program content.
pub fn compare(left: &[EditResource], right: &[EditResource]) -> Equivalence {
    let (left, right) = (normalize(left), normalize(right));
    let len = left.len().max(right.len());
    let divergence = (0..len)
        .find(|&i| left.get(i) != right.get(i))
        .map(|index| Divergence {
            index,
            left: left.get(index).copied(),
            right: right.get(index).copied(),
        });

    if let Some(d) = &divergence {
        tracing::debug!(index = d.index, "Resource lists diverge");
    }
    Equivalence {
        equivalent: divergence.is_none(),
        divergence,
    }
}
