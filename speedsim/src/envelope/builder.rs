use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

use super::{Envelope, EnvelopePart, EnvelopeSegment};

/// Accumulates envelope parts and resolves them into the most restrictive
/// envelope: at every position, the slowest part covering it.
///
/// When several parts are tied at the minimum speed, the part added first
/// is the one whose tags end up in the envelope.
#[derive(Clone, Debug, Default)]
pub struct EnvelopeBuilder {
    parts: Vec<EnvelopePart>,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_part(&mut self, part: EnvelopePart) {
        self.parts.push(part);
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Panics if the parts leave a hole between the lowest and highest
    /// position they cover.
    pub fn build(self) -> Envelope {
        // (begin, end, speed, part) for every segment of every part
        let pieces: Vec<(f64, f64, f64, usize)> = self.parts.iter().enumerate()
            .flat_map(|(idx, part)| part.segments().map(move |(b, e, v)| (b, e, v, idx)))
            .collect();

        let mut cuts: Vec<f64> = pieces.iter().flat_map(|p| vec![p.0, p.1]).collect();
        cuts.sort_by_key(|x| OrderedFloat(*x));
        cuts.dedup();

        let mut by_begin: Vec<usize> = (0..pieces.len()).collect();
        by_begin.sort_by_key(|&i| OrderedFloat(pieces[i].0));
        let mut by_end: Vec<usize> = (0..pieces.len()).collect();
        by_end.sort_by_key(|&i| OrderedFloat(pieces[i].1));

        // Pieces covering the current interval, slowest first, then first added.
        let mut active: BTreeSet<(OrderedFloat<f64>, usize, usize)> = BTreeSet::new();
        let key = |i: usize| (OrderedFloat(pieces[i].2), pieces[i].3, i);
        let (mut next_begin, mut next_end) = (0, 0);

        let mut segments: Vec<EnvelopeSegment> = Vec::new();
        let mut last_part = None;
        for window in cuts.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            while next_end < by_end.len() && pieces[by_end[next_end]].1 <= lo {
                active.remove(&key(by_end[next_end]));
                next_end += 1;
            }
            while next_begin < by_begin.len() && pieces[by_begin[next_begin]].0 <= lo {
                active.insert(key(by_begin[next_begin]));
                next_begin += 1;
            }

            let (speed, idx) = match active.iter().next() {
                Some(&(speed, idx, _)) => (speed.into_inner(), idx),
                None => panic!("envelope parts leave a gap over [{}, {})", lo, hi),
            };

            let extends_last = last_part == Some(idx)
                && segments.last().map_or(false, |s| s.speed == speed);
            if let (true, Some(seg)) = (extends_last, segments.last_mut()) {
                seg.end = hi;
            } else {
                segments.push(EnvelopeSegment {
                    begin: lo,
                    end: hi,
                    speed,
                    tags: self.parts[idx].tags().clone(),
                });
            }
            last_part = Some(idx);
        }

        trace!("resolved {} envelope parts into {} segments", self.parts.len(), segments.len());
        Envelope::new(segments)
    }
}
