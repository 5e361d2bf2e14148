use crate::infra::PathProperties;
use crate::stairs::StairSequence;

const EPSILON: f64 = 1e-4;

/// Where a train is along its path. The head offset is tracked; the train
/// occupies `[head - length, head]`, clipped to the start of the path.
#[derive(Clone, Debug)]
pub struct PositionTracker {
    path_length: f64,
    train_length: f64,
    head: f64,
    slopes: StairSequence<f64>,
}

impl PositionTracker {
    pub fn new<P: PathProperties + ?Sized>(path: &P, train_length: f64) -> Self {
        PositionTracker {
            path_length: path.length(),
            train_length,
            head: 0.0,
            slopes: path.slopes().clone(),
        }
    }

    pub fn with_head(mut self, head: f64) -> Self {
        self.head = head.max(0.0).min(self.path_length);
        self
    }

    pub fn head(&self) -> f64 {
        self.head
    }

    pub fn tail(&self) -> f64 {
        (self.head - self.train_length).max(0.0)
    }

    pub fn path_length(&self) -> f64 {
        self.path_length
    }

    pub fn footprint(&self) -> (f64, f64) {
        (self.tail(), self.head)
    }

    pub fn advance(&mut self, dx: f64) {
        self.head = (self.head + dx).max(0.0).min(self.path_length);
    }

    pub fn reached_end(&self) -> bool {
        self.head >= self.path_length - EPSILON
    }

    /// Grade under the train, in meters per kilometer: slope samples
    /// weighted by the length of the footprint they cover. Stretches
    /// without slope data count as flat.
    pub fn average_grade(&self) -> f64 {
        let (tail, head) = self.footprint();
        let covered = head - tail;
        if covered < EPSILON {
            return self.slopes.get(head).cloned().unwrap_or(0.0);
        }
        let weighted: f64 = self.slopes.steps_between(tail, head).iter()
            .map(|&(lo, hi, grade)| grade * (hi - lo))
            .sum();
        weighted / covered
    }
}
