//! Heuristic contract and running statistics.

/// A heuristic estimator.
///
/// Returns a non-negative estimate of the remaining cost to a goal, or
/// `f64::INFINITY` when the state is a proven dead end.
pub trait Heuristic<S> {
    /// Estimate the remaining cost from `state`.
    fn value(&self, state: &S) -> f64;

    /// Short identifier used in reports.
    fn name(&self) -> &str {
        "heuristic"
    }
}

impl<S, H: Heuristic<S> + ?Sized> Heuristic<S> for &H {
    fn value(&self, state: &S) -> f64 {
        (**self).value(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S, H: Heuristic<S> + ?Sized> Heuristic<S> for Box<H> {
    fn value(&self, state: &S) -> f64 {
        (**self).value(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// The blind heuristic: zero everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<S> Heuristic<S> for ZeroHeuristic {
    fn value(&self, _state: &S) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "zero"
    }
}

/// Adapter turning a closure into a [`Heuristic`].
pub struct FnHeuristic<F> {
    name: String,
    f: F,
}

impl<F> FnHeuristic<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<S, F: Fn(&S) -> f64> Heuristic<S> for FnHeuristic<F> {
    fn value(&self, state: &S) -> f64 {
        (self.f)(state)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Running statistics over the values a heuristic returned.
///
/// Dead ends (`+inf`) are counted as calls but excluded from the best value
/// and the average.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeuristicStats {
    /// Number of evaluations.
    pub calls: u64,
    /// Number of evaluations that reported a dead end.
    pub dead_ends: u64,
    /// Smallest finite value seen.
    pub best: Option<f64>,
    sum: f64,
}

impl HeuristicStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluation result.
    pub fn record(&mut self, value: f64) {
        self.calls += 1;
        if value.is_infinite() {
            self.dead_ends += 1;
            return;
        }
        self.sum += value;
        self.best = Some(self.best.map_or(value, |b| b.min(value)));
    }

    /// Mean over finite values, `None` before the first finite value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> Option<f64> {
        let finite = self.calls - self.dead_ends;
        if finite == 0 {
            None
        } else {
            Some(self.sum / finite as f64)
        }
    }

    /// Fold another tracker into this one.
    pub fn merge(&mut self, other: &HeuristicStats) {
        self.calls += other.calls;
        self.dead_ends += other.dead_ends;
        self.sum += other.sum;
        self.best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}
