use tracing::info;

/// Called once at the start of every iteration.
///
/// Interrupts only observe: the transition loop runs to completion whatever
/// the callback does, short of panicking.
pub trait Interrupt {
    fn interrupt(&mut self);
}

impl<T: FnMut()> Interrupt for T {
    fn interrupt(&mut self) {
        self()
    }
}

/// Called once per iteration with the 1-indexed iteration number.
pub trait IterationCallback {
    fn iteration(&mut self, it: usize);
}

impl<T: FnMut(usize)> IterationCallback for T {
    fn iteration(&mut self, it: usize) {
        self(it)
    }
}

/// Default progress report through `tracing`.
///
/// Iterations up to `num_warmup` are labelled warmup, later ones sampling.
#[derive(Clone, Debug)]
pub struct LogIteration {
    start: usize,
    num_warmup: usize,
    finish: usize,
    refresh: usize,
}

impl LogIteration {
    /// Report on iterations `start + 1 ..= finish` every `refresh` iterations.
    /// A `refresh` of 0 disables reporting.
    pub fn new(start: usize, num_warmup: usize, finish: usize, refresh: usize) -> Self {
        LogIteration {
            start,
            num_warmup,
            finish,
            refresh,
        }
    }

    /// Whether iteration `it` is reported.
    pub fn reports(&self, it: usize) -> bool {
        if self.refresh == 0 || it <= self.start {
            return false;
        }
        let m = it - self.start;
        m == 1 || it == self.finish || m % self.refresh == 0
    }

    /// The progress line for iteration `it`.
    pub fn message(&self, it: usize) -> String {
        let width = self.finish.to_string().len();
        let pct = if self.finish == 0 {
            100
        } else {
            100 * it / self.finish
        };
        let phase = if it <= self.num_warmup {
            "Warmup"
        } else {
            "Sampling"
        };
        format!(
            "Iteration: {it:>width$} / {finish} [{pct:>3}%]  ({phase})",
            finish = self.finish
        )
    }
}

impl IterationCallback for LogIteration {
    fn iteration(&mut self, it: usize) {
        if self.reports(it) {
            info!("{}", self.message(it));
        }
    }
}
