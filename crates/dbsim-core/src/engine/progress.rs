#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events of a workflow to an optional observer.
///
/// Reporters are shared across rayon workers, so the callback must be `Sync`.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Reports a phase with a known number of steps and returns a guard closing it.
    pub fn task(&self, name: &'static str, total_steps: u64) -> TaskGuard<'_, 'a> {
        self.report(Progress::PhaseStart { name });
        self.report(Progress::TaskStart { total_steps });
        TaskGuard { reporter: self }
    }
}

pub struct TaskGuard<'r, 'a> {
    reporter: &'r ProgressReporter<'a>,
}

impl TaskGuard<'_, '_> {
    #[inline]
    pub fn tick(&self) {
        self.reporter.report(Progress::TaskIncrement);
    }
}

impl Drop for TaskGuard<'_, '_> {
    fn drop(&mut self) {
        self.reporter.report(Progress::TaskFinish);
        self.reporter.report(Progress::PhaseFinish);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn task_guard_brackets_increments_with_start_and_finish() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(format!("{:?}", p));
        }));

        {
            let task = reporter.task("Grid search", 2);
            task.tick();
            task.tick();
        }

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "PhaseStart { name: \"Grid search\" }",
                "TaskStart { total_steps: 2 }",
                "TaskIncrement",
                "TaskIncrement",
                "TaskFinish",
                "PhaseFinish",
            ]
        );
    }

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        let task = reporter.task("Silent", 1);
        task.tick();
    }
}
