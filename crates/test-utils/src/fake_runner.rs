use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rerun::exec::{CommandOutcome, CommandRunner, CommandSpec};

/// A fake runner that:
/// - records the command line of every run
/// - returns scripted outcomes in order, then `Success`
/// - optionally blocks for a while, to simulate a long command
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    executed: Arc<Mutex<Vec<String>>>,
    outcomes: Arc<Mutex<VecDeque<CommandOutcome>>>,
    delay: Option<Duration>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next unscripted run.
    pub fn with_outcome(self, outcome: CommandOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    /// Make every run take `delay` before finishing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared handle to the list of executed command lines.
    pub fn executed(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }

    pub fn run_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a mut self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = CommandOutcome> + Send + 'a>> {
        let executed = Arc::clone(&self.executed);
        let outcomes = Arc::clone(&self.outcomes);
        let delay = self.delay;

        Box::pin(async move {
            executed.lock().unwrap().push(spec.joined());
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(CommandOutcome::Success)
        })
    }
}
