use crate::domain::simulator::control_plane::ControlPlane;
use crate::domain::simulator::event_scheduler::EventScheduler;
use crate::error::Result;

/// Single threaded event loop: pops events until the queue is exhausted.
#[derive(Debug)]
pub struct SimulationRunner<'a> {
    cp: &'a mut ControlPlane,
    events: &'a mut EventScheduler,
}

impl<'a> SimulationRunner<'a> {
    pub fn new(cp: &'a mut ControlPlane, events: &'a mut EventScheduler) -> Self {
        Self { cp, events }
    }

    /// Runs to queue exhaustion and returns the number of handled events. The first
    /// error aborts the run.
    pub fn run(&mut self) -> Result<usize> {
        let mut handled = 0;
        for event in self.events.by_ref() {
            self.cp.handle_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }
}
