use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use crate::domain::flow::Flow;
use crate::domain::simulator::event::Event;
use crate::domain::virtual_topology::light_path::LightPath;
use crate::error::Result;

/// Write-only sink for the simulation trace.
///
/// The core calls each method exactly once per occurrence and propagates any error
/// unchanged.
pub trait TraceSink: fmt::Debug {
    fn add_event(&mut self, event: &Event) -> Result<()>;

    fn accept_flow(&mut self, flow: &Flow, light_path: &LightPath) -> Result<()>;

    fn block_flow(&mut self, flow: &Flow) -> Result<()>;

    fn create_light_path(&mut self, light_path: &LightPath) -> Result<()>;

    fn remove_light_path(&mut self, light_path: &LightPath) -> Result<()>;

    /// Flushes buffered output at the end of a run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One simulation run is single threaded, so the virtual topology and the control
/// plane share the tracer through a `RefCell`.
pub type SharedTraceSink = Rc<RefCell<dyn TraceSink>>;

/// Line based tracer. Without a writer every call is a no-op.
pub struct Tracer {
    writer: Option<Box<dyn Write>>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("enabled", &self.writer.is_some()).finish()
    }
}

impl Tracer {
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn to_writer(writer: Box<dyn Write>) -> Self {
        Self { writer: Some(writer) }
    }

    pub fn to_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        log::info!("Writing trace to '{}'.", path.as_ref().display());
        Ok(Self::to_writer(Box::new(BufWriter::new(file))))
    }

    pub fn shared(self) -> SharedTraceSink {
        Rc::new(RefCell::new(self))
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    fn write_line(&mut self, line: fmt::Arguments<'_>) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_fmt(line)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl TraceSink for Tracer {
    fn add_event(&mut self, event: &Event) -> Result<()> {
        self.write_line(format_args!("{}", event))
    }

    fn accept_flow(&mut self, flow: &Flow, light_path: &LightPath) -> Result<()> {
        self.write_line(format_args!("flow-accepted {} {}", flow, light_path.to_trace()))
    }

    fn block_flow(&mut self, flow: &Flow) -> Result<()> {
        self.write_line(format_args!("flow-blocked {}", flow))
    }

    fn create_light_path(&mut self, light_path: &LightPath) -> Result<()> {
        self.write_line(format_args!("lp-add {}", light_path.to_trace()))
    }

    fn remove_light_path(&mut self, light_path: &LightPath) -> Result<()> {
        self.write_line(format_args!("lp-rem {}", light_path.to_trace()))
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::error!("Failed to flush trace: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network::slot::Slot;
    use crate::domain::utils::id::{FlowId, LightPathId, LinkId, NodeId};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_trace_lines() {
        let buffer = SharedBuffer::default();
        let mut tracer = Tracer::to_writer(Box::new(buffer.clone()));

        let flow = Flow::new(FlowId::new(4), NodeId::new(0), NodeId::new(2), 25.0, 3.0).unwrap();
        let lp = LightPath::new(LightPathId::new(1), NodeId::new(0), NodeId::new(2), vec![LinkId::new(0), LinkId::new(2)], vec![Slot::new(0, 0)], 0, None)
            .unwrap();

        tracer.add_event(&Event::arrival(1.5, flow.clone())).unwrap();
        tracer.create_light_path(&lp).unwrap();
        tracer.accept_flow(&flow, &lp).unwrap();
        tracer.block_flow(&flow).unwrap();
        tracer.remove_light_path(&lp).unwrap();
        tracer.add_event(&Event::departure(4.5, flow.get_id())).unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["a 1.5 4 0 2 25 3", "lp-add 1 0 2 0-2-", "flow-accepted 4 0 2 25 3 1 0 2 0-2-", "flow-blocked 4 0 2 25 3", "lp-rem 1 0 2 0-2-", "d 4.5 4"]
        );
    }

    #[test]
    fn test_disabled_tracer_is_silent() {
        let mut tracer = Tracer::disabled();
        let flow = Flow::new(FlowId::new(0), NodeId::new(0), NodeId::new(1), 1.0, 1.0).unwrap();
        assert!(!tracer.is_enabled());
        assert!(tracer.block_flow(&flow).is_ok());
    }
}
