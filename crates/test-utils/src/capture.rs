use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use rerun::report::Reporter;

/// A cloneable in-memory writer, so tests can read back what a `Reporter`
/// printed.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }

    /// Return the captured text and start over.
    pub fn take(&self) -> String {
        let mut guard = self.inner.lock().unwrap();
        let text = String::from_utf8_lossy(&guard).into_owned();
        guard.clear();
        text
    }

    /// A reporter writing into this buffer, without terminal control codes.
    pub fn reporter(&self) -> Reporter {
        Reporter::new(Box::new(self.clone()), false)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
