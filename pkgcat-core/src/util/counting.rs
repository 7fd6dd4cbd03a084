use std::io::{Result, Write};

/// Write adapter that counts bytes passed through.
pub struct CountingWriter<W: Write> {
    inner: W,
    pub n: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, n: 0 }
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let k = self.inner.write(buf)?;
        self.n += k as u64;
        Ok(k)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}
