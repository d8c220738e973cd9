use std::fmt;
use std::io;

/// Adapts an [`io::Write`] so the renderer can write through
/// [`fmt::Write`], holding on to the I/O error that `fmt::Error` can't carry.
pub(crate) struct Writer<W> {
    writer: W,
    err: Option<io::Error>,
}

impl<W> Writer<W>
where
    W: io::Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer, err: None }
    }

    pub fn take_err(&mut self) -> Option<io::Error> {
        self.err.take()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W> fmt::Write for Writer<W>
where
    W: io::Write,
{
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.writer.write_all(s.as_bytes()).map_err(|e| {
            self.err = Some(e);
            fmt::Error
        })
    }
}
