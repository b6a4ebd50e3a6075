//! Duplexing writer: every write is kept in a buffer and forwarded to a live sink.

use std::collections::VecDeque;
use std::io::{self, Write};

/// Accumulates agent output while forwarding it to the console.
///
/// The live side is best effort: if the console stops accepting writes,
/// forwarding is switched off and capture carries on, so a closed terminal
/// cannot hide a completion signal.
pub struct TeeWriter<'a> {
    live: &'a mut (dyn Write + Send),
    buffer: VecDeque<u8>,
    limit: Option<usize>,
    dropped: usize,
    live_failed: bool,
}

impl<'a> TeeWriter<'a> {
    /// `limit` caps the captured buffer; the oldest bytes are discarded first
    pub fn new(live: &'a mut (dyn Write + Send), limit: Option<usize>) -> Self {
        Self {
            live,
            buffer: VecDeque::new(),
            limit,
            dropped: 0,
            live_failed: false,
        }
    }

    /// Bytes discarded because of the buffer limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Captured output as text, prefixed with a marker if the head was discarded
    pub fn into_output(self) -> String {
        let dropped = self.dropped;
        let bytes = Vec::from(self.buffer);
        let text = String::from_utf8_lossy(&bytes);
        if dropped > 0 {
            format!("[{} earlier bytes not retained]\n{}", dropped, text)
        } else {
            text.into_owned()
        }
    }

    fn forward(&mut self, buf: &[u8]) {
        if self.live_failed {
            return;
        }
        if let Err(e) = self.live.write_all(buf).and_then(|_| self.live.flush()) {
            log::warn!("Live output disabled: {}", e);
            self.live_failed = true;
        }
    }

    fn capture(&mut self, buf: &[u8]) {
        self.buffer.extend(buf);
        if let Some(limit) = self.limit
            && self.buffer.len() > limit
        {
            let excess = self.buffer.len() - limit;
            self.buffer.drain(..excess);
            self.dropped += excess;
        }
    }
}

impl Write for TeeWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.forward(buf);
        self.capture(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that rejects every write
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_both_sinks_receive_writes() {
        let mut live: Vec<u8> = Vec::new();
        let mut tee = TeeWriter::new(&mut live, None);
        tee.write_all(b"line one\n").unwrap();
        tee.write_all(b"line two\n").unwrap();
        let output = tee.into_output();

        assert_eq!(output, "line one\nline two\n");
        assert_eq!(live, b"line one\nline two\n");
    }

    #[test]
    fn test_limit_keeps_tail() {
        let mut live: Vec<u8> = Vec::new();
        let mut tee = TeeWriter::new(&mut live, Some(8));
        tee.write_all(b"0123456789").unwrap();
        tee.write_all(b"ab").unwrap();
        assert_eq!(tee.dropped(), 4);

        let output = tee.into_output();
        assert!(output.starts_with("[4 earlier bytes not retained]\n"));
        assert!(output.ends_with("456789ab"));
        assert_eq!(live, b"0123456789ab");
    }

    #[test]
    fn test_limit_holds_across_many_chunks() {
        let mut live = io::sink();
        let mut tee = TeeWriter::new(&mut live, Some(16));
        for i in 0..1000 {
            write!(tee, "{:04}|", i).unwrap();
        }
        assert_eq!(tee.dropped(), 5000 - 16);

        let output = tee.into_output();
        assert!(output.starts_with("[4984 earlier bytes not retained]\n"));
        assert!(output.ends_with("|0997|0998|0999|"));
    }

    #[test]
    fn test_broken_live_sink_keeps_capturing() {
        let mut live = BrokenPipe;
        let mut tee = TeeWriter::new(&mut live, None);
        tee.write_all(b"first ").unwrap();
        tee.write_all(b"second").unwrap();
        assert_eq!(tee.into_output(), "first second");
    }

    #[test]
    fn test_split_utf8_is_rejoined() {
        let mut live: Vec<u8> = Vec::new();
        let mut tee = TeeWriter::new(&mut live, None);
        let bytes = "héllo".as_bytes();
        tee.write_all(&bytes[..2]).unwrap();
        tee.write_all(&bytes[2..]).unwrap();
        assert_eq!(tee.into_output(), "héllo");
    }
}
