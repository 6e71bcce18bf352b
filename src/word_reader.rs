use std::io::{self, ErrorKind, Read};
use std::slice::ChunksExact;

use tracing::trace;

pub const BUFFER_CAPACITY: usize = 128;

/// Re-segments a byte stream into fixed-size words.
///
/// Each [`fill`](WordReader::fill) issues one read into a buffer sized in
/// whole words. Bytes that do not complete a word are carried over and
/// spliced in front of the next read, so every byte of the source lands in
/// exactly one word, in stream order, whatever sizes the reads return.
pub struct WordReader<R: Read> {
    source: R,
    word_size: usize,
    buffer: Vec<u8>,
    carry: Vec<u8>,
    words_read: usize,
    exhausted: bool,
}

impl<R: Read> WordReader<R> {
    pub fn new(source: R, word_size: usize) -> Self {
        Self::with_capacity(source, word_size, BUFFER_CAPACITY)
    }

    pub fn with_capacity(source: R, word_size: usize, capacity_words: usize) -> Self {
        assert!(word_size > 0, "word size must be at least one byte");
        assert!(capacity_words > 0, "buffer must hold at least one word");
        Self {
            source,
            word_size,
            buffer: vec![0; word_size * capacity_words],
            carry: Vec::with_capacity(word_size - 1),
            words_read: 0,
            exhausted: false,
        }
    }

    pub fn word_size(&self) -> usize {
        return self.word_size;
    }

    pub fn capacity_words(&self) -> usize {
        return self.buffer.len() / self.word_size;
    }

    pub fn carry(&self) -> &[u8] {
        return &self.carry;
    }

    pub fn is_exhausted(&self) -> bool {
        return self.exhausted;
    }

    /// Refills the buffer and returns the number of complete words now in it.
    ///
    /// A result of zero with [`is_exhausted`](WordReader::is_exhausted) false
    /// only means the read was too short to complete a word; calling again
    /// continues where it left off. On error the carry is left untouched and
    /// the buffer holds no words.
    pub fn fill(&mut self) -> io::Result<usize> {
        let carry_len = self.carry.len();
        self.buffer[..carry_len].copy_from_slice(&self.carry);
        self.words_read = 0;

        let bytes_read = loop {
            match self.source.read(&mut self.buffer[carry_len..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.exhausted = bytes_read == 0;

        let bytes_available = carry_len + bytes_read;
        let words_read = bytes_available / self.word_size;
        let words_end = words_read * self.word_size;

        self.carry.clear();
        self.carry.extend_from_slice(&self.buffer[words_end..bytes_available]);
        self.words_read = words_read;

        trace!(
            bytes_read,
            words_read,
            carry = self.carry.len(),
            "filled word buffer"
        );
        Ok(words_read)
    }

    pub fn words_read(&self) -> usize {
        return self.words_read;
    }

    pub fn word(&self, index: usize) -> Option<&[u8]> {
        if index >= self.words_read {
            return None;
        }
        let start = index * self.word_size;
        Some(&self.buffer[start..start + self.word_size])
    }

    pub fn words(&self) -> ChunksExact<'_, u8> {
        self.buffer[..self.words_read * self.word_size].chunks_exact(self.word_size)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{self, Cursor, ErrorKind, Read};

    use assert_matches::assert_matches;

    use super::WordReader;

    /// Hands out at most `chunk` bytes per read, cycling through `pattern`
    /// when it is non-empty, to simulate short reads from pipes.
    pub(crate) struct ChunkedReader<'a> {
        data: &'a [u8],
        pos: usize,
        pattern: &'a [usize],
        step: usize,
    }

    impl<'a> ChunkedReader<'a> {
        pub(crate) fn new(data: &'a [u8], pattern: &'a [usize]) -> Self {
            Self { data, pos: 0, pattern, step: 0 }
        }
    }

    impl Read for ChunkedReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk = self.pattern[self.step % self.pattern.len()];
            self.step += 1;
            let n = chunk.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    pub(crate) struct FailingReader<'a> {
        data: Option<&'a [u8]>,
    }

    impl<'a> FailingReader<'a> {
        pub(crate) fn new(data: &'a [u8]) -> Self {
            Self { data: Some(data) }
        }
    }

    impl Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                None => Err(io::Error::new(ErrorKind::Other, "device unplugged")),
            }
        }
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    fn collect_words<R: Read>(reader: &mut WordReader<R>) -> Vec<Vec<u8>> {
        let mut words = Vec::new();
        loop {
            reader.fill().unwrap();
            words.extend(reader.words().map(<[u8]>::to_vec));
            if reader.is_exhausted() {
                return words;
            }
        }
    }

    #[test]
    fn test_fill_whole_words() {
        let data = [0x00, 0x01, 0x02, 0x03];
        let mut reader = WordReader::new(Cursor::new(&data[..]), 2);

        assert_matches!(reader.fill(), Ok(2));
        assert_eq!(reader.word(0), Some(&[0x00, 0x01][..]));
        assert_eq!(reader.word(1), Some(&[0x02, 0x03][..]));
        assert_eq!(reader.word(2), None);
        assert!(reader.carry().is_empty());
        assert!(!reader.is_exhausted());

        assert_matches!(reader.fill(), Ok(0));
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_fill_carries_partial_word() {
        let data = [0xa0, 0xa1, 0xa2, 0xa3, 0xa4];
        let mut reader = WordReader::new(ChunkedReader::new(&data, &[3, 2]), 2);

        assert_matches!(reader.fill(), Ok(1));
        assert_eq!(reader.word(0), Some(&[0xa0, 0xa1][..]));
        assert_eq!(reader.carry(), &[0xa2]);

        assert_matches!(reader.fill(), Ok(1));
        assert_eq!(reader.word(0), Some(&[0xa2, 0xa3][..]));
        assert_eq!(reader.carry(), &[0xa4]);

        assert_matches!(reader.fill(), Ok(0));
        assert!(reader.is_exhausted());
        assert_eq!(reader.carry(), &[0xa4]);
    }

    #[test]
    fn test_short_read_without_word_is_not_end_of_input() {
        let data = [0x10, 0x20, 0x30, 0x40];
        let mut reader = WordReader::new(ChunkedReader::new(&data, &[1]), 4);

        for expected_carry in 1..4 {
            assert_matches!(reader.fill(), Ok(0));
            assert!(!reader.is_exhausted());
            assert_eq!(reader.carry().len(), expected_carry);
        }
        assert_matches!(reader.fill(), Ok(1));
        assert_eq!(reader.word(0), Some(&data[..]));
    }

    #[test]
    fn test_fill_never_reads_past_capacity() {
        let data = sample(40);
        let mut reader = WordReader::with_capacity(Cursor::new(&data[..]), 4, 3);

        assert_eq!(reader.capacity_words(), 3);
        assert_matches!(reader.fill(), Ok(3));
        assert_eq!(reader.words().count(), 3);
        assert_eq!(reader.into_inner().position(), 12);
    }

    #[test]
    fn test_chunked_reads_match_single_read() {
        let data = sample(1000);
        let patterns: [&[usize]; 5] = [&[1], &[3], &[7, 1, 2], &[5, 64, 1], &[1000]];

        for word_size in [1, 2, 3, 4, 8] {
            let consumed = data.len() / word_size * word_size;
            let expected: Vec<Vec<u8>> =
                data[..consumed].chunks(word_size).map(<[u8]>::to_vec).collect();

            for pattern in patterns.iter() {
                for capacity in [1, 17, 128] {
                    let source = ChunkedReader::new(&data, pattern);
                    let mut reader = WordReader::with_capacity(source, word_size, capacity);
                    assert_eq!(
                        collect_words(&mut reader),
                        expected,
                        "word size {word_size}, pattern {pattern:?}, capacity {capacity}"
                    );
                    assert_eq!(reader.carry(), &data[consumed..]);
                }
            }
        }
    }

    #[test]
    fn test_fill_accounts_for_every_byte() {
        let data = sample(300);

        for word_size in [1, 2, 4, 8] {
            for capacity in [1, 17, 128] {
                let source = ChunkedReader::new(&data, &[5, 11, 2]);
                let mut reader = WordReader::with_capacity(source, word_size, capacity);
                let mut total = 0;
                loop {
                    let carry_before = reader.carry().len();
                    let words = reader.fill().unwrap();
                    let read = words * word_size + reader.carry().len() - carry_before;
                    assert!(reader.carry().len() < word_size);
                    total += read;
                    if reader.is_exhausted() {
                        break;
                    }
                }
                assert_eq!(total, data.len());
            }
        }
    }

    mod proptests {
        use proptest::prelude::*;

        use super::{collect_words, ChunkedReader, WordReader};

        proptest! {
            #[test]
            fn test_short_reads_match_single_read(
                data in prop::collection::vec(any::<u8>(), 0..2048),
                pattern in prop::collection::vec(1usize..300, 1..8),
                word_size in 1usize..=16,
                capacity in 1usize..=130,
            ) {
                let consumed = data.len() / word_size * word_size;
                let expected: Vec<Vec<u8>> =
                    data[..consumed].chunks(word_size).map(<[u8]>::to_vec).collect();

                let whole = [data.len().max(1)];
                let mut single = WordReader::with_capacity(
                    ChunkedReader::new(&data, &whole),
                    word_size,
                    capacity,
                );
                let mut chunked = WordReader::with_capacity(
                    ChunkedReader::new(&data, &pattern),
                    word_size,
                    capacity,
                );

                prop_assert_eq!(collect_words(&mut single), expected.clone());
                prop_assert_eq!(collect_words(&mut chunked), expected);
                prop_assert_eq!(chunked.carry(), &data[consumed..]);
            }
        }
    }

    #[test]
    fn test_fill_error_keeps_carry() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = WordReader::new(FailingReader::new(&data), 2);

        assert_matches!(reader.fill(), Ok(1));
        assert_eq!(reader.carry(), &[0x03]);

        assert_matches!(reader.fill(), Err(e) => {
            assert_eq!(e.kind(), ErrorKind::Other);
        });
        assert_eq!(reader.carry(), &[0x03]);
        assert_eq!(reader.words_read(), 0);
        assert_eq!(reader.words().count(), 0);
    }

    #[test]
    fn test_fill_retries_interrupted_reads() {
        struct Interrupting {
            interrupted: bool,
        }

        impl Read for Interrupting {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(ErrorKind::Interrupted.into());
                }
                buf[0] = 0x5a;
                Ok(1)
            }
        }

        let mut reader = WordReader::new(Interrupting { interrupted: false }, 1);
        assert_matches!(reader.fill(), Ok(1));
        assert_eq!(reader.word(0), Some(&[0x5a][..]));
    }
}
