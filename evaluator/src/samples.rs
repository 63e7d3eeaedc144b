use std::io::{self, BufRead, Write};
use std::ops::Range;

use board::{encode_board, Board, BoardError, NUM_FEATURES};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Encoded positions with their scores, grouped into lines of play.
///
/// Rows of the same line are stored contiguously and in play order, which is
/// what sequence training relies on.
#[derive(Clone, Debug, Default)]
pub struct Samples {
    pub features: Vec<[f32; NUM_FEATURES]>,
    pub scores: Vec<f32>,
    pub line_ids: Vec<usize>,
}

impl Samples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, features: [f32; NUM_FEATURES], score: f32, line_id: usize) {
        self.features.push(features);
        self.scores.push(score);
        self.line_ids.push(line_id);
    }

    pub fn push_board(&mut self, board: &Board, score: f32, line_id: usize) -> Result<(), BoardError> {
        self.push(encode_board(board)?, score, line_id);
        Ok(())
    }

    pub fn extend(&mut self, other: Samples) {
        self.features.extend(other.features);
        self.scores.extend(other.scores);
        self.line_ids.extend(other.line_ids);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn max_line_id(&self) -> Option<usize> {
        self.line_ids.iter().copied().max()
    }

    /// Shifts every line id, used when merging sample files.
    pub fn offset_line_ids(&mut self, offset: usize) {
        for id in &mut self.line_ids {
            *id += offset;
        }
    }

    /// Row ranges of consecutive rows sharing a line id.
    pub fn lines(&self) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for i in 1..=self.line_ids.len() {
            if i == self.line_ids.len() || self.line_ids[i] != self.line_ids[start] {
                lines.push(start..i);
                start = i;
            }
        }
        lines
    }

    /// Splits whole lines into train and test sets, so no line straddles both.
    pub fn split_lines(
        &self,
        test_ratio: f64,
        random_seed: Option<u64>,
    ) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
        let mut lines = self.lines();
        if let Some(seed) = random_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            lines.shuffle(&mut rng);
        }

        let test_len = (lines.len() as f64 * test_ratio.clamp(0.0, 1.0)) as usize;
        let train = lines.split_off(test_len);
        (train, lines)
    }

    pub fn sequence(&self, range: Range<usize>) -> &[[f32; NUM_FEATURES]] {
        &self.features[range]
    }

    pub fn batches<'a>(&'a self, indices: &'a [usize], batch_size: usize) -> Batches<'a> {
        Batches {
            samples: self,
            indices,
            batch_size: batch_size.max(1),
            idx: 0,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "line_id,score")?; // Header
        for i in 0..NUM_FEATURES {
            write!(writer, ",f{}", i)?;
        }
        writeln!(writer)?;

        for i in 0..self.len() {
            write!(writer, "{},{}", self.line_ids[i], self.scores[i])?;
            for value in &self.features[i] {
                write!(writer, ",{}", value)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    pub fn read<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut samples = Self::new();

        let mut header_line = String::new();
        if reader.read_line(&mut header_line)? == 0 {
            return Ok(samples);
        }

        let columns = header_line.trim().split(',').count();
        if columns != NUM_FEATURES + 2 {
            return Err(invalid_data(&format!(
                "Header has {} feature columns, expected {}",
                columns.saturating_sub(2),
                NUM_FEATURES
            )));
        }

        for line_res in reader.lines() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }

            let mut parts = line.split(',').map(str::trim);
            let line_id = parse_field::<usize>(parts.next(), "line_id")?;
            let score = parse_field::<f32>(parts.next(), "score")?;

            let mut features = [0f32; NUM_FEATURES];
            for (i, value) in features.iter_mut().enumerate() {
                *value = parse_field::<f32>(parts.next(), &format!("f{}", i))?;
            }
            if parts.next().is_some() {
                return Err(invalid_data("Too many fields in sample row"));
            }

            samples.push(features, score, line_id);
        }

        Ok(samples)
    }
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str) -> io::Result<T> {
    let field = field.ok_or_else(|| invalid_data(&format!("Missing {} field", name)))?;
    field
        .parse()
        .map_err(|_| invalid_data(&format!("Field {} is not valid: {:?}", name, field)))
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

pub struct Batches<'a> {
    samples: &'a Samples,
    indices: &'a [usize],
    batch_size: usize,
    idx: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = (Vec<&'a [f32; NUM_FEATURES]>, Vec<f32>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.indices.len() {
            return None;
        }
        let end = (self.idx + self.batch_size).min(self.indices.len());
        let batch = &self.indices[self.idx..end];
        self.idx = end;

        let features = batch.iter().map(|&i| &self.samples.features[i]).collect();
        let scores = batch.iter().map(|&i| self.samples.scores[i]).collect();
        Some((features, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::PieceKind;
    use std::io::BufReader;

    fn sample_lines() -> Samples {
        let mut samples = Samples::new();
        let mut board = Board::initial();
        samples.push_board(&board, 0.0, 0).unwrap();
        board.capture(PieceKind::Pawn, 8).unwrap();
        samples.push_board(&board, 0.1, 0).unwrap();
        samples.push_board(&Board::initial(), 0.0, 1).unwrap();
        samples.push_board(&board, 0.1, 2).unwrap();
        samples.push_board(&board, 0.1, 2).unwrap();
        samples
    }

    #[test]
    fn test_write_read() {
        let samples = sample_lines();

        let mut buffer = Vec::new();
        samples.write(&mut buffer).unwrap();
        let read = Samples::read(BufReader::new(buffer.as_slice())).unwrap();

        assert_eq!(read.len(), samples.len());
        assert_eq!(read.line_ids, samples.line_ids);
        assert_eq!(read.scores, samples.scores);
        assert_eq!(read.features, samples.features);
    }

    #[test]
    fn test_read_rejects_short_rows() {
        let mut data = Vec::new();
        Samples::new().write(&mut data).unwrap();
        data.extend_from_slice(b"0,0.5,1.0\n");

        let err = Samples::read(BufReader::new(data.as_slice())).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("Missing"), "{}", err);
    }

    #[test]
    fn test_read_rejects_other_feature_width() {
        let data = "line_id,score,f0,f1,f2\n0,0.5,1.0,2.0,3.0\n";
        let err = Samples::read(BufReader::new(data.as_bytes())).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("Header has 3 feature columns"), "{}", err);
    }

    #[test]
    fn test_read_empty_input() {
        let read = Samples::read(BufReader::new(&b""[..])).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_lines_group_contiguous_ids() {
        let samples = sample_lines();
        assert_eq!(samples.lines(), vec![0..2, 2..3, 3..5]);
        assert!(Samples::new().lines().is_empty());
    }

    #[test]
    fn test_split_keeps_lines_whole() {
        let samples = sample_lines();
        let (train, test) = samples.split_lines(0.34, Some(42));

        assert_eq!(train.len() + test.len(), 3);
        assert_eq!(test.len(), 1);
        let rows: usize = train.iter().chain(test.iter()).map(|r| r.len()).sum();
        assert_eq!(rows, samples.len());
    }

    #[test]
    fn test_batches_cover_indices() {
        let samples = sample_lines();
        let indices = vec![4, 0, 2, 1, 3];

        let batches: Vec<_> = samples.batches(&indices, 2).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].0.len(), 1);
        assert_eq!(batches[0].1, vec![0.1, 0.0]);
    }

    #[test]
    fn test_offset_line_ids() {
        let mut samples = sample_lines();
        samples.offset_line_ids(10);
        assert_eq!(samples.max_line_id(), Some(12));
    }
}
