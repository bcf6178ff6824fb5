// src/io/xdatcar.rs
//
// XDATCAR trajectories: a fixed 7-line header followed by repeated
// `<mode> configuration= <n>` prompts, each with one coordinate block.
// Frames are read lazily; every call to `Xdatcar::frames` reopens the file.

use crate::error::{Error, Result};
use crate::io::Format;
use crate::model::{AtomicSystem, CoordinateMode, Lattice};
use crate::utils::tokens;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// title, scale, 3 basis rows, type labels, type counts
pub const HEADER_LINES: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryHeader {
    pub title: String,
    pub lattice: Lattice,
    pub atom_types: Vec<String>,
    pub atom_counts: Vec<usize>,
}

impl TrajectoryHeader {
    pub fn total_count(&self) -> usize {
        self.atom_counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: i64,
    pub mode: CoordinateMode,
    pub coordinates: Vec<[f64; 3]>,
}

#[derive(Debug, Clone)]
pub struct Xdatcar {
    path: PathBuf,
    header: TrajectoryHeader,
}

impl Xdatcar {
    /// Reads the header only; frames are left on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut lines = BufReader::new(File::open(&path)?).lines();
        let header = read_header(&mut lines)?;
        log::info!(
            "Opened trajectory {} ({} atoms per frame)",
            path.display(),
            header.total_count()
        );
        Ok(Self { path, header })
    }

    pub fn header(&self) -> &TrajectoryHeader {
        &self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh pass over the frames with its own file handle.
    pub fn frames(&self) -> Result<Frames<BufReader<File>>> {
        let file = File::open(&self.path)?;
        let (_, frames) = read_frames(BufReader::new(file))?;
        Ok(frames)
    }

    /// The system at one frame of this trajectory.
    pub fn snapshot(&self, frame: &Frame) -> Result<AtomicSystem> {
        snapshot(&self.header, frame)
    }
}

pub fn snapshot(header: &TrajectoryHeader, frame: &Frame) -> Result<AtomicSystem> {
    Ok(AtomicSystem::from_declared_counts(
        header.atom_types.clone(),
        header.atom_counts.clone(),
        frame.coordinates.clone(),
    )?
    .with_lattice(header.lattice)
    .with_mode(frame.mode)
    .with_frame_index(frame.index))
}

fn next_line<R: BufRead>(lines: &mut Lines<R>, line_no: usize) -> Result<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(Error::parse(Format::Xdatcar, line_no, "unexpected end of file")),
    }
}

pub fn read_header<R: BufRead>(lines: &mut Lines<R>) -> Result<TrajectoryHeader> {
    let title = next_line(lines, 1)?.trim().to_string();

    let scale_line = next_line(lines, 2)?;
    let scale = match tokens::str2list(&scale_line).first() {
        Some(tok) => tokens::parse_f64(tok, Format::Xdatcar, 2)?,
        None => return Err(Error::parse(Format::Xdatcar, 2, "missing scale factor")),
    };

    let mut basis = [[0.0; 3]; 3];
    for (i, row) in basis.iter_mut().enumerate() {
        let ln = 3 + i;
        let parts = tokens::line2list(&next_line(lines, ln)?, Format::Xdatcar, ln)?;
        if parts.len() < 3 {
            return Err(Error::parse(Format::Xdatcar, ln, "invalid lattice line"));
        }
        row.copy_from_slice(&parts[..3]);
    }

    let atom_types: Vec<String> = tokens::str2list(&next_line(lines, 6)?)
        .into_iter()
        .map(str::to_string)
        .collect();
    let counts_line = next_line(lines, 7)?;
    let atom_counts = tokens::str2list(&counts_line)
        .into_iter()
        .map(|tok| tokens::parse_usize(tok, Format::Xdatcar, 7))
        .collect::<Result<Vec<usize>>>()?;
    if atom_types.len() != atom_counts.len() {
        return Err(Error::parse(
            Format::Xdatcar,
            7,
            format!(
                "{} atom types but {} counts",
                atom_types.len(),
                atom_counts.len()
            ),
        ));
    }

    log::debug!("XDATCAR header: types {:?}, counts {:?}", atom_types, atom_counts);
    Ok(TrajectoryHeader {
        title,
        lattice: Lattice::new(basis, scale),
        atom_types,
        atom_counts,
    })
}

/// Reads the header from `reader` and returns it with an iterator over the
/// frames that follow.
pub fn read_frames<R: BufRead>(reader: R) -> Result<(TrajectoryHeader, Frames<R>)> {
    let mut lines = reader.lines();
    let header = read_header(&mut lines)?;
    let frames = Frames {
        lines,
        line_no: HEADER_LINES,
        ntot: header.total_count(),
        finished: false,
    };
    Ok((header, frames))
}

/// Lazy sequence of frames. Ends at the first prompt line without '='
/// (or at end of file); a block cut short by end of file is an error.
pub struct Frames<R> {
    lines: Lines<R>,
    line_no: usize,
    ntot: usize,
    finished: bool,
}

impl<R: BufRead> Frames<R> {
    fn read_next(&mut self) -> Result<Option<Frame>> {
        let prompt = match self.lines.next() {
            Some(line) => line?,
            None => return Ok(None),
        };
        self.line_no += 1;

        if !prompt.contains('=') {
            return Ok(None);
        }
        let index = tokens::step_after_equals(&prompt).ok_or_else(|| {
            Error::parse(Format::Xdatcar, self.line_no, "invalid frame prompt")
        })?;

        let mut coordinates = Vec::with_capacity(self.ntot.min(1 << 16));
        for _ in 0..self.ntot {
            self.line_no += 1;
            let line = match self.lines.next() {
                Some(line) => line?,
                None => return Err(Error::parse(Format::Xdatcar, self.line_no, "frame ended early")),
            };
            let parts = tokens::str2list(&line);
            coordinates.push(tokens::parse_row3(&parts, Format::Xdatcar, self.line_no)?);
        }

        Ok(Some(Frame {
            index,
            mode: CoordinateMode::from_line(&prompt),
            coordinates,
        }))
    }
}

impl<R: BufRead> Iterator for Frames<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRAJ: &str = "\
Pt O
1.0
 5.0 0.0 0.0
 0.0 5.0 0.0
 0.0 0.0 5.0
 Pt O
 2 1
Direct configuration=     1
 0.0 0.0 0.0
 0.5 0.5 0.0
 0.2 0.2 0.2
Direct configuration=     2
 0.0 0.0 0.1
 0.5 0.5 0.1
 0.2 0.2 0.3
";

    #[test]
    fn test_header() {
        let (header, _) = read_frames(TRAJ.as_bytes()).unwrap();
        assert_eq!(header.title, "Pt O");
        assert_eq!(header.atom_types, ["Pt", "O"]);
        assert_eq!(header.atom_counts, [2, 1]);
        assert_eq!(header.total_count(), 3);
        assert_eq!(header.lattice.basis[2], [0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_frames_in_order() {
        let (_, frames) = read_frames(TRAJ.as_bytes()).unwrap();
        let frames: Vec<Frame> = frames.collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].index, 1);
        assert_eq!(frames[1].index, 2);
        assert_eq!(frames[1].coordinates[2], [0.2, 0.2, 0.3]);
        assert_eq!(frames[1].mode, CoordinateMode::Direct);
    }

    #[test]
    fn test_prompt_without_equals_ends() {
        let text = format!("{}Direct configuration\n 9 9 9\n", TRAJ);
        let (_, frames) = read_frames(text.as_bytes()).unwrap();
        let indices: Vec<i64> = frames.map(|f| f.unwrap().index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_truncated_frame_is_error() {
        let text = format!("{}Direct configuration=     3\n 0 0 0\n", TRAJ);
        let (_, mut frames) = read_frames(text.as_bytes()).unwrap();
        assert!(frames.next().unwrap().is_ok());
        assert!(frames.next().unwrap().is_ok());
        let err = frames.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Parse { line: 18, .. }));
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_header_only() {
        let header_only: String = TRAJ.lines().take(7).map(|l| format!("{}\n", l)).collect();
        let (_, mut frames) = read_frames(header_only.as_bytes()).unwrap();
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_restartable_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TRAJ.as_bytes()).unwrap();

        let traj = Xdatcar::open(file.path()).unwrap();
        let mut first = traj.frames().unwrap();
        let mut second = traj.frames().unwrap();

        assert_eq!(first.next().unwrap().unwrap().index, 1);
        assert_eq!(first.next().unwrap().unwrap().index, 2);
        // Independent position
        assert_eq!(second.next().unwrap().unwrap().index, 1);

        let again: Vec<i64> = traj.frames().unwrap().map(|f| f.unwrap().index).collect();
        assert_eq!(again, vec![1, 2]);
    }

    #[test]
    fn test_snapshot() {
        let (header, mut frames) = read_frames(TRAJ.as_bytes()).unwrap();
        let frame = frames.nth(1).unwrap().unwrap();
        let s = snapshot(&header, &frame).unwrap();

        assert_eq!(s.frame_index(), Some(2));
        assert_eq!(s.atom_types(), ["Pt", "O"]);
        assert!((s.volume().unwrap() - 125.0).abs() < 1e-9);
    }
}
