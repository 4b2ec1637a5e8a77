use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use nalgebra::Point3;
use serde::Deserialize;

use crate::driver::{FrameSink, FrameSource, SourceFrame};
use crate::frame::FrameResult;

// JSON structures for recorded detector output. One frame per line;
// handedness and score are carried by some recorders and only logged here.
#[derive(Deserialize, Debug)]
struct LandmarkRecord {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandRecord {
    #[serde(default)]
    handedness: Option<String>,
    #[serde(default)]
    score: Option<f32>,
    landmarks: Vec<LandmarkRecord>,
}

#[derive(Deserialize, Debug)]
struct FrameRecord {
    #[serde(default)]
    hands: Vec<HandRecord>,
}

/// Replays recorded hand-pose detector output from a newline-delimited JSON
/// file, one frame per line, onto a synthesized black canvas.
///
/// Landmark lists pass through with whatever length the recording holds;
/// a wrong count is the aggregator's per-hand error, not a file error.
pub struct ReplaySource {
    reader: BufReader<File>,
    line: usize,
    width: u32,
    height: u32,
}

impl ReplaySource {
    pub fn open<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<ReplaySource> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open landmark recording {}", path.display()))?;
        log::info!("replaying landmark recording {}", path.display());
        Ok(ReplaySource { reader: BufReader::new(file), line: 0, width, height })
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.line += 1;
            let read = self.reader.read_line(&mut buf)?;
            if read == 0 {
                return Ok(None);
            }
            let line = buf.trim();
            if line.is_empty() {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(line)
                .with_context(|| format!("bad frame record on line {}", self.line))?;
            let mut hands = Vec::with_capacity(record.hands.len());
            for hand in &record.hands {
                if let Some(handedness) = &hand.handedness {
                    log::debug!(
                        "line {}: {} hand, score {:.2}",
                        self.line,
                        handedness,
                        hand.score.unwrap_or(0.0)
                    );
                }
                hands.push(
                    hand.landmarks
                        .iter()
                        .map(|lm| Point3::new(lm.x, lm.y, lm.z))
                        .collect::<Vec<_>>(),
                );
            }
            let image = RgbImage::new(self.width, self.height);
            return Ok(Some(SourceFrame { image, hands }));
        }
    }
}

/// Writes annotated frames as numbered PNGs into a directory.
pub struct PngDirSink {
    dir: PathBuf,
    frame_index: usize,
}

impl PngDirSink {
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<PngDirSink> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        Ok(PngDirSink { dir, frame_index: 0 })
    }
}

impl FrameSink for PngDirSink {
    fn present(&mut self, canvas: RgbImage, result: &FrameResult) -> Result<()> {
        let path = self.dir.join(format!("frame_{:05}.png", self.frame_index));
        canvas
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        for (i, hand) in result.hands.iter().enumerate() {
            log::debug!(
                "frame {} hand {}: {} finger(s) extended",
                self.frame_index,
                i,
                hand.extended_count
            );
        }
        self.frame_index += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("handtracking_{}_{}", std::process::id(), name))
    }

    fn landmark_array(count: usize) -> String {
        let landmarks: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"x":0.5,"y":{},"z":0.0}}"#, i as f32 * 0.01))
            .collect();
        landmarks.join(",")
    }

    #[test]
    fn replays_frames_in_file_order() {
        let path = temp_path("replay.ndjson");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"hands":[{{"handedness":"Left","score":0.9,"landmarks":[{}]}}]}}"#,
            landmark_array(21)
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"hands":[]}}"#).unwrap();
        drop(file);

        let mut source = ReplaySource::open(&path, 320, 240).unwrap();
        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.image.dimensions(), (320, 240));
        assert_eq!(first.hands.len(), 1);
        assert_eq!(first.hands[0].len(), 21);
        assert_eq!(first.hands[0][0], Point3::new(0.5, 0.0, 0.0));
        // Blank line between records is skipped.
        let second = source.next_frame().unwrap().unwrap();
        assert!(second.hands.is_empty());
        assert!(source.next_frame().unwrap().is_none());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn short_landmark_lists_pass_through_raw() {
        let path = temp_path("replay_short.ndjson");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"hands":[{{"landmarks":[{}]}}]}}"#, landmark_array(19)).unwrap();
        drop(file);

        let mut source = ReplaySource::open(&path, 64, 64).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.hands[0].len(), 19);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn malformed_record_reports_its_line() {
        let path = temp_path("replay_bad.ndjson");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"hands":[]}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        drop(file);

        let mut source = ReplaySource::open(&path, 64, 64).unwrap();
        source.next_frame().unwrap();
        let err = source.next_frame().unwrap_err();
        assert!(err.to_string().contains("line 2"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn png_sink_numbers_its_frames() {
        let dir = temp_path("png_sink");
        let mut sink = PngDirSink::create(&dir).unwrap();
        sink.present(RgbImage::new(8, 8), &FrameResult::default()).unwrap();
        sink.present(RgbImage::new(8, 8), &FrameResult::default()).unwrap();
        assert!(dir.join("frame_00000.png").exists());
        assert!(dir.join("frame_00001.png").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
