use std::time::Instant;

use anyhow::Result;
use image::RgbImage;
use nalgebra::Point3;

use crate::classifier::FingerClassifier;
use crate::frame::FrameResult;
use crate::overlay::{self, OverlayStyle};

/// One frame of upstream output: the image to draw on plus the raw landmark
/// lists the hand-pose detector reported for it, in detector order.
#[derive(Debug)]
pub struct SourceFrame {
    pub image: RgbImage,
    pub hands: Vec<Vec<Point3<f32>>>,
}

/// Upstream collaborator seam. A camera paired with a hand-pose detector
/// lives behind this, as does a recording of one.
pub trait FrameSource: Send {
    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<SourceFrame>>;
}

/// Downstream collaborator seam for displaying or storing annotated frames.
pub trait FrameSink: Send {
    fn present(&mut self, canvas: RgbImage, result: &FrameResult) -> Result<()>;
}

/// Totals from one run over a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub hands: u64,
    pub skipped_hands: u64,
}

/// Pull frames until the source runs dry, classifying each one synchronously
/// and presenting the annotated canvas to the sink.
///
/// Stopping is simply the source returning `None`; the caller owns source
/// and sink, so both are released on every exit path. Hands the aggregator
/// skipped are logged per frame and counted in the stats.
pub fn run(
    source: &mut dyn FrameSource,
    classifier: &FingerClassifier,
    style: &OverlayStyle,
    sink: &mut dyn FrameSink,
) -> Result<RunStats> {
    let mut stats = RunStats::default();
    while let Some(frame) = source.next_frame()? {
        let started = Instant::now();
        let result = classifier.classify_frame(&frame.hands);
        for error in &result.errors {
            log::warn!("frame {}: skipping hand {}: {}", stats.frames, error.index, error.reason);
        }
        let mut canvas = frame.image;
        overlay::draw_frame(&mut canvas, &result, style);
        sink.present(canvas, &result)?;
        stats.hands += result.hands.len() as u64;
        stats.skipped_hands += result.errors.len() as u64;
        log::debug!("frame {} processed in {:?}", stats.frames, started.elapsed());
        stats.frames += 1;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::LANDMARK_COUNT;
    use anyhow::bail;
    use std::collections::VecDeque;

    struct ScriptedSource {
        frames: VecDeque<SourceFrame>,
        fail: bool,
    }

    impl ScriptedSource {
        fn new(frames: Vec<SourceFrame>) -> ScriptedSource {
            ScriptedSource { frames: frames.into(), fail: false }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
            if self.fail {
                bail!("source failed");
            }
            Ok(self.frames.pop_front())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        results: Vec<FrameResult>,
        sizes: Vec<(u32, u32)>,
        fail: bool,
    }

    impl FrameSink for CollectingSink {
        fn present(&mut self, canvas: RgbImage, result: &FrameResult) -> Result<()> {
            if self.fail {
                bail!("sink failed");
            }
            self.sizes.push((canvas.width(), canvas.height()));
            self.results.push(result.clone());
            Ok(())
        }
    }

    fn frame(hands: Vec<Vec<Point3<f32>>>) -> SourceFrame {
        SourceFrame { image: RgbImage::new(64, 48), hands }
    }

    fn full_hand() -> Vec<Point3<f32>> {
        vec![Point3::new(0.5, 0.5, 0.0); LANDMARK_COUNT]
    }

    #[test]
    fn runs_until_source_is_exhausted() {
        let mut source =
            ScriptedSource::new(vec![frame(vec![full_hand()]), frame(vec![])]);
        let mut sink = CollectingSink::default();
        let classifier = FingerClassifier::default();
        let stats =
            run(&mut source, &classifier, &OverlayStyle::default(), &mut sink).unwrap();
        assert_eq!(stats, RunStats { frames: 2, hands: 1, skipped_hands: 0 });
        assert_eq!(sink.results.len(), 2);
        assert_eq!(sink.results[0].hands.len(), 1);
        assert!(sink.results[1].is_empty());
        assert_eq!(sink.sizes, vec![(64, 48), (64, 48)]);
    }

    #[test]
    fn skipped_hands_reach_the_sink_as_errors() {
        let bad_hand = vec![Point3::new(0.5, 0.5, 0.0); 19];
        let mut source = ScriptedSource::new(vec![frame(vec![full_hand(), bad_hand])]);
        let mut sink = CollectingSink::default();
        let classifier = FingerClassifier::default();
        let stats =
            run(&mut source, &classifier, &OverlayStyle::default(), &mut sink).unwrap();
        assert_eq!(stats, RunStats { frames: 1, hands: 1, skipped_hands: 1 });
        assert_eq!(sink.results[0].errors[0].index, 1);
    }

    #[test]
    fn source_failure_stops_the_run() {
        let mut source = ScriptedSource::new(vec![]);
        source.fail = true;
        let mut sink = CollectingSink::default();
        let classifier = FingerClassifier::default();
        let err = run(&mut source, &classifier, &OverlayStyle::default(), &mut sink)
            .unwrap_err();
        assert!(err.to_string().contains("source failed"));
        assert!(sink.results.is_empty());
    }

    #[test]
    fn sink_failure_propagates() {
        let mut source = ScriptedSource::new(vec![frame(vec![])]);
        let mut sink = CollectingSink { fail: true, ..CollectingSink::default() };
        let classifier = FingerClassifier::default();
        let err = run(&mut source, &classifier, &OverlayStyle::default(), &mut sink)
            .unwrap_err();
        assert!(err.to_string().contains("sink failed"));
    }
}
