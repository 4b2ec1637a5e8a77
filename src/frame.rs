use nalgebra::Point3;

use crate::classifier::{FingerClassifier, HandResult};
use crate::hand::InvalidSkeleton;

/// A hand the aggregator could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandError {
    /// Position of the hand in the detector's reporting order.
    pub index: usize,
    pub reason: InvalidSkeleton,
}

/// Classification outcome for one frame.
///
/// `hands` keeps the detector's reporting order, minus any hand that failed
/// validation; those land in `errors` with their original index. Both are
/// empty for a frame with no detected hands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameResult {
    pub hands: Vec<HandResult>,
    pub errors: Vec<HandError>,
}

impl FrameResult {
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.errors.is_empty()
    }
}

impl FingerClassifier {
    /// Classify every detected hand in a frame.
    ///
    /// A hand with a bad landmark count is recorded in
    /// [`FrameResult::errors`] and skipped; the remaining hands are still
    /// classified. Runs on the calling thread, one hand after the other.
    pub fn classify_frame(&self, hands: &[Vec<Point3<f32>>]) -> FrameResult {
        let mut result = FrameResult::default();
        for (index, landmarks) in hands.iter().enumerate() {
            match self.classify(landmarks) {
                Ok(hand) => result.hands.push(hand),
                Err(reason) => result.errors.push(HandError { index, reason }),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{FingerId, FingerState};
    use crate::hand::{LANDMARK_COUNT, WRIST};

    fn raised_hand(tip_y: f32) -> Vec<Point3<f32>> {
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        points[WRIST] = Point3::new(0.5, 0.9, 0.0);
        for finger in [FingerId::Index, FingerId::Middle, FingerId::Ring, FingerId::Pinky] {
            points[finger.tip()] = Point3::new(0.5, tip_y, 0.0);
        }
        points
    }

    #[test]
    fn empty_frame_yields_empty_result() {
        let result = FingerClassifier::default().classify_frame(&[]);
        assert!(result.is_empty());
    }

    #[test]
    fn bad_hand_is_isolated_to_its_slot() {
        let frame = vec![raised_hand(0.1), vec![Point3::new(0.5, 0.5, 0.0); 19]];
        let result = FingerClassifier::default().classify_frame(&frame);
        assert_eq!(result.hands.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0],
            HandError { index: 1, reason: InvalidSkeleton { landmark_count: 19 } }
        );
    }

    #[test]
    fn classification_continues_after_a_bad_hand() {
        let frame = vec![
            vec![Point3::new(0.5, 0.5, 0.0); 19],
            raised_hand(0.1),
            raised_hand(0.8),
        ];
        let result = FingerClassifier::default().classify_frame(&frame);
        assert_eq!(result.hands.len(), 2);
        assert_eq!(result.errors[0].index, 0);
        // Detector order survives: the raised hand first, the dropped one
        // second.
        assert_eq!(result.hands[0].state(FingerId::Index), FingerState::Extended);
        assert!(result.hands[0].extended_count > result.hands[1].extended_count);
    }
}
