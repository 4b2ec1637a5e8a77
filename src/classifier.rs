use enum_map::{enum_map, Enum, EnumMap};
use nalgebra::Point3;
use strum_macros::EnumIter;

use crate::hand::{
    HandSkeleton, InvalidSkeleton, INDEX_TIP, MIDDLE_TIP, PINKY_TIP, RING_TIP, THUMB_IP,
    THUMB_TIP, WRIST,
};

/// The five digits, in reporting order.
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug, Enum, EnumIter)]
pub enum FingerId {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerId {
    /// Landmark index of this finger's tip.
    pub fn tip(self) -> usize {
        match self {
            FingerId::Thumb => THUMB_TIP,
            FingerId::Index => INDEX_TIP,
            FingerId::Middle => MIDDLE_TIP,
            FingerId::Ring => RING_TIP,
            FingerId::Pinky => PINKY_TIP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FingerId::Thumb => "Thumb",
            FingerId::Index => "Index",
            FingerId::Middle => "Middle",
            FingerId::Ring => "Ring",
            FingerId::Pinky => "Pinky",
        }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug)]
pub enum FingerState {
    Extended,
    Folded,
}

impl FingerState {
    pub fn is_extended(self) -> bool {
        self == FingerState::Extended
    }

    pub fn name(self) -> &'static str {
        match self {
            FingerState::Extended => "Extended",
            FingerState::Folded => "Folded",
        }
    }
}

/// Decision rule mapping joint coordinates to per-finger states.
///
/// All three are cheap screen-space heuristics over the normalized landmark
/// coordinates, kept as literal arithmetic rather than true joint angles.
/// They assume a roughly upright hand facing the camera in a horizontally
/// mirrored frame; none of them attempts to handle arbitrary rotation.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Policy {
    /// Compare each tip against a knuckle further down the finger.
    ///
    /// Thumb: extended iff the tip (landmark 4) has smaller `x` than the
    /// joint below it (landmark 3). In a mirrored frame an open thumb points
    /// toward smaller `x`, so this rule is mirror- and handedness-dependent.
    /// Other fingers: extended iff the tip sits above (`y` smaller than) the
    /// pip joint two landmarks below it.
    TipPastKnuckle,
    /// Score the bend over the two segments nearest the tip.
    ///
    /// With `dip = tip - 1` and `pip = tip - 2` (thumb included, so 4, 3, 2),
    /// `score = (pip.y - tip.y) * (dip.y - pip.y)`; folded iff the score
    /// exceeds the configured fold threshold.
    SegmentBend,
    /// Compare reference landmarks against the wrist height.
    ///
    /// A finger is extended iff its reference landmark sits above the wrist;
    /// the thumb's reference is its ip joint (landmark 3), the others use
    /// their tips. The aggregate count samples six landmarks (both thumb ip
    /// and thumb tip plus the four fingertips), so it ranges 0 to 6.
    AboveWrist,
}

impl Default for Policy {
    fn default() -> Policy {
        Policy::TipPastKnuckle
    }
}

/// Default `SegmentBend` fold threshold.
pub const DEFAULT_FOLD_THRESHOLD: f32 = 0.03;

/// Per-frame finger-state classifier.
///
/// Pure and deterministic: identical landmarks produce identical results,
/// and no state is carried between calls. Cheap enough to run on every
/// frame of a video stream.
#[derive(Copy, Clone, Debug)]
pub struct FingerClassifier {
    pub policy: Policy,
    pub fold_threshold: f32,
}

impl Default for FingerClassifier {
    fn default() -> FingerClassifier {
        FingerClassifier::new(Policy::default())
    }
}

impl FingerClassifier {
    pub fn new(policy: Policy) -> FingerClassifier {
        FingerClassifier { policy, fold_threshold: DEFAULT_FOLD_THRESHOLD }
    }

    pub fn with_fold_threshold(mut self, fold_threshold: f32) -> FingerClassifier {
        self.fold_threshold = fold_threshold;
        self
    }

    /// Classify one detected hand from its raw landmark list.
    ///
    /// Fails with [`InvalidSkeleton`] when the list does not hold exactly 21
    /// landmarks; this is the only failure mode.
    pub fn classify(&self, landmarks: &[Point3<f32>]) -> Result<HandResult, InvalidSkeleton> {
        let skeleton = HandSkeleton::from_landmarks(landmarks)?;
        Ok(self.classify_skeleton(skeleton))
    }

    /// Classify an already validated skeleton.
    pub fn classify_skeleton(&self, skeleton: HandSkeleton) -> HandResult {
        let states = enum_map! {
            FingerId::Thumb => self.finger_state(&skeleton, FingerId::Thumb),
            FingerId::Index => self.finger_state(&skeleton, FingerId::Index),
            FingerId::Middle => self.finger_state(&skeleton, FingerId::Middle),
            FingerId::Ring => self.finger_state(&skeleton, FingerId::Ring),
            FingerId::Pinky => self.finger_state(&skeleton, FingerId::Pinky),
        };
        let extended_count = match self.policy {
            Policy::AboveWrist => above_wrist_count(&skeleton),
            _ => states.values().filter(|state| state.is_extended()).count() as u8,
        };
        HandResult { skeleton, states, extended_count }
    }

    fn finger_state(&self, skeleton: &HandSkeleton, finger: FingerId) -> FingerState {
        match self.policy {
            Policy::TipPastKnuckle => tip_past_knuckle(skeleton, finger),
            Policy::SegmentBend => segment_bend(skeleton, finger, self.fold_threshold),
            Policy::AboveWrist => above_wrist(skeleton, finger),
        }
    }
}

/// One hand's classification outcome, with the skeleton it was computed
/// from for overlay rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct HandResult {
    pub skeleton: HandSkeleton,
    /// State for every finger; the map is total by construction.
    pub states: EnumMap<FingerId, FingerState>,
    /// Number of extended fingers. 0 to 5, except under
    /// [`Policy::AboveWrist`] where the six-sample count reaches 6.
    pub extended_count: u8,
}

impl HandResult {
    pub fn state(&self, finger: FingerId) -> FingerState {
        self.states[finger]
    }

    pub fn is_extended(&self, finger: FingerId) -> bool {
        self.states[finger].is_extended()
    }
}

fn tip_past_knuckle(skeleton: &HandSkeleton, finger: FingerId) -> FingerState {
    let extended = match finger {
        FingerId::Thumb => skeleton[THUMB_TIP].x < skeleton[THUMB_IP].x,
        _ => {
            let tip = finger.tip();
            skeleton[tip].y < skeleton[tip - 2].y
        }
    };
    if extended {
        FingerState::Extended
    } else {
        FingerState::Folded
    }
}

fn segment_bend(skeleton: &HandSkeleton, finger: FingerId, fold_threshold: f32) -> FingerState {
    let t = finger.tip();
    let tip = skeleton[t];
    let dip = skeleton[t - 1];
    let pip = skeleton[t - 2];
    let score = (pip.y - tip.y) * (dip.y - pip.y);
    if score > fold_threshold {
        FingerState::Folded
    } else {
        FingerState::Extended
    }
}

fn above_wrist(skeleton: &HandSkeleton, finger: FingerId) -> FingerState {
    let reference = match finger {
        FingerId::Thumb => THUMB_IP,
        _ => finger.tip(),
    };
    if skeleton[reference].y < skeleton[WRIST].y {
        FingerState::Extended
    } else {
        FingerState::Folded
    }
}

fn above_wrist_count(skeleton: &HandSkeleton) -> u8 {
    const SAMPLES: [usize; 6] = [THUMB_IP, THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
    let wrist_y = skeleton[WRIST].y;
    SAMPLES.iter().filter(|&&landmark| skeleton[landmark].y < wrist_y).count() as u8
}
