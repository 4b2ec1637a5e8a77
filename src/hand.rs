use std::error::Error;
use std::fmt;
use std::ops::Index;

use nalgebra::Point3;

/// Number of landmarks in one hand skeleton (MediaPipe Hands convention).
pub const LANDMARK_COUNT: usize = 21;

// Landmark indices. Fixed anatomical topology: wrist, then four joints per
// digit from the palm outward.
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Hand skeleton connections for rendering (finger chains plus palm edges).
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
];

/// A detected hand reported with a landmark count other than 21.
///
/// The only failure the classification core produces. Deterministic for a
/// given input and never retryable; the frame aggregator records it per hand
/// and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSkeleton {
    pub landmark_count: usize,
}

impl fmt::Display for InvalidSkeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid hand skeleton: expected {} landmarks, got {}",
            LANDMARK_COUNT, self.landmark_count
        )
    }
}

impl Error for InvalidSkeleton {}

/// One hand's 21 landmarks for a single frame.
///
/// Coordinates are normalized: `x`, `y` in `[0, 1]` relative to frame width
/// and height, origin at the top-left, `y` increasing downward. `z` is a
/// relative depth estimate from the detector. Built fresh per frame and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HandSkeleton {
    landmarks: [Point3<f32>; LANDMARK_COUNT],
}

impl HandSkeleton {
    /// Validates the landmark count and takes a copy of the points.
    pub fn from_landmarks(points: &[Point3<f32>]) -> Result<HandSkeleton, InvalidSkeleton> {
        let landmarks: [Point3<f32>; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| InvalidSkeleton { landmark_count: points.len() })?;
        Ok(HandSkeleton { landmarks })
    }

    /// Construct from flattened x, y, z triples (21 * 3 = 63 values), the
    /// layout landmark detectors commonly hand over.
    pub fn from_flat(coords: &[f32]) -> Result<HandSkeleton, InvalidSkeleton> {
        if coords.len() != LANDMARK_COUNT * 3 {
            // A partial trailing triple still counts as a landmark.
            return Err(InvalidSkeleton { landmark_count: (coords.len() + 2) / 3 });
        }
        let mut landmarks = [Point3::origin(); LANDMARK_COUNT];
        for (i, landmark) in landmarks.iter_mut().enumerate() {
            *landmark = Point3::new(coords[i * 3], coords[i * 3 + 1], coords[i * 3 + 2]);
        }
        Ok(HandSkeleton { landmarks })
    }

    pub fn landmarks(&self) -> &[Point3<f32>; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Point3<f32> {
        self.landmarks[WRIST]
    }
}

impl Index<usize> for HandSkeleton {
    type Output = Point3<f32>;

    fn index(&self, landmark: usize) -> &Point3<f32> {
        &self.landmarks[landmark]
    }
}
