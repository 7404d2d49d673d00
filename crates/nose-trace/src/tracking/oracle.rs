//! Detection oracle adapter.
//!
//! The detection model lives outside the core. Whatever it emits (one pose
//! with facial keypoints, or several faces with landmarks and descriptors)
//! is normalized here into a flat list of [`Candidate`]s per frame.

use glam::Vec2;
use serde::Deserialize;

use super::descriptor::Descriptor;

/// Keypoint confidence needed for the nose and eyes to join the face center.
const EYE_CONFIDENCE: f32 = 0.3;
/// Ears are noisier, so they join the face center at a lower bar.
const EAR_CONFIDENCE: f32 = 0.2;
/// Face width estimated from the inter-eye distance when ears are missing.
const EYE_SPAN_TO_FACE_WIDTH: f32 = 2.0;

/// One detected person in one frame, in source-frame coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Primary tracking point (nose tip).
    pub position: Vec2,
    /// Whole-face center, when the oracle provides enough points for one.
    pub anchor: Option<Vec2>,
    /// Face width in source pixels, a proxy for distance to the camera.
    pub size: Option<f32>,
    pub confidence: f32,
    pub descriptor: Option<Descriptor>,
}

impl Candidate {
    /// A bare point candidate with no face geometry.
    pub fn at(position: Vec2, confidence: f32) -> Self {
        Self {
            position,
            anchor: None,
            size: None,
            confidence,
            descriptor: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }
}

/// A single scored keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "score")]
    pub confidence: f32,
}

impl Keypoint {
    fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn confident(kp: Option<&Keypoint>, min: f32) -> Option<Vec2> {
        kp.filter(|k| k.confidence > min).map(Keypoint::point)
    }
}

/// Facial keypoints of a pose-estimation result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseDetection {
    pub nose: Option<Keypoint>,
    pub left_eye: Option<Keypoint>,
    pub right_eye: Option<Keypoint>,
    pub left_ear: Option<Keypoint>,
    pub right_ear: Option<Keypoint>,
}

/// Axis-aligned face box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A face-recognition result: box, optional nose tip, optional embedding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FaceDetection {
    #[serde(rename = "box")]
    pub bounds: FaceBox,
    pub score: f32,
    #[serde(default)]
    pub nose: Option<[f32; 2]>,
    #[serde(default)]
    pub descriptor: Option<Vec<f32>>,
}

/// Anything the oracle can emit for one person.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawDetection {
    Pose(PoseDetection),
    Face(FaceDetection),
}

impl RawDetection {
    /// Normalize into a candidate, or `None` if it does not clear `min_confidence`.
    pub fn to_candidate(&self, min_confidence: f32) -> Option<Candidate> {
        match self {
            RawDetection::Pose(pose) => pose_candidate(pose, min_confidence),
            RawDetection::Face(face) => face_candidate(face, min_confidence),
        }
    }
}

fn pose_candidate(pose: &PoseDetection, min_confidence: f32) -> Option<Candidate> {
    let nose = pose.nose.as_ref()?;
    if nose.confidence < min_confidence {
        return None;
    }

    let left_eye = Keypoint::confident(pose.left_eye.as_ref(), EYE_CONFIDENCE);
    let right_eye = Keypoint::confident(pose.right_eye.as_ref(), EYE_CONFIDENCE);
    let left_ear = Keypoint::confident(pose.left_ear.as_ref(), EAR_CONFIDENCE);
    let right_ear = Keypoint::confident(pose.right_ear.as_ref(), EAR_CONFIDENCE);

    let points: Vec<Vec2> = [
        Keypoint::confident(Some(nose), EYE_CONFIDENCE),
        left_eye,
        right_eye,
        left_ear,
        right_ear,
    ]
    .into_iter()
    .flatten()
    .collect();

    // A nose below the keypoint bar with no other facial points is not a face.
    if points.is_empty() {
        return None;
    }
    let anchor = points.iter().copied().sum::<Vec2>() / points.len() as f32;

    let size = match (left_ear, right_ear, left_eye, right_eye) {
        (Some(l), Some(r), _, _) => Some(l.distance(r)),
        (_, _, Some(l), Some(r)) => Some(l.distance(r) * EYE_SPAN_TO_FACE_WIDTH),
        _ => None,
    };

    Some(Candidate {
        position: nose.point(),
        anchor: Some(anchor),
        size,
        confidence: nose.confidence,
        descriptor: None,
    })
}

fn face_candidate(face: &FaceDetection, min_confidence: f32) -> Option<Candidate> {
    if face.score < min_confidence {
        return None;
    }
    let center = face.bounds.center();
    let position = face.nose.map(|[x, y]| Vec2::new(x, y)).unwrap_or(center);

    Some(Candidate {
        position,
        anchor: Some(center),
        size: Some(face.bounds.width),
        confidence: face.score,
        descriptor: face
            .descriptor
            .as_ref()
            .filter(|d| !d.is_empty())
            .map(|d| Descriptor::new(d.clone())),
    })
}

/// One completed detection cycle, as posted by the oracle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionFrame {
    /// Source frame width in pixels; 0 when unknown.
    #[serde(default)]
    pub width: f32,
    /// Source frame height in pixels; 0 when unknown.
    #[serde(default)]
    pub height: f32,
    /// When the oracle produced this frame.
    #[serde(default)]
    pub timestamp_ms: f64,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl DetectionFrame {
    /// Parse a frame posted by the JS side.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Source frame size, if the oracle reported one.
    pub fn size(&self) -> Option<Vec2> {
        (self.width > 0.0 && self.height > 0.0).then(|| Vec2::new(self.width, self.height))
    }

    /// All detections that clear `min_confidence`, normalized.
    pub fn candidates(&self, min_confidence: f32) -> Vec<Candidate> {
        self.detections
            .iter()
            .filter_map(|d| d.to_candidate(min_confidence))
            .collect()
    }
}
