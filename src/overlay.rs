use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut};
use rusttype::{Font, Scale};
use strum::IntoEnumIterator;

use crate::classifier::{FingerId, HandResult};
use crate::frame::FrameResult;
use crate::hand::HAND_CONNECTIONS;

/// How frame results get painted onto a canvas.
///
/// Text needs a font; without one the skeleton still draws and all text is
/// skipped. The anchor defaults match the classic overlay layout: aggregate
/// count at (10, 50), per-finger status lines from (50, 50) in 30 px steps.
#[derive(Clone)]
pub struct OverlayStyle {
    pub skeleton_color: Rgb<u8>,
    pub joint_color: Rgb<u8>,
    pub text_color: Rgb<u8>,
    pub joint_radius: i32,
    pub text_scale: f32,
    pub count_anchor: (i32, i32),
    pub label_anchor: (i32, i32),
    pub line_height: i32,
    /// Draw one "Thumb: Folded" style line per finger above the count.
    pub finger_labels: bool,
    pub font: Option<Font<'static>>,
}

impl Default for OverlayStyle {
    fn default() -> OverlayStyle {
        OverlayStyle {
            skeleton_color: Rgb([0, 255, 0]),
            joint_color: Rgb([255, 0, 0]),
            text_color: Rgb([0, 255, 0]),
            joint_radius: 3,
            text_scale: 32.0,
            count_anchor: (10, 50),
            label_anchor: (50, 50),
            line_height: 30,
            finger_labels: false,
            font: None,
        }
    }
}

/// Draw one hand's skeleton: connection segments first, joint circles on
/// top. Landmark coordinates are normalized, so they scale by the canvas
/// dimensions here.
pub fn draw_hand(canvas: &mut RgbImage, hand: &HandResult, style: &OverlayStyle) {
    let w = canvas.width() as f32;
    let h = canvas.height() as f32;
    for (from, to) in HAND_CONNECTIONS {
        let a = hand.skeleton[from];
        let b = hand.skeleton[to];
        draw_line_segment_mut(canvas, (a.x * w, a.y * h), (b.x * w, b.y * h), style.skeleton_color);
    }
    for landmark in hand.skeleton.landmarks() {
        draw_hollow_circle_mut(
            canvas,
            ((landmark.x * w) as i32, (landmark.y * h) as i32),
            style.joint_radius,
            style.joint_color,
        );
    }
}

/// Draw a whole frame result: every hand's skeleton plus its text block.
/// Text blocks stack downward so a second hand never overdraws the first.
pub fn draw_frame(canvas: &mut RgbImage, result: &FrameResult, style: &OverlayStyle) {
    for hand in &result.hands {
        draw_hand(canvas, hand, style);
    }
    let font = match &style.font {
        Some(font) => font,
        None => return,
    };
    let scale = Scale { x: style.text_scale, y: style.text_scale };
    let mut y = if style.finger_labels { style.label_anchor.1 } else { style.count_anchor.1 };
    for hand in &result.hands {
        if style.finger_labels {
            for finger in FingerId::iter() {
                draw_text_mut(
                    canvas,
                    style.text_color,
                    style.label_anchor.0,
                    y,
                    scale,
                    font,
                    &format!("{}: {}", finger.name(), hand.state(finger).name()),
                );
                y += style.line_height;
            }
        }
        draw_text_mut(
            canvas,
            style.text_color,
            style.count_anchor.0,
            y,
            scale,
            font,
            &format!("Fingers: {}", hand.extended_count),
        );
        y += style.line_height;
    }
}
