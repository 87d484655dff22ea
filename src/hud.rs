//! Score digit layout
//!
//! The core does not draw anything, but it knows where the score digits go:
//! one fixed-width slot per decimal digit, centred horizontally.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// One digit of the score and the centre of the slot it is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigitSlot {
    pub digit: u8,
    pub x: f32,
    pub y: f32,
}

/// Lay out `score` as centred digit slots
pub fn digit_layout(score: u32, viewport_width: f32, digit_width: f32, y: f32) -> Vec<DigitSlot> {
    let digits: Vec<u8> = score
        .to_string()
        .bytes()
        .map(|b| b - b'0')
        .collect();
    let total_width = digit_width * digits.len() as f32;
    let start_x = (viewport_width - total_width) / 2.0;

    digits
        .into_iter()
        .enumerate()
        .map(|(i, digit)| DigitSlot {
            digit,
            x: start_x + i as f32 * digit_width + digit_width / 2.0,
            y,
        })
        .collect()
}

/// [`digit_layout`] with the configured viewport and digit geometry
pub fn score_digits(score: u32, config: &GameConfig) -> Vec<DigitSlot> {
    digit_layout(score, config.viewport_width, config.score_digit_width, config.score_y)
}
