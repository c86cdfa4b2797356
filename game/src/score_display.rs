//! Score screen: the decimal digits of the score across the pad columns.

use engine::pad::{PAD_HEIGHT, PadCommand, Rgb};

use crate::bomb_core::Effect;

/// Lit color for score bits.
pub const SCORE_COLOR: Rgb = Rgb::hex(0xFFFFFF);
/// Four columns, one decimal digit each.
pub const MAX_SHOWN_SCORE: u32 = 9_999;

/// Renders `score` as one full frame: thousands in column 0 through units in
/// column 3, each digit as a 4-bit binary pattern down the rows with bit 0 on
/// row 0. Pure rendering, no state involved.
pub fn score_frame(score: u32) -> Vec<Effect> {
    let score = score.min(MAX_SHOWN_SCORE);
    let digits = [
        score / 1_000 % 10,
        score / 100 % 10,
        score / 10 % 10,
        score % 10,
    ];

    let mut fx = vec![Effect::Pad(PadCommand::Fill(Rgb::OFF))];
    for (x, &digit) in digits.iter().enumerate() {
        for y in 0..PAD_HEIGHT {
            if digit >> y & 1 == 1 {
                fx.push(Effect::Pad(PadCommand::Set {
                    x: x as u8,
                    y: y as u8,
                    color: SCORE_COLOR,
                }));
            }
        }
    }
    fx.push(Effect::Pad(PadCommand::Flush));
    fx
}
