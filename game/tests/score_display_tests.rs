use engine::pad::{PadCommand, PadFrame, Rgb};

use game::bomb_core::Effect;
use game::score_display::{MAX_SHOWN_SCORE, SCORE_COLOR, score_frame};

fn render(score: u32) -> PadFrame {
    let mut pad = PadFrame::new();
    for effect in score_frame(score) {
        match effect {
            Effect::Pad(command) => pad.apply(command),
            other => panic!("score frame emitted a non-display effect: {other:?}"),
        }
    }
    pad
}

fn lit_cells(pad: &PadFrame) -> Vec<(u8, u8)> {
    let mut lit = Vec::new();
    for y in 0..4 {
        for x in 0..4 {
            if pad.committed(x, y) == SCORE_COLOR {
                lit.push((x, y));
            }
        }
    }
    lit
}

#[test]
fn zero_renders_a_dark_pad() {
    assert_eq!(lit_cells(&render(0)), Vec::<(u8, u8)>::new());
}

#[test]
fn single_digit_scores_light_the_units_column() {
    // 5 = 0b0101: rows 0 and 2 of the rightmost column.
    assert_eq!(lit_cells(&render(5)), vec![(3, 0), (3, 2)]);
}

#[test]
fn each_column_carries_one_decimal_digit() {
    // 1234 -> columns 1, 2, 3, 4 left to right.
    // 1 = row 0; 2 = row 1; 3 = rows 0+1; 4 = row 2.
    assert_eq!(
        lit_cells(&render(1_234)),
        vec![(0, 0), (2, 0), (1, 1), (2, 1), (3, 2)]
    );
}

#[test]
fn nine_lights_rows_zero_and_three() {
    // 9 = 0b1001.
    assert_eq!(lit_cells(&render(9)), vec![(3, 0), (3, 3)]);
}

#[test]
fn scores_clamp_at_four_digits() {
    assert_eq!(lit_cells(&render(123_456)), lit_cells(&render(MAX_SHOWN_SCORE)));
    // 9999: every column shows 9.
    assert_eq!(
        lit_cells(&render(MAX_SHOWN_SCORE)),
        vec![(0, 0), (1, 0), (2, 0), (3, 0), (0, 3), (1, 3), (2, 3), (3, 3)]
    );
}

#[test]
fn the_frame_clears_before_drawing_and_commits_once() {
    let fx = score_frame(7);
    assert_eq!(fx.first(), Some(&Effect::Pad(PadCommand::Fill(Rgb::OFF))));
    assert_eq!(fx.last(), Some(&Effect::Pad(PadCommand::Flush)));

    let flushes = fx
        .iter()
        .filter(|e| matches!(e, Effect::Pad(PadCommand::Flush)))
        .count();
    assert_eq!(flushes, 1);

    // A previously lit pad is fully replaced by the score frame.
    let mut pad = PadFrame::new();
    pad.fill(Rgb::hex(0xFF0000));
    pad.flush();
    for effect in score_frame(0) {
        if let Effect::Pad(command) = effect {
            pad.apply(command);
        }
    }
    assert_eq!(lit_cells(&pad), Vec::<(u8, u8)>::new());
    assert_eq!(pad.committed(0, 0), Rgb::OFF);
}
