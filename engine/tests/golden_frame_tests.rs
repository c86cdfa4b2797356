use engine::pad::{PadCommand, PadFrame, Rgb};
use engine::regression::rgba_sha256_hex;

// Pinned sha256 hashes of committed RGBA frames. If the frame byte layout
// ever changes, every downstream consumer (window framebuffer, recordings)
// changes with it, so these fail loudly instead of silently.
const BLANK_FRAME_HASH: &str = "20e65596fe7c15642996b35ef3054f8c93a772fc0e91f66b3174ae8ff26a2921";
const PATTERN_FRAME_HASH: &str = "0c001162d5c81c8adad0aef8863b7678c9179c2d793fec8ce0d2ceed936cdc41";
const FILLED_FRAME_HASH: &str = "b6cc11a2b5a4be6167fc52cccffb4487f4d6988a9b3be4e456c031a5ae60b54e";

#[test]
fn blank_frame_hash_is_stable() {
    let frame = PadFrame::new();
    assert_eq!(rgba_sha256_hex(&frame.committed_rgba()), BLANK_FRAME_HASH);
}

#[test]
fn pattern_frame_hash_is_stable() {
    let mut frame = PadFrame::new();
    frame.apply(PadCommand::Set {
        x: 0,
        y: 0,
        color: Rgb::hex(0xFF0000),
    });
    frame.apply(PadCommand::Set {
        x: 3,
        y: 2,
        color: Rgb::hex(0x00FF00),
    });
    frame.apply(PadCommand::Set {
        x: 1,
        y: 3,
        color: Rgb::hex(0x2040FF),
    });
    frame.apply(PadCommand::Flush);

    assert_eq!(rgba_sha256_hex(&frame.committed_rgba()), PATTERN_FRAME_HASH);
}

#[test]
fn filled_frame_hash_is_stable() {
    let mut frame = PadFrame::new();
    frame.apply(PadCommand::Fill(Rgb::hex(0xFFC000)));
    frame.apply(PadCommand::Flush);

    assert_eq!(rgba_sha256_hex(&frame.committed_rgba()), FILLED_FRAME_HASH);
}

#[test]
fn unflushed_writes_do_not_change_the_hash() {
    let mut frame = PadFrame::new();
    frame.apply(PadCommand::Fill(Rgb::hex(0xFFC000)));

    assert_eq!(rgba_sha256_hex(&frame.committed_rgba()), BLANK_FRAME_HASH);
}
