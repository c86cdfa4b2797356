use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use engine::audio::{TonePlan, ToneVoice};
use engine::clock::{Clock, MonotonicClock};
use engine::pad::{PAD_CELLS, PAD_HEIGHT, PAD_WIDTH, PadCommand, PadFrame};
use engine::regression::env_flag;
use pixels::{Pixels, SurfaceTexture};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use game::bomb_core::{BombCore, Effect};
use game::settings::{GameplaySettings, SettingsStore};

const TICK_PERIOD: Duration = Duration::from_millis(50);
const WINDOW_SIZE: u32 = 480;
const SAMPLE_RATE: u32 = 48_000;

#[derive(Debug, Default, Clone)]
struct Cli {
    help: bool,
    classic: bool,
    mute: bool,
    seed: Option<u64>,
}

fn print_help() {
    println!(
        r#"Padbomb

A bomb lights up on the 4x4 pad; press its key before it expires. Each
defusal speeds up the spawns. A wrong key or a timeout ends the round;
press any key afterwards to see the score, then again to restart.

Usage:
  padbomb [--classic] [--seed N] [--mute]

Keys (the 4x4 matrix):
  1 2 3 4
  Q W E R
  A S D F
  Z X C V
  Esc quits.

Flags:
  --classic     The original single-color rendition: no urgency ramp, no
                anti-repeat, no score screen, additive difficulty.
  --seed N      Seed the bomb placement (default: derived from the clock).
  --mute        No tones (PADBOMB_MUTE=1 does the same).
  --help, -h    Show this help.
"#
    );
}

fn parse_cli() -> Result<Cli, String> {
    let mut cli = Cli::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--classic" => cli.classic = true,
            "--mute" => cli.mute = true,
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                cli.seed = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid seed: {value}"))?,
                );
            }
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    Ok(cli)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Maps the left-hand 4x4 key block onto pad cells, row by row.
fn key_index(key: VirtualKeyCode) -> Option<u8> {
    use VirtualKeyCode::*;

    Some(match key {
        Key1 => 0,
        Key2 => 1,
        Key3 => 2,
        Key4 => 3,
        Q => 4,
        W => 5,
        E => 6,
        R => 7,
        A => 8,
        S => 9,
        D => 10,
        F => 11,
        Z => 12,
        X => 13,
        C => 14,
        V => 15,
        _ => return None,
    })
}

struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    gain: f32,
}

impl Sfx {
    fn new(gain: f32) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            gain,
        })
    }

    /// Fire-and-forget: the detached sink plays the bounded voice on the
    /// audio thread, so a tone never stalls tick or key delivery.
    fn play(&self, plan: TonePlan) {
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        sink.set_volume(self.gain);
        sink.append(SfxTone(ToneVoice::new(plan, SAMPLE_RATE)));
        sink.detach();
    }
}

struct SfxTone(ToneVoice);

impl Iterator for SfxTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.0.next()
    }
}

impl rodio::Source for SfxTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.0.remaining_samples() as usize)
    }

    fn channels(&self) -> u16 {
        self.0.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.0.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.0.plan().duration_ms as u64))
    }
}

/// Routes core effects to the pad, the speaker, and stdout. Returns whether
/// a flush made the window stale.
fn apply_effects(effects: &[Effect], pad: &mut PadFrame, sfx: Option<&Sfx>) -> bool {
    let mut flushed = false;
    for effect in effects {
        match *effect {
            Effect::Pad(command) => {
                pad.apply(command);
                if command == PadCommand::Flush {
                    flushed = true;
                }
            }
            Effect::Tone(plan) => {
                if let Some(sfx) = sfx {
                    sfx.play(plan);
                }
            }
            Effect::ReportScore(score) => println!("Game over! Final score: {score}"),
        }
    }
    flushed
}

fn main() {
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("run with --help for usage");
            std::process::exit(2);
        }
    };
    if cli.help {
        print_help();
        return;
    }

    let settings = SettingsStore::from_env().load();
    let gameplay = if cli.classic {
        GameplaySettings::classic()
    } else {
        settings.gameplay
    };

    let sfx = if cli.mute || settings.audio.mute_all || env_flag("PADBOMB_MUTE") {
        None
    } else {
        match Sfx::new(settings.audio.effective_sfx_gain()) {
            Ok(sfx) => Some(sfx),
            Err(e) => {
                eprintln!("warning: audio unavailable, continuing silent: {e}");
                None
            }
        }
    };

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Padbomb")
        .with_inner_size(PhysicalSize::new(WINDOW_SIZE, WINDOW_SIZE))
        .build(&event_loop)
        .unwrap_or_else(|e| {
            eprintln!("failed to create window: {e}");
            std::process::exit(1);
        });

    let surface_texture = SurfaceTexture::new(WINDOW_SIZE, WINDOW_SIZE, &window);
    let mut pixels = Pixels::new(PAD_WIDTH as u32, PAD_HEIGHT as u32, surface_texture)
        .unwrap_or_else(|e| {
            eprintln!("failed to create framebuffer: {e}");
            std::process::exit(1);
        });

    let clock = MonotonicClock::new();
    let mut core = BombCore::new(cli.seed.unwrap_or_else(clock_seed), gameplay);
    let mut pad = PadFrame::new();

    let opening = core.start(clock.now_ms());
    apply_effects(&opening, &mut pad, sfx.as_ref());

    let mut keys_down = [false; PAD_CELLS];
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(last_tick + TICK_PERIOD);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::Resized(size) => {
                    if pixels.resize_surface(size.width, size.height).is_err() {
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    needs_redraw = true;
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(key),
                            state,
                            ..
                        },
                    ..
                } => {
                    if key == VirtualKeyCode::Escape {
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    let Some(index) = key_index(key) else {
                        return;
                    };
                    let pressed = state == ElementState::Pressed;
                    // Ignore OS key-repeat "Pressed" events; the pad only
                    // sees real edges.
                    if pressed && keys_down[index as usize] {
                        return;
                    }
                    keys_down[index as usize] = pressed;

                    let fx = core.on_key(index, pressed);
                    if apply_effects(&fx, &mut pad, sfx.as_ref()) {
                        needs_redraw = true;
                    }
                }
                _ => {}
            },
            Event::MainEventsCleared => {
                if last_tick.elapsed() >= TICK_PERIOD {
                    last_tick = Instant::now();
                    let fx = core.on_tick(clock.now_ms());
                    if apply_effects(&fx, &mut pad, sfx.as_ref()) {
                        needs_redraw = true;
                    }
                }
                if needs_redraw {
                    window.request_redraw();
                    needs_redraw = false;
                }
            }
            Event::RedrawRequested(_) => {
                pixels.frame_mut().copy_from_slice(&pad.committed_rgba());
                if pixels.render().is_err() {
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}
