use std::env;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use chordscroll::{Player, Transport};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: chordscroll <song.txt>");
        eprintln!("       chordscroll --json <song.txt>");
        eprintln!("       chordscroll --play <song.txt> [seconds]");
        process::exit(1);
    }

    let mut json = false;
    let mut play_seconds: Option<f64> = None;
    let mut input_path = &args[1];

    // Parse flags
    match args[1].as_str() {
        "--json" => {
            if args.len() < 3 {
                eprintln!("Usage: chordscroll --json <song.txt>");
                process::exit(1);
            }
            json = true;
            input_path = &args[2];
        }
        "--play" => {
            if args.len() < 3 {
                eprintln!("Usage: chordscroll --play <song.txt> [seconds]");
                process::exit(1);
            }
            input_path = &args[2];
            let seconds = match args.get(3) {
                Some(s) => match s.parse::<f64>() {
                    Ok(v) if v > 0.0 => v,
                    _ => {
                        eprintln!("Invalid duration: {}", s);
                        process::exit(1);
                    }
                },
                None => 20.0,
            };
            play_seconds = Some(seconds);
        }
        _ => {}
    }

    let mut player = Player::new(0.0);
    if let Err(e) = player.load_path(input_path, 0.0) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if json {
        print_json(&player);
    } else if let Some(seconds) = play_seconds {
        play(&mut player, seconds);
    } else {
        print_summary(&player);
    }
}

/// Dump the parsed model as one JSON document: render blocks, the event
/// timeline and the carry map.
fn print_json(player: &Player) {
    let doc = serde_json::json!({
        "render": player.render_model(),
        "bpm": player.bpm(),
        "barBeats": player.bar_beats(),
        "events": player.events(),
        "carry": player.carry_map(),
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn print_summary(player: &Player) {
    if let Some(model) = player.render_model() {
        if !model.meta_line.is_empty() {
            println!("{}", model.meta_line);
        }
    }
    println!("bpm: {}  beats/bar: {}", player.bpm(), player.bar_beats());
    println!();
    println!("{:>5}  {:>5}  {:>8}  {:>8}  {:>8}  chord", "event", "block", "start", "end", "bar");
    for ev in player.events() {
        println!(
            "{:>5}  {:>5}  {:>8.2}  {:>8.2}  {:>8}  {}",
            ev.event_index, ev.block_index, ev.start_beat, ev.end_beat, ev.bar_index, ev.chord_name
        );
    }
    let carry = player.carry_map();
    if !carry.is_empty() {
        println!();
        let mut sources: Vec<_> = carry.keys().copied().collect();
        sources.sort_unstable();
        for src in sources {
            for link in &carry[&src] {
                println!(
                    "carry: event {} -> block {} [{:.3}, {:.3})",
                    src, link.target_block_index, link.start_offset_beats, link.end_offset_beats
                );
            }
        }
    }
}

/// Drive the engine in real time, logging chord changes and metronome
/// clicks until `seconds` have elapsed or the song runs out.
fn play(player: &mut Player, seconds: f64) {
    let epoch = Instant::now();
    player.start(0.0);

    let song_end = player.events().last().map(|e| e.end_beat);
    let mut last_chord: Option<String> = None;

    while player.transport() == Transport::Running {
        let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
        if now_ms > seconds * 1000.0 {
            break;
        }

        if let Some(frame) = player.tick(now_ms) {
            if let Some(beat) = frame.beat {
                let mark = if beat.accent { "*" } else { "." };
                println!("{} beat {}  (musical {:+.2})", mark, beat.beat_in_bar, frame.musical_beat);
            }
            if frame.now_chord != last_chord {
                if let Some(chord) = &frame.now_chord {
                    println!("  -> {}", chord);
                }
                last_chord = frame.now_chord.clone();
            }
            if let Some(end) = song_end {
                if frame.musical_beat >= end {
                    break;
                }
            }
        }

        thread::sleep(Duration::from_millis(16));
    }
}
