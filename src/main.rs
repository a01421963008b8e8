//! HumanGate CLI
//!
//! Usage:
//!   humangate --interactive              # Interactive challenge mode
//!   humangate --replay frames.json       # Feed recorded detector frames
//!   humangate --serve                    # HTTP API server
//!   humangate --interactive --json       # JSON output

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use humangate::core::{run_server, FrameInput, TrackingMode, VerificationSession};
use humangate::types::{ChallengeConfig, ChallengePhase, StatusOutput};
use humangate::{ANALYSIS_STEP_MS, PASSING_THRESHOLD, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "humangate",
    version = VERSION,
    about = "HumanGate - Prove you are human. You will not succeed.",
    long_about = "HumanGate is a humanity verification challenge engine.\n\n\
                  It tracks a face (real or synthesized), analyzes it against\n\
                  a passing threshold of 80, and scores every attempt a few\n\
                  points short. Each failed attempt raises the challenge level\n\
                  and burns humanity percentage.\n\n\
                  Modes:\n  \
                  --interactive  Challenge loop on the terminal\n  \
                  --replay FILE  Feed recorded detector frames through the tracker\n  \
                  --serve        HTTP API server mode\n\n\
                  Phases:\n  \
                  AWAITING_CLAIM - Ready for a humanity claim\n  \
                  ANALYZING      - Countdown in progress\n  \
                  SCORED         - Attempt scored (always below threshold)\n  \
                  OFFER          - Tutorial or rejection, your pick\n  \
                  REJECTED       - Non-humanity accepted\n  \
                  EXHAUSTED      - Humanity reserve burned to zero"
)]
struct Args {
    /// Interactive challenge mode - submit claims from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Replay a JSON file of recorded detector frames
    #[arg(short, long)]
    replay: Option<String>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show sub-metric breakdown after each attempt
    #[arg(long)]
    verbose: bool,

    /// Fixed noise seed (reproducible scores)
    #[arg(long)]
    seed: Option<u64>,

    /// Reverse challenge calibration (5 levels, 20% decay each)
    #[arg(long)]
    reverse: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    if args.serve {
        run_serve(&args).await;
    } else if let Some(ref path) = args.replay {
        run_replay(path, &args);
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args);
    }
}

fn build_session(args: &Args) -> VerificationSession {
    let config = if args.reverse {
        ChallengeConfig::reverse_challenge()
    } else {
        ChallengeConfig::default()
    };
    match args.seed {
        Some(seed) => VerificationSession::with_seed(config, seed),
        None => VerificationSession::with_config(config),
    }
}

/// Run interactive challenge mode
fn run_interactive(args: &Args) {
    let mut session = build_session(args);
    let started = Instant::now();

    print_header("Challenge Mode", args.no_color);
    println!("Press Enter to submit a humanity claim. Type 'quit' to exit.");
    println!(
        "Goal: score {} or higher. Current record: nobody, ever.",
        PASSING_THRESHOLD
    );
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let status = session.status();
        if status.phase.is_terminal() {
            print_terminal_phase(&status, args);
            break;
        }

        let prompt = format_prompt(&status, args.no_color);
        print!("{}", prompt);
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nSession ended at level {}.", session.status().level);
            break;
        }

        match session.status().phase {
            ChallengePhase::AwaitingClaim => {
                let out = session.submit_claim();
                print_status(&out, args);
                if session.status().phase == ChallengePhase::Analyzing {
                    run_analysis(&mut session, started, args);
                }
            }
            ChallengePhase::Offer => {
                let out = match line.to_ascii_lowercase().as_str() {
                    "t" | "tutorial" => session.choose_tutorial(),
                    "r" | "reject" | "rejection" => session.choose_rejection(),
                    _ => {
                        println!("{}", "Type 'tutorial' or 'reject'.".yellow());
                        continue;
                    }
                };
                print_status(&out, args);
            }
            _ => {}
        }
    }
}

/// Drive the countdown and the result hold with synthesized frames
fn run_analysis(session: &mut VerificationSession, started: Instant, args: &Args) {
    let mut last_step: Option<u32> = None;

    loop {
        let frame = FrameInput {
            width: 640.0,
            height: 480.0,
            elapsed: Some(started.elapsed().as_secs_f64()),
            faces: vec![],
        };
        let attempt = session.ingest_frame(&frame);
        let status = session.status();

        if status.phase == ChallengePhase::Analyzing {
            if status.countdown_steps != last_step {
                last_step = status.countdown_steps;
                if let Some(step) = status.countdown_steps {
                    if args.json {
                        println!("{}", serde_json::to_string(&status).unwrap_or_default());
                    } else {
                        println!("  {} analyzing... {}", status.phase.emoji(), step);
                    }
                }
            }
            std::thread::sleep(Duration::from_millis(ANALYSIS_STEP_MS / 20));
            continue;
        }

        if let Some(attempt) = attempt {
            if args.json {
                println!("{}", serde_json::to_string(&attempt).unwrap_or_default());
            } else {
                println!();
                println!(
                    "  Score: {} / {} ({})",
                    format!("{:.1}", attempt.score).red().bold(),
                    PASSING_THRESHOLD,
                    format!("{:.1} short", attempt.shortfall()).dimmed()
                );
                if args.verbose {
                    print_metric_bars(&attempt.sub_metrics);
                }
                println!("  {}", "Humanity not confirmed. Please try again.".red());
                println!();
            }
        }

        if status.phase != ChallengePhase::Scored {
            // Hold expired; the next phase decides the prompt
            print_status(&status, args);
            if status.phase == ChallengePhase::Offer {
                println!(
                    "{}",
                    "Out of standard attempts. 'tutorial' replays the challenge, \
                     'reject' accepts non-humanity."
                        .yellow()
                );
            }
            break;
        }

        std::thread::sleep(Duration::from_millis(ANALYSIS_STEP_MS / 20));
    }
}

/// Replay recorded detector frames through the tracking pipeline
fn run_replay(path: &str, args: &Args) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Cannot read {}: {}", path, e);
            std::process::exit(1);
        }
    };
    let frames: Vec<FrameInput> = match serde_json::from_str(&content) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot parse {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let mut session = build_session(args);
    print_header("Replay Mode", args.no_color);
    println!("Replaying {} frames from {}", frames.len(), path);
    println!();

    let mut detected = 0usize;
    for (i, frame) in frames.iter().enumerate() {
        session.ingest_frame(frame);
        let Some(face) = session.face() else { continue };
        if face.mode == TrackingMode::Detected {
            detected += 1;
        }

        if args.json {
            println!("{}", serde_json::to_string(face).unwrap_or_default());
        } else if args.verbose || i == frames.len() - 1 {
            let (cx, cy) = face.face_center();
            let mode = match face.mode {
                TrackingMode::Detected => "DETECTED".green(),
                TrackingMode::Fallback => "FALLBACK".yellow(),
            };
            println!(
                "  frame {:>4} | {} | {} pts | center ({:.1}, {:.1})",
                i,
                mode,
                face.landmarks.len(),
                cx,
                cy
            );
        }
    }

    println!();
    println!(
        "Done: {}/{} frames with a detected face, the rest synthesized.",
        detected,
        frames.len()
    );
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  HumanGate v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("{}", "╔═══════════════════════════════════════╗".bold());
        println!(
            "{}",
            format!("║  🧬 HumanGate v{} - {:<18}  ║", VERSION, mode).bold()
        );
        println!("{}", "╚═══════════════════════════════════════╝".bold());
    }
    println!();
}

/// Format the challenge prompt from the current status
fn format_prompt(status: &StatusOutput, no_color: bool) -> String {
    if no_color {
        format!(
            "[{} | lvl {} | humanity {}%] > ",
            status.phase, status.level, status.humanity_percentage
        )
    } else {
        format!(
            "{}{} [{} | lvl {} | humanity {}%]{} > ",
            status.phase.color_code(),
            status.phase.emoji(),
            status.phase,
            status.level,
            status.humanity_percentage,
            ChallengePhase::color_reset()
        )
    }
}

fn print_status(out: &StatusOutput, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(out).unwrap_or_default());
    } else if args.no_color {
        println!("{}", out.to_parseable_string());
    } else {
        println!("{}", out.to_terminal_string());
    }
}

fn print_terminal_phase(status: &StatusOutput, args: &Args) {
    print_status(status, args);
    match status.phase {
        ChallengePhase::Rejected => {
            println!("{}", "Non-humanity accepted. Thank you for your honesty.".red().bold());
        }
        ChallengePhase::Exhausted => {
            println!("{}", "Humanity reserve exhausted. Verification unavailable.".red().bold());
        }
        _ => {}
    }
}

/// Print ASCII sub-metric bars, 20 chars wide
fn print_metric_bars(m: &humangate::types::SubMetrics) {
    let bars = [
        ("mouth curvature", m.mouth_curvature),
        ("eye symmetry", m.eye_symmetry),
        ("smile intensity", m.smile_intensity),
        ("mouth width", m.mouth_width),
        ("facial tension", m.facial_tension),
    ];
    for (label, value) in bars {
        let filled = ((value / 100.0) * 20.0).round().clamp(0.0, 20.0) as usize;
        println!(
            "    {:<16} [{}{}] {:>5.1}",
            label,
            "█".repeat(filled),
            "░".repeat(20 - filled),
            value
        );
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    println!();
    println!("╔═══════════════════════════════════════╗");
    println!("║  🧬 HumanGate API Server              ║");
    println!("║  Version: {}                       ║", VERSION);
    println!("╚═══════════════════════════════════════╝");
    println!();

    if let Err(e) = run_server(&args.addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
