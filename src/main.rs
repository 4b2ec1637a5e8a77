use anyhow::{bail, Context, Result};
use rusttype::Font;

use handtracking::classifier::{FingerClassifier, Policy, DEFAULT_FOLD_THRESHOLD};
use handtracking::driver;
use handtracking::overlay::OverlayStyle;
use handtracking::replay::{PngDirSink, ReplaySource};

const USAGE: &str = "usage: handtracking <landmarks.ndjson> [--out DIR] \
[--policy tip|bend|wrist] [--fold-threshold F] [--size WxH] [--font PATH] [--finger-labels]";

struct Options {
    recording: String,
    out_dir: String,
    policy: Policy,
    fold_threshold: f32,
    width: u32,
    height: u32,
    font_path: Option<String>,
    finger_labels: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            recording: String::new(),
            out_dir: "frames_out".to_string(),
            policy: Policy::default(),
            fold_threshold: DEFAULT_FOLD_THRESHOLD,
            width: 1280,
            height: 720,
            font_path: None,
            finger_labels: false,
        }
    }
}

fn next_value(iter: &mut std::slice::Iter<String>, flag: &str) -> Result<String> {
    iter.next().cloned().with_context(|| format!("{} needs a value", flag))
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => options.out_dir = next_value(&mut iter, "--out")?,
            "--policy" => {
                let value = next_value(&mut iter, "--policy")?;
                options.policy = match value.as_str() {
                    "tip" => Policy::TipPastKnuckle,
                    "bend" => Policy::SegmentBend,
                    "wrist" => Policy::AboveWrist,
                    other => bail!("unknown policy {:?} (expected tip, bend or wrist)", other),
                };
            }
            "--fold-threshold" => {
                let value = next_value(&mut iter, "--fold-threshold")?;
                options.fold_threshold = value
                    .parse()
                    .with_context(|| format!("bad fold threshold {:?}", value))?;
            }
            "--size" => {
                let value = next_value(&mut iter, "--size")?;
                let (w, h) = value
                    .split_once('x')
                    .with_context(|| format!("bad size {:?} (expected WxH)", value))?;
                options.width = w.parse().with_context(|| format!("bad width {:?}", w))?;
                options.height = h.parse().with_context(|| format!("bad height {:?}", h))?;
            }
            "--font" => options.font_path = Some(next_value(&mut iter, "--font")?),
            "--finger-labels" => options.finger_labels = true,
            other if other.starts_with("--") => bail!("unknown option {}", other),
            other => positional.push(other.to_string()),
        }
    }
    if positional.len() != 1 {
        bail!("expected exactly one landmark recording path");
    }
    options.recording = positional.remove(0);
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}", USAGE);
            return Err(err);
        }
    };

    let mut style = OverlayStyle { finger_labels: options.finger_labels, ..OverlayStyle::default() };
    if let Some(path) = &options.font_path {
        let data =
            std::fs::read(path).with_context(|| format!("failed to read font {}", path))?;
        style.font = Some(Font::try_from_vec(data).context("font data not understood")?);
    } else {
        log::info!("no --font given, drawing skeletons without text");
    }

    let classifier =
        FingerClassifier::new(options.policy).with_fold_threshold(options.fold_threshold);
    let mut source = ReplaySource::open(&options.recording, options.width, options.height)?;
    let mut sink = PngDirSink::create(&options.out_dir)?;

    let stats = driver::run(&mut source, &classifier, &style, &mut sink)?;
    println!(
        "{} frame(s), {} hand(s) classified, {} skipped -> {}",
        stats.frames, stats.hands, stats.skipped_hands, options.out_dir
    );
    Ok(())
}
