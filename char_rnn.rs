use char_rnn::architecture::build_model;
use char_rnn::config::{load_config, TrainingConfig};
use char_rnn::sampling::sample;
use char_rnn::train::{EpochSummary, Trainer};
use char_rnn::utils::SimpleRng;
use char_rnn::{Result, Vocabulary};
use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::process;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Character-level LSTM/RNN text generator.
// Usage: char_rnn [corpus.txt] [config.json]
const DEFAULT_CORPUS: &str = "aesop.txt";
const SAMPLE_SEPARATOR_WIDTH: usize = 40;

struct RunArgs {
    corpus_path: String,
    config: TrainingConfig,
}

/// Reads the corpus path and optional JSON config path from the command line.
///
/// Without arguments the corpus defaults to `aesop.txt` and the configuration
/// to `TrainingConfig::default()`.
fn parse_args(args: &[String]) -> Result<RunArgs> {
    let corpus_path = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_CORPUS.to_string());
    let config = match args.get(2) {
        Some(path) => load_config(path)?,
        None => TrainingConfig::default(),
    };
    Ok(RunArgs {
        corpus_path,
        config,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed when running under the test harness.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// Optional plain-text log of epoch losses and generated samples.
struct RunLog {
    file: Option<BufWriter<File>>,
}

impl RunLog {
    fn open(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };
        Ok(Self { file })
    }

    fn line(&mut self, text: &str) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", text)?;
            file.flush()?;
        }
        Ok(())
    }
}

/// Trains on the corpus for the configured number of epochs.
///
/// After each epoch the loss is logged and `samples_per_epoch` samples are
/// generated, each primed with the first `window - 1` corpus characters.
fn run(args: RunArgs) -> Result<Vec<EpochSummary>> {
    let cfg = args.config;
    let text = fs::read_to_string(&args.corpus_path)?;
    let vocab = Vocabulary::from_text(&text)?;
    let corpus = vocab.encode(&text)?;

    let mut rng = match cfg.seed {
        Some(seed) => SimpleRng::new(seed),
        None => SimpleRng::from_time(),
    };
    let model = build_model(&cfg.layers, vocab.len(), cfg.window, &mut rng)?;
    info!(
        corpus = %args.corpus_path,
        characters = corpus.len(),
        vocab_size = vocab.len(),
        parameters = model.parameter_count(),
        "starting training"
    );

    let mut trainer = Trainer::new(model);
    let mut scheduler = cfg.scheduler()?;
    let mut log = RunLog::open(cfg.log_path.as_deref())?;
    let mut summaries = Vec::with_capacity(cfg.epochs);
    let primer_len = (cfg.window - 1).min(corpus.len());
    let primer = &corpus[..primer_len];

    for epoch in 0..cfg.epochs {
        let started = Instant::now();
        let learning_rate = scheduler.get_lr();
        let summary = trainer.train_epoch(&corpus, learning_rate)?;
        info!(
            epoch,
            loss = summary.smoothed_loss,
            seconds = started.elapsed().as_secs_f64(),
            "epoch complete"
        );
        log.line(&format!(
            "epoch: {}  loss: {:.3}  lr: {:.6}",
            epoch, summary.smoothed_loss, learning_rate
        ))?;

        for _ in 0..cfg.samples_per_epoch {
            let generated = sample(trainer.model_mut(), primer, cfg.sample_length, &mut rng)?;
            let text = format!("{}{}", vocab.decode(primer), vocab.decode(&generated));
            info!(sample = %text, "generated sample");
            log.line(&text)?;
            log.line(&"-".repeat(SAMPLE_SEPARATOR_WIDTH))?;
        }

        scheduler.step();
        summaries.push(summary);
    }

    Ok(summaries)
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let run_args = match parse_args(&args) {
        Ok(run_args) => run_args,
        Err(err) => {
            error!("invalid arguments: {}", err);
            process::exit(1);
        }
    };

    let started = Instant::now();
    match run(run_args) {
        Ok(summaries) => info!(
            epochs = summaries.len(),
            seconds = started.elapsed().as_secs_f64(),
            "finished"
        ),
        Err(err) => {
            error!("training failed: {}", err);
            process::exit(1);
        }
    }
}
