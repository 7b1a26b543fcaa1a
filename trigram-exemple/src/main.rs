use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use clap::Parser;
use log::info;

use trigram_core::{SentenceLength, Store, TrigramError};

/// Learn a text file with several threads, then print generated sentences.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Plain text file to learn from
    input: PathBuf,

    /// Number of sentences to generate
    #[arg(short, long, default_value_t = 5)]
    sentences: usize,

    /// Learning threads (defaults to the number of CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Average sentence length, in trigrams
    #[arg(long, default_value_t = SentenceLength::DEFAULT_MEAN)]
    mean_length: f64,
}

/// Reads a text file, replacing invalid UTF-8 as the store does when
/// learning a stream.
fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Sentence length is drawn around the given mean
    let sentence_length = SentenceLength::new(args.mean_length, SentenceLength::DEFAULT_STD_DEV)?;
    let store = Store::with_sentence_length(sentence_length);

    // Split the text into one chunk of lines per learning thread.
    // Trigrams spanning two chunks are not learned.
    let text = read_text(&args.input)?;
    let lines: Vec<&str> = text.lines().collect();
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let chunk_size = lines.len().div_ceil(threads).max(1);

    // Every thread learns into the same store concurrently
    let learned = thread::scope(|scope| {
        let handles: Vec<_> = lines
            .chunks(chunk_size)
            .map(|chunk| {
                let store = &store;
                scope.spawn(move || store.learn(chunk.join("\n").as_bytes()))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| -> Result<usize, Box<dyn std::error::Error>> {
                Ok(handle.join().map_err(|_| "learning thread panicked")??)
            })
            .sum::<Result<usize, _>>()
    })?;
    info!("learned {learned} trigrams from {} using {threads} threads", args.input.display());

    let stats = store.stats()?;
    println!("{} distinct trigrams, {} observed", stats.nodes[2], stats.trigrams);

    // Generate sentences
    for i in 0..args.sentences {
        match store.generate() {
            Ok(sentence) => println!("Generated sentence {}: {}", i + 1, sentence),
            Err(TrigramError::TooShort) => {
                println!("This text is too short, learn at least three words");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
