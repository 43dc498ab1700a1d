use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. `--quiet`/`--debug` pick the
/// default filter level (mutually exclusive, validated by the caller before
/// this is reached); `--logfile` swaps the writer from stderr to a file.
pub fn init(quiet: bool, debug: bool, logfile: Option<&str>) -> Result<()> {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(FileWriter(Arc::new(Mutex::new(file)))).init();
        }
        None => {
            builder.with_writer(io::stderr).init();
        }
    }
    Ok(())
}

#[derive(Clone)]
struct FileWriter(Arc<Mutex<File>>);

impl io::Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

impl tracing_subscriber::fmt::MakeWriter<'_> for FileWriter {
    type Writer = FileWriter;
    fn make_writer(&self) -> Self::Writer {
        self.clone()
    }
}
