use std::path::PathBuf;
use std::time::Instant;

use time::macros::format_description;
use time::OffsetDateTime;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Serializes result lines to stdout and, when configured, mirrors them to
/// an output file held open for the session.
///
/// File errors never interrupt a scan: a failed create leaves the session
/// stdout-only and a failed append is dropped.
pub struct Logger {
    output: Option<PathBuf>,
    file: Mutex<Option<File>>,
    started: Mutex<Option<Instant>>,
}

impl Logger {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            file: Mutex::new(None),
            started: Mutex::new(None),
        }
    }

    /// Start the session: reset the output file and emit the start banner.
    ///
    /// Any previous contents of the output file are truncated before the
    /// first append.
    pub async fn start(&self) {
        if let Some(path) = &self.output {
            match File::create(path).await {
                Ok(file) => *self.file.lock().await = Some(file),
                Err(err) => tracing::warn!(
                    path = %path.display(),
                    %err,
                    "could not create output file, writing to stdout only"
                ),
            }
        }
        *self.started.lock().await = Some(Instant::now());
        self.write(&format!("Eagle started scan at {}\n", timestamp()))
            .await;
    }

    /// Finish the session: emit the stop banner with elapsed wall-clock
    /// seconds and flush the output file.
    pub async fn stop(&self) {
        let elapsed = self
            .started
            .lock()
            .await
            .map(|at| at.elapsed())
            .unwrap_or_default();
        self.write(&format!(
            "Completed scan in {:.2} seconds\n",
            elapsed.as_secs_f64()
        ))
        .await;

        let mut file = self.file.lock().await;
        if let Some(f) = file.as_mut() {
            let _ = f.flush().await;
        }
        drop(file);

        // The pointer to the saved file goes to stdout only.
        if let Some(path) = &self.output {
            println!("Output file saved: {}", path.display());
        }
    }

    /// Write one line to stdout and append the same bytes to the output
    /// file when one is open. Workers race on this, so each call carries a
    /// whole line and the file handle sits behind a mutex.
    pub async fn write(&self, data: &str) {
        print!("{data}");
        if let Some(file) = self.file.lock().await.as_mut() {
            let _ = file.write_all(data.as_bytes()).await;
        }
    }
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| String::from("1970-01-01 00:00:00"))
}
