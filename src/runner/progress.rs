use std::io::Write;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Messages sent from the worker threads to the progress writer thread.
#[derive(Debug)]
pub enum ProgressMessage {
    Completed { done: usize, total: usize, workload: String, policy: String, elapsed: Duration },
    Shutdown,
}

/// Single writer for progress lines.
///
/// Workers only send messages, the background thread owns the output stream. A progress line is
/// therefore always written in one piece, whatever the number of workers.
#[derive(Debug)]
pub struct ProgressReporter {
    sender: mpsc::Sender<ProgressMessage>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Spawns the writer thread for `writer`.
    pub fn spawn<W: Write + Send + 'static>(writer: W) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || Self::worker_loop(rx, writer));

        ProgressReporter { sender: tx, handle: Some(handle) }
    }

    pub fn sender(&self) -> mpsc::Sender<ProgressMessage> {
        self.sender.clone()
    }

    /// Flushes pending lines and waits for the writer thread to exit.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.sender.send(ProgressMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Progress writer thread panicked.");
            }
        }
    }

    fn worker_loop<W: Write>(rx: mpsc::Receiver<ProgressMessage>, mut writer: W) {
        let mut wrote_line = false;

        for msg in rx {
            match msg {
                ProgressMessage::Completed { done, total, workload, policy, elapsed } => {
                    let line = format!(
                        "\r[{}/{}] Completed: {} + {} ({} ms){}",
                        done,
                        total,
                        truncate(&workload, 25),
                        truncate(&policy, 20),
                        elapsed.as_millis(),
                        " ".repeat(20)
                    );
                    if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
                        log::warn!("Failed to write progress line: {}", e);
                    }
                    wrote_line = true;
                }
                ProgressMessage::Shutdown => break,
            }
        }

        if wrote_line {
            let _ = writer.write_all(b"\n");
        }
        let _ = writer.flush();
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}
