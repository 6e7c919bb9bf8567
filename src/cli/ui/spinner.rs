//! Progress line shown while a bridge request is outstanding

use colored::Colorize;
use log::debug;
use std::future::Future;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TICK: Duration = Duration::from_millis(80);
/// Requests slower than this show their elapsed seconds
const SHOW_ELAPSED_AFTER: Duration = Duration::from_secs(2);

/// Animated line owned by one request; erased when dropped
struct ProgressLine {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressLine {
    fn start(message: String) -> Self {
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(animate(message, Instant::now(), stopped));
        Self {
            stop: Some(stop),
            task: Some(task),
        }
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        erase_line();
    }
}

async fn animate(message: String, started: Instant, mut stopped: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(TICK);
    let mut stdout = io::stdout();

    for frame in 0usize.. {
        tokio::select! {
            _ = ticker.tick() => {
                print!("\r{}", render(frame, &message, started.elapsed()));
                let _ = stdout.flush();
            }
            _ = &mut stopped => break,
        }
    }

    erase_line();
}

fn render(frame: usize, message: &str, elapsed: Duration) -> String {
    let glyph = FRAMES[frame % FRAMES.len()].to_string().cyan();
    if elapsed < SHOW_ELAPSED_AFTER {
        format!("{} {}", glyph, message)
    } else {
        let seconds = format!("({}s)", elapsed.as_secs());
        format!("{} {} {}", glyph, message, seconds.dimmed())
    }
}

fn erase_line() {
    print!("\r\x1b[K");
    let _ = io::stdout().flush();
}

/// Await `future` with a progress line on the current terminal line
pub async fn with_spinner<F, T>(message: impl Into<String>, future: F) -> T
where
    F: Future<Output = T>,
{
    let message = message.into();
    let started = Instant::now();

    let output = {
        let _line = ProgressLine::start(message.clone());
        future.await
    };

    debug!("'{}' took {:?}", message, started.elapsed());
    output
}
