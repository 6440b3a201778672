//! Output rendering for the chat application.
//!
//! The chat state machine talks to the screen only through [`ChatView`], so
//! the same session drives a terminal, a test recorder, or anything else that
//! can show a turn and an error line.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{Role, Turn};

/// ANSI escape code for dim text (used for the pending indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for speaker labels).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI sequence that returns to column 0 and erases the line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

const PENDING_TEXT: &str = "...";

/// Trait for rendering a conversation.
///
/// Methods take `&self` because a view is shared with every submission of a
/// session, including ones that are dropped while another is in flight.
pub trait ChatView: Send + Sync {
    /// Show a turn that was just added to the conversation.
    fn render_turn(&self, turn: &Turn);

    /// Show an inline error in the conversation.
    fn render_error(&self, message: &str);

    /// Raise or clear the "waiting for a reply" indicator.
    fn set_pending(&self, pending: bool);
}

type Output = Mutex<Box<dyn Write + Send>>;

/// Plain text view with optional ANSI styling.
///
/// Turns and the pending indicator go to one writer (stdout by default) and
/// errors to another (stderr). With color on, the indicator is erased in place
/// before anything else is printed; without color it sits on its own line so
/// piped output never carries it as a prefix.
pub struct PlainTextView {
    use_color: bool,
    echo_user: bool,
    pending: AtomicBool,
    out: Output,
    err: Output,
}

impl PlainTextView {
    /// Creates a new PlainTextView with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextView with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writers(use_color, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Creates a view that writes turns to `out` and errors to `err`.
    pub fn with_writers(
        use_color: bool,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            use_color,
            echo_user: true,
            pending: AtomicBool::new(false),
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Skip rendering user turns.
    ///
    /// A line editor has already shown what the user typed.
    pub fn without_user_echo(mut self) -> Self {
        self.echo_user = false;
        self
    }

    /// Print an informational message.
    pub fn print_info(&self, info: &str) {
        let mut out = lock(&self.out);
        self.clear_pending(&mut **out);
        let _ = writeln!(out, "{info}");
        let _ = out.flush();
    }

    /// Take the indicator down if it is up. Returns quietly otherwise.
    fn clear_pending(&self, out: &mut dyn Write) {
        if self.pending.swap(false, Ordering::AcqRel) && self.use_color {
            let _ = write!(out, "{ANSI_CLEAR_LINE}");
        }
    }

    fn label(&self, role: Role) -> String {
        let name = match role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        if self.use_color {
            format!("{ANSI_CYAN}{name}:{ANSI_RESET}")
        } else {
            format!("{name}:")
        }
    }
}

impl Default for PlainTextView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for PlainTextView {
    fn render_turn(&self, turn: &Turn) {
        if turn.role() == Role::User && !self.echo_user {
            return;
        }
        let mut out = lock(&self.out);
        self.clear_pending(&mut **out);
        let _ = writeln!(out, "{} {}", self.label(turn.role()), turn.text());
        let _ = out.flush();
    }

    fn render_error(&self, message: &str) {
        {
            let mut out = lock(&self.out);
            self.clear_pending(&mut **out);
            let _ = out.flush();
        }
        let mut err = lock(&self.err);
        let _ = if self.use_color {
            writeln!(err, "{ANSI_RED}Error: {message}{ANSI_RESET}")
        } else {
            writeln!(err, "Error: {message}")
        };
        let _ = err.flush();
    }

    fn set_pending(&self, pending: bool) {
        let mut out = lock(&self.out);
        if !pending {
            self.clear_pending(&mut **out);
        } else if !self.pending.swap(true, Ordering::AcqRel) {
            let _ = if self.use_color {
                write!(out, "{ANSI_DIM}{PENDING_TEXT}{ANSI_RESET}")
            } else {
                writeln!(out, "{PENDING_TEXT}")
            };
        }
        let _ = out.flush();
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn view_default_has_color() {
        let view = PlainTextView::new();
        assert!(view.use_color);
        assert!(view.echo_user);
    }

    #[test]
    fn view_without_color() {
        let view = PlainTextView::with_color(false).without_user_echo();
        assert!(!view.use_color);
        assert!(!view.echo_user);
        assert_eq!(view.label(Role::Assistant), "Assistant:");
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn buffered_view(use_color: bool) -> (PlainTextView, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let view =
            PlainTextView::with_writers(use_color, Box::new(out.clone()), Box::new(err.clone()))
                .without_user_echo();
        (view, out, err)
    }

    /// What a terminal shows: everything before a carriage return on a line
    /// has been overwritten.
    fn visible_lines(raw: &str) -> Vec<String> {
        raw.lines()
            .map(|line| line.rsplit('\r').next().unwrap_or(line))
            .map(|line| line.replace("\x1b[2K", ""))
            .collect()
    }

    #[test]
    fn answer_replaces_pending_indicator() {
        let (view, out, _) = buffered_view(true);

        view.set_pending(true);
        view.render_turn(&Turn::assistant("Hi there"));
        view.set_pending(false);

        let raw = out.contents();
        assert_eq!(
            visible_lines(&raw),
            [format!("{ANSI_CYAN}Assistant:{ANSI_RESET} Hi there")]
        );
        // Settling after the answer must not erase the answer.
        assert!(raw.ends_with("Hi there\n"), "{raw:?}");
    }

    #[test]
    fn plain_answer_has_no_pending_prefix() {
        let (view, out, _) = buffered_view(false);

        view.set_pending(true);
        view.render_turn(&Turn::user("Hello"));
        view.render_turn(&Turn::assistant("Hi there"));
        view.set_pending(false);

        assert_eq!(out.contents(), "...\nAssistant: Hi there\n");
    }

    #[test]
    fn error_clears_pending_indicator() {
        let (view, out, err) = buffered_view(true);

        view.set_pending(true);
        view.render_error("relay is down");
        view.set_pending(false);

        assert_eq!(
            out.contents(),
            format!("{ANSI_DIM}...{ANSI_RESET}{ANSI_CLEAR_LINE}")
        );
        assert_eq!(
            err.contents(),
            format!("{ANSI_RED}Error: relay is down{ANSI_RESET}\n")
        );
    }

    #[test]
    fn settling_without_output_clears_once() {
        let (view, out, _) = buffered_view(true);

        view.set_pending(true);
        view.set_pending(false);
        view.set_pending(false);

        assert_eq!(
            out.contents(),
            format!("{ANSI_DIM}...{ANSI_RESET}{ANSI_CLEAR_LINE}")
        );
    }
}
