//! Prompt controller and its builder.
//!
//! A [`Prompt`] owns the edit buffer, history, completion state and the
//! [`Renderer`]. Raw bytes go in through [`Prompt::feed`], one keystroke
//! chunk at a time; the read loops in [`Prompt::run`] and [`Prompt::input`]
//! pull those chunks from a background reader thread.
//!
//! # Examples
//!
//! ```
//! use linekit::prelude::*;
//! use linekit_io::{MockConsoleInput, MockConsoleOutput};
//!
//! let mut prompt = Prompt::builder()
//!     .with_prefix(">> ")
//!     .with_completer(StaticCompleter::new(vec![
//!         Suggest::new("select", "Pick rows"),
//!         Suggest::new("insert", "Add rows"),
//!     ]))
//!     .with_input(Box::new(MockConsoleInput::new()))
//!     .with_output(Box::new(MockConsoleOutput::new()))
//!     .build()
//!     .unwrap();
//!
//! prompt.feed(b"sel");
//! assert_eq!(prompt.buffer().text(), "sel");
//! assert_eq!(prompt.feed(b"\r"), Feed::Submit("sel".to_string()));
//! assert_eq!(prompt.history().entries(), ["sel"]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use linekit_core::key_bindings::{self, common_key_bindings, emacs_key_bindings};
use linekit_core::unicode::rune_count;
use linekit_core::{
    get_key, remove_ascii_sequences, AsciiCodeBind, Buffer, Color, Completer, CompletionManager,
    ConsoleError, ConsoleInput, ConsoleOutput, Diagnostic, Document, History, Key, KeyBind,
    KeyBindMode, Lexer, Suggest, WinSize,
};
use linekit_io::debug::assert_no_error;
use log::{debug, trace, warn};
#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM, SIGWINCH};
#[cfg(unix)]
use signal_hook::iterator::{Handle as SignalsHandle, Signals};
use thiserror::Error;

use crate::renderer::{RenderColors, Renderer};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const RESIZE_POLL_INTERVAL: Duration = Duration::from_millis(100);
const EVENT_QUEUE_SIZE: usize = 128;
#[cfg(unix)]
const WATCHED_SIGNALS: [i32; 4] = [SIGINT, SIGTERM, SIGQUIT, SIGWINCH];

#[derive(Debug, Error)]
pub enum PromptError {
    /// The input source could not be set up or created
    #[error("console error: {0}")]
    Console(#[from] ConsoleError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An exit was requested through a [`PromptHandle`] while reading a line
    #[error("prompt was interrupted")]
    Interrupted,
}

pub type PromptResult<T> = Result<T, PromptError>;

/// Decides whether the session ends. Called with the buffer text after every
/// keystroke (`false`) and with each submitted line after it ran (`true`).
pub type ExitChecker = Box<dyn Fn(&str, bool) -> bool + Send>;

/// Decides whether a submission key finishes the statement in the buffer.
pub type StatementTerminator = Box<dyn Fn(Key, &Buffer) -> bool + Send>;

/// What a keystroke did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    Continue,
    /// The statement was finished; the buffer is already empty again
    Submit(String),
    Exit,
}

enum Event {
    Input(Vec<u8>),
    Resize(WinSize),
    Exit(i32),
    Diagnostics(Vec<Diagnostic>),
    Completed {
        generation: u64,
        suggestions: Vec<Suggest>,
    },
}

/// Talks to a running prompt from other threads.
#[derive(Clone)]
pub struct PromptHandle {
    events: SyncSender<Event>,
}

impl PromptHandle {
    /// End the session with `code`. Returns `false` once the prompt is gone.
    pub fn exit(&self, code: i32) -> bool {
        self.events.send(Event::Exit(code)).is_ok()
    }

    /// Replace the diagnostics shown for the current text, e.g. from a
    /// linter running in the background.
    pub fn set_diagnostics(&self, diagnostics: Vec<Diagnostic>) -> bool {
        self.events.send(Event::Diagnostics(diagnostics)).is_ok()
    }
}

/// Background reader and signal/resize watcher for one session.
struct Workers {
    stop: Arc<AtomicBool>,
    #[cfg(unix)]
    signals: Option<SignalsHandle>,
    handles: Vec<JoinHandle<()>>,
}

impl Workers {
    fn start(input: Arc<dyn ConsoleInput>, events: SyncSender<Event>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let input = Arc::clone(&input);
            let events = events.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || read_loop(input.as_ref(), &events, &stop))
        };

        #[cfg(unix)]
        let (watcher, signals) = match Signals::new(WATCHED_SIGNALS) {
            Ok(signals) => {
                let handle = signals.handle();
                let stop = Arc::clone(&stop);
                let watcher =
                    thread::spawn(move || watch_signals(signals, input.as_ref(), &events, &stop));
                (watcher, Some(handle))
            }
            Err(err) => {
                warn!("cannot watch signals, polling the window size instead: {err}");
                let stop = Arc::clone(&stop);
                let watcher =
                    thread::spawn(move || watch_win_size(input.as_ref(), &events, &stop));
                (watcher, None)
            }
        };
        #[cfg(not(unix))]
        let watcher = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || watch_win_size(input.as_ref(), &events, &stop))
        };

        debug!("reader and resize watcher started");
        Self {
            stop,
            #[cfg(unix)]
            signals,
            handles: vec![reader, watcher],
        }
    }

    fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        #[cfg(unix)]
        {
            if let Some(signals) = &self.signals {
                signals.close();
            }
        }
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("prompt worker thread panicked");
            }
        }
        debug!("reader and resize watcher stopped");
    }
}

/// Queue `event`, giving up when `stop` is raised while the queue is full.
fn deliver(events: &SyncSender<Event>, mut event: Event, stop: &AtomicBool) -> bool {
    loop {
        match events.try_send(event) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(back)) => {
                if stop.load(Ordering::SeqCst) {
                    return false;
                }
                event = back;
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn read_loop(input: &dyn ConsoleInput, events: &SyncSender<Event>, stop: &AtomicBool) {
    debug!("start reading input");
    while !stop.load(Ordering::SeqCst) {
        match input.read() {
            // a lone NUL is what some terminals send on focus changes
            Ok(Some(bytes)) if bytes != [0] => {
                if !deliver(events, Event::Input(bytes), stop) {
                    break;
                }
            }
            Ok(_) => {}
            Err(ConsoleError::InputClosed) => {
                debug!("input closed");
                break;
            }
            Err(err) => warn!("read failed: {err}"),
        }
        thread::sleep(POLL_INTERVAL);
    }
    debug!("stop reading input");
}

/// Turn window changes into resize events and termination signals into an
/// exit with code 0. Returns once the signal handle is closed.
#[cfg(unix)]
fn watch_signals(
    mut signals: Signals,
    input: &dyn ConsoleInput,
    events: &SyncSender<Event>,
    stop: &AtomicBool,
) {
    for signal in signals.forever() {
        let event = match signal {
            SIGWINCH => {
                let size = input.get_win_size();
                trace!("window resized to {}x{}", size.rows, size.cols);
                Event::Resize(size)
            }
            _ => {
                debug!("received signal {signal}, exiting");
                Event::Exit(0)
            }
        };
        if !deliver(events, event, stop) {
            break;
        }
    }
}

fn watch_win_size(input: &dyn ConsoleInput, events: &SyncSender<Event>, stop: &AtomicBool) {
    let mut last = input.get_win_size();
    while !stop.load(Ordering::SeqCst) {
        thread::sleep(RESIZE_POLL_INTERVAL);
        let size = input.get_win_size();
        if size != last {
            trace!("window resized to {}x{}", size.rows, size.cols);
            last = size;
            if !deliver(events, Event::Resize(size), stop) {
                break;
            }
        }
    }
}

/// Background completion bookkeeping for [`Prompt::input`].
///
/// At most one lookup runs at a time. Edits made while it runs bump
/// `generation` and mark a follow-up as pending; results tagged with an
/// older generation are dropped.
#[derive(Debug, Default)]
struct Lookup {
    generation: u64,
    /// Generation of the lookup still running, if any
    in_flight: Option<u64>,
    pending: bool,
}

impl Lookup {
    fn finish(&mut self, generation: u64) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
    }
}

/// An interactive prompt.
pub struct Prompt {
    input: Arc<dyn ConsoleInput>,
    renderer: Renderer,
    buffer: Buffer,
    history: History,
    completion: CompletionManager,
    completion_on_down: bool,
    lexer: Option<Arc<dyn Lexer>>,
    diagnostics: Vec<Diagnostic>,
    prev_text: String,
    last_key: Option<Key>,
    key_bind_mode: KeyBindMode,
    common_bindings: Vec<KeyBind>,
    emacs_bindings: Vec<KeyBind>,
    key_bindings: Vec<KeyBind>,
    ascii_code_bindings: Vec<AsciiCodeBind>,
    exit_checker: Option<ExitChecker>,
    statement_terminator: Option<StatementTerminator>,
    lookup: Lookup,
    events_tx: SyncSender<Event>,
    events_rx: Receiver<Event>,
}

impl Prompt {
    pub fn builder() -> PromptBuilder {
        PromptBuilder::new()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn completion(&self) -> &CompletionManager {
        &self.completion
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn add_key_bindings(&mut self, binds: impl IntoIterator<Item = KeyBind>) {
        self.key_bindings.extend(binds);
    }

    pub fn add_ascii_code_bindings(&mut self, binds: impl IntoIterator<Item = AsciiCodeBind>) {
        self.ascii_code_bindings.extend(binds);
    }

    /// A handle for ending the session or pushing diagnostics from another
    /// thread.
    pub fn handle(&self) -> PromptHandle {
        PromptHandle {
            events: self.events_tx.clone(),
        }
    }

    pub fn clear_screen(&mut self) {
        self.renderer.clear_screen();
    }

    /// Show `diagnostics` until the buffer text changes.
    pub fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
        self.prev_text = self.buffer.text().to_owned();
        self.render();
    }

    /// Draw the current state. Returns the rows traced back over.
    pub fn render(&mut self) -> usize {
        if self.buffer.text() != self.prev_text {
            self.diagnostics.clear();
        }
        self.renderer.render(
            &self.buffer,
            self.last_key,
            &self.completion,
            self.lexer.as_deref(),
            &self.diagnostics,
        )
    }

    /// Apply one chunk of raw input.
    pub fn feed(&mut self, bytes: &[u8]) -> Feed {
        let key = get_key(bytes);
        self.prev_text = self.buffer.text().to_owned();
        self.last_key = Some(key);
        self.buffer.set_last_key_stroke(key);

        let completing = self.completion.completing();
        self.handle_completion_key_binding(key, completing);

        let mut submitted = None;
        match key {
            Key::Enter | Key::ControlJ | Key::ControlM | Key::AltEnter => {
                let terminated = self
                    .statement_terminator
                    .as_ref()
                    .map_or(true, |terminator| terminator(key, &self.buffer));
                if terminated {
                    self.renderer.break_line(&self.buffer, self.lexer.as_deref());
                    let finished = std::mem::take(&mut self.buffer);
                    let text = finished.text().to_owned();
                    if !text.is_empty() {
                        self.history.add(text.clone());
                    }
                    debug!("submitted {text:?}");
                    submitted = Some(text);
                } else {
                    self.buffer.new_line(false);
                }
            }
            Key::ControlC => {
                self.renderer.break_line(&self.buffer, self.lexer.as_deref());
                self.buffer = Buffer::new();
                self.history.clear();
            }
            Key::Up | Key::ControlP if !completing => {
                if self.buffer.has_prev_line() {
                    self.buffer.cursor_up(1);
                } else if let Some(older) = self.history.older(&self.buffer) {
                    self.prev_text = self.buffer.text().to_owned();
                    self.buffer = older;
                }
                return Feed::Continue;
            }
            Key::Down | Key::ControlN if !completing => {
                if self.buffer.has_next_line() {
                    self.buffer.cursor_down(1);
                } else if let Some(newer) = self.history.newer(&self.buffer) {
                    self.prev_text = self.buffer.text().to_owned();
                    self.buffer = newer;
                }
                return Feed::Continue;
            }
            Key::ControlD if self.buffer.text().is_empty() => {
                return Feed::Exit;
            }
            Key::NotDefined => {
                if self.handle_ascii_code_binding(bytes) {
                    return Feed::Continue;
                }
                let cleaned = remove_ascii_sequences(bytes);
                self.buffer
                    .insert_text(&String::from_utf8_lossy(&cleaned), false, true);
                self.renderer.set_hide_completion(false);
            }
            _ => {}
        }

        if self.handle_key_binding(key) {
            return Feed::Exit;
        }
        match submitted {
            Some(text) => Feed::Submit(text),
            None => Feed::Continue,
        }
    }

    fn complete_on_down(&self) -> bool {
        self.completion_on_down && !self.history.has_newer() && !self.buffer.has_next_line()
    }

    fn handle_completion_key_binding(&mut self, key: Key, completing: bool) {
        match key {
            Key::Down => {
                if completing || self.complete_on_down() {
                    self.completion.next();
                }
            }
            Key::Tab | Key::ControlI => self.completion.next(),
            Key::Up => {
                if completing {
                    self.completion.previous();
                }
            }
            Key::BackTab => self.completion.previous(),
            Key::Escape => {
                self.completion.reset();
                self.renderer.set_hide_completion(true);
            }
            _ => {
                if let Some(suggest) = self.completion.get_selected_suggestion() {
                    let word = self
                        .buffer
                        .document()
                        .get_word_before_cursor_until_separator(self.completion.word_separator());
                    if !word.is_empty() {
                        let count = rune_count(word);
                        self.buffer.delete_before_cursor(count);
                    }
                    self.buffer.insert_text(&suggest.text, false, true);
                }
                self.completion.reset();
            }
        }
    }

    fn handle_key_binding(&mut self, key: Key) -> bool {
        key_bindings::apply(&self.common_bindings, key, &mut self.buffer);
        if self.key_bind_mode == KeyBindMode::Emacs {
            key_bindings::apply(&self.emacs_bindings, key, &mut self.buffer);
        }
        key_bindings::apply(&self.key_bindings, key, &mut self.buffer);

        self.exit_checker
            .as_ref()
            .is_some_and(|check| check(self.buffer.text(), false))
    }

    fn handle_ascii_code_binding(&mut self, bytes: &[u8]) -> bool {
        let mut matched = false;
        for bind in self.ascii_code_bindings.iter().filter(|b| b.bytes == bytes) {
            (bind.func)(&mut self.buffer);
            matched = true;
        }
        matched
    }

    fn setup(&mut self) -> PromptResult<()> {
        self.input.setup()?;
        self.renderer.setup();
        self.renderer.update_win_size(self.input.get_win_size());
        debug!("prompt set up");
        Ok(())
    }

    fn tear_down(&mut self, skip_input: bool) {
        if !skip_input {
            assert_no_error(self.input.tear_down());
        }
        self.renderer.tear_down();
        debug!("prompt torn down");
    }

    fn start_workers(&self) -> Workers {
        Workers::start(Arc::clone(&self.input), self.events_tx.clone())
    }

    fn next_event(&self) -> Option<Event> {
        loop {
            match self.events_rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => return Some(event),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Read statements until the session ends, passing each one to
    /// `executor`.
    ///
    /// Raw mode is left while the executor runs so that it can read stdin
    /// and print normally. Returns the code given to [`PromptHandle::exit`],
    /// or 0 when the session ended from the keyboard or the exit checker.
    pub fn run<F>(&mut self, mut executor: F) -> PromptResult<i32>
    where
        F: FnMut(&str),
    {
        linekit_io::debug::init();
        debug!("start prompt");
        self.setup()?;

        if self.completion.show_at_start() {
            self.completion.update(self.buffer.document());
        }
        self.render();

        let mut workers = self.start_workers();
        loop {
            let Some(event) = self.next_event() else {
                workers.stop();
                self.tear_down(false);
                return Ok(0);
            };
            match event {
                Event::Input(bytes) => match self.feed(&bytes) {
                    Feed::Exit => {
                        self.renderer.break_line(&self.buffer, self.lexer.as_deref());
                        workers.stop();
                        self.tear_down(false);
                        return Ok(0);
                    }
                    Feed::Submit(input) => {
                        workers.stop();
                        assert_no_error(self.input.tear_down());
                        executor(&input);

                        self.refresh_completion();
                        self.render();

                        if self
                            .exit_checker
                            .as_ref()
                            .is_some_and(|check| check(&input, true))
                        {
                            self.tear_down(true);
                            return Ok(0);
                        }
                        assert_no_error(self.input.setup());
                        workers = self.start_workers();
                    }
                    Feed::Continue => {
                        self.refresh_completion();
                        self.render();
                    }
                },
                Event::Resize(size) => {
                    self.renderer.update_win_size(size);
                    self.render();
                }
                Event::Exit(code) => {
                    debug!("exit requested with code {code}");
                    self.renderer.break_line(&self.buffer, self.lexer.as_deref());
                    workers.stop();
                    self.tear_down(false);
                    return Ok(code);
                }
                Event::Diagnostics(diagnostics) => self.set_diagnostics(diagnostics),
                // left over from an earlier `input` call
                Event::Completed { generation, .. } => self.lookup.finish(generation),
            }
        }
    }

    /// Read a single statement and return it.
    ///
    /// Completion lookups run on a background thread so a slow completer
    /// never delays echoing keystrokes. Returns an empty string when the
    /// session is ended from the keyboard and [`PromptError::Interrupted`]
    /// when a [`PromptHandle`] requests an exit.
    pub fn input(&mut self) -> PromptResult<String> {
        linekit_io::debug::init();
        debug!("start prompt");
        self.setup()?;
        // a lookup from an earlier call may still be running
        self.lookup.generation += 1;
        self.lookup.pending = false;

        if self.completion.show_at_start() {
            self.completion.update(self.buffer.document());
        }
        self.render();

        let workers = self.start_workers();
        let result = loop {
            let Some(event) = self.next_event() else {
                break Ok(String::new());
            };
            match event {
                Event::Input(bytes) => {
                    let text_before = self.buffer.text().to_owned();
                    match self.feed(&bytes) {
                        Feed::Exit => {
                            self.renderer.break_line(&self.buffer, self.lexer.as_deref());
                            break Ok(String::new());
                        }
                        Feed::Submit(input) => break Ok(input),
                        Feed::Continue => {
                            let changed = self.buffer.text() != text_before;
                            self.request_completion(changed);
                            self.render();
                        }
                    }
                }
                Event::Resize(size) => {
                    self.renderer.update_win_size(size);
                    self.render();
                }
                Event::Exit(code) => {
                    debug!("exit requested with code {code}");
                    self.renderer.break_line(&self.buffer, self.lexer.as_deref());
                    break Err(PromptError::Interrupted);
                }
                Event::Diagnostics(diagnostics) => self.set_diagnostics(diagnostics),
                Event::Completed {
                    generation,
                    suggestions,
                } => {
                    self.apply_completion(generation, suggestions);
                    self.render();
                }
            }
        };
        workers.stop();
        self.tear_down(false);
        result
    }

    /// Query the completer in place unless the user is moving through the
    /// dropdown.
    fn refresh_completion(&mut self) {
        if !self.completion.completing() {
            self.completion.update(self.buffer.document());
        }
    }

    fn request_completion(&mut self, text_changed: bool) {
        if text_changed {
            self.lookup.generation += 1;
        }
        // navigating the dropdown must not replace it
        if self.completion.completing() {
            return;
        }
        let Some(completer) = self.completion.completer() else {
            return;
        };
        if self.lookup.in_flight.is_some() {
            self.lookup.pending = true;
            return;
        }
        self.spawn_lookup(completer);
    }

    fn spawn_lookup(&mut self, completer: Arc<dyn Completer>) {
        let generation = self.lookup.generation;
        self.lookup.in_flight = Some(generation);
        let document: Document = self.buffer.document().clone();
        let events = self.events_tx.clone();
        trace!("completion lookup {generation} started");
        thread::spawn(move || {
            let suggestions = completer.complete(&document);
            // the prompt may be gone by now
            let _ = events.send(Event::Completed {
                generation,
                suggestions,
            });
        });
    }

    fn apply_completion(&mut self, generation: u64, suggestions: Vec<Suggest>) {
        self.lookup.finish(generation);
        if generation == self.lookup.generation && !self.completion.completing() {
            self.completion.set_suggestions(suggestions);
        } else {
            trace!(
                "dropping completion lookup {generation}, now at {}",
                self.lookup.generation
            );
        }
        if self.lookup.in_flight.is_none() && std::mem::take(&mut self.lookup.pending) {
            self.request_completion(false);
        }
    }
}

macro_rules! color_setter {
    ($(#[$meta:meta])* $name:ident => $field:ident) => {
        $(#[$meta])*
        pub fn $name(mut self, color: Color) -> Self {
            self.colors.$field = color;
            self
        }
    };
}

/// Builder for [`Prompt`].
///
/// Only the input and output backends can fail to build: when they are not
/// given, the terminal backends from `linekit-io` are opened, or a
/// [`linekit_io::FileConsoleInput`] when `LINEKIT_INPUT_FILE` is set.
pub struct PromptBuilder {
    prefix: String,
    live_prefix: Option<Box<dyn Fn() -> Option<String> + Send>>,
    title: String,
    completer: Option<Arc<dyn Completer>>,
    max_suggestions: u16,
    word_separator: String,
    show_completion_at_start: bool,
    completion_on_down: bool,
    history: Vec<String>,
    lexer: Option<Arc<dyn Lexer>>,
    key_bind_mode: KeyBindMode,
    key_bindings: Vec<KeyBind>,
    ascii_code_bindings: Vec<AsciiCodeBind>,
    exit_checker: Option<ExitChecker>,
    statement_terminator: Option<StatementTerminator>,
    break_line_callback: Option<Box<dyn Fn(&Document) + Send>>,
    diagnostics_max_rows: u16,
    colors: RenderColors,
    input: Option<Box<dyn ConsoleInput>>,
    output: Option<Box<dyn ConsoleOutput>>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            prefix: "> ".to_string(),
            live_prefix: None,
            title: String::new(),
            completer: None,
            max_suggestions: 6,
            word_separator: String::new(),
            show_completion_at_start: false,
            completion_on_down: false,
            history: Vec::new(),
            lexer: None,
            key_bind_mode: KeyBindMode::Common,
            key_bindings: Vec::new(),
            ascii_code_bindings: Vec::new(),
            exit_checker: None,
            statement_terminator: None,
            break_line_callback: None,
            diagnostics_max_rows: 5,
            colors: RenderColors::default(),
            input: None,
            output: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Recompute the prefix on every render. `None` keeps the static prefix.
    pub fn with_live_prefix<F>(mut self, live_prefix: F) -> Self
    where
        F: Fn() -> Option<String> + Send + 'static,
    {
        self.live_prefix = Some(Box::new(live_prefix));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_completer<C>(mut self, completer: C) -> Self
    where
        C: Completer + 'static,
    {
        self.completer = Some(Arc::new(completer));
        self
    }

    /// Rows shown in the completion dropdown.
    pub fn with_max_suggestions(mut self, max: u16) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Characters that end the word a suggestion replaces. Empty means
    /// whitespace.
    pub fn with_completion_word_separator(mut self, separator: impl Into<String>) -> Self {
        self.word_separator = separator.into();
        self
    }

    pub fn with_show_completion_at_start(mut self) -> Self {
        self.show_completion_at_start = true;
        self
    }

    /// Let Down enter the dropdown when it is not browsing history or moving
    /// between lines.
    pub fn with_completion_on_down(mut self) -> Self {
        self.completion_on_down = true;
        self
    }

    pub fn with_history(mut self, entries: Vec<String>) -> Self {
        self.history = entries;
        self
    }

    pub fn with_lexer<L>(mut self, lexer: L) -> Self
    where
        L: Lexer + 'static,
    {
        self.lexer = Some(Arc::new(lexer));
        self
    }

    pub fn with_key_bind_mode(mut self, mode: KeyBindMode) -> Self {
        self.key_bind_mode = mode;
        self
    }

    pub fn with_key_bindings(mut self, binds: impl IntoIterator<Item = KeyBind>) -> Self {
        self.key_bindings.extend(binds);
        self
    }

    pub fn with_ascii_code_bindings(
        mut self,
        binds: impl IntoIterator<Item = AsciiCodeBind>,
    ) -> Self {
        self.ascii_code_bindings.extend(binds);
        self
    }

    pub fn with_exit_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&str, bool) -> bool + Send + 'static,
    {
        self.exit_checker = Some(Box::new(checker));
        self
    }

    /// Without a terminator every submission key finishes the statement.
    ///
    /// # Examples
    ///
    /// ```
    /// use linekit::prelude::*;
    /// use linekit_io::{MockConsoleInput, MockConsoleOutput};
    ///
    /// let mut prompt = Prompt::builder()
    ///     .with_statement_terminator(|_, buf: &Buffer| buf.text().trim_end().ends_with(';'))
    ///     .with_input(Box::new(MockConsoleInput::new()))
    ///     .with_output(Box::new(MockConsoleOutput::new()))
    ///     .build()
    ///     .unwrap();
    ///
    /// prompt.feed(b"select 1");
    /// assert_eq!(prompt.feed(b"\r"), Feed::Continue);
    /// assert_eq!(prompt.buffer().text(), "select 1\n");
    /// ```
    pub fn with_statement_terminator<F>(mut self, terminator: F) -> Self
    where
        F: Fn(Key, &Buffer) -> bool + Send + 'static,
    {
        self.statement_terminator = Some(Box::new(terminator));
        self
    }

    pub fn with_break_line_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Document) + Send + 'static,
    {
        self.break_line_callback = Some(Box::new(callback));
        self
    }

    pub fn with_diagnostics_max_rows(mut self, rows: u16) -> Self {
        self.diagnostics_max_rows = rows;
        self
    }

    pub fn with_colors(mut self, colors: RenderColors) -> Self {
        self.colors = colors;
        self
    }

    color_setter!(with_prefix_text_color => prefix_text);
    color_setter!(with_prefix_background_color => prefix_bg);
    color_setter!(with_input_text_color => input_text);
    color_setter!(with_input_background_color => input_bg);
    color_setter!(with_preview_suggestion_text_color => preview_suggestion_text);
    color_setter!(with_preview_suggestion_background_color => preview_suggestion_bg);
    color_setter!(with_suggestion_text_color => suggestion_text);
    color_setter!(with_suggestion_background_color => suggestion_bg);
    color_setter!(with_selected_suggestion_text_color => selected_suggestion_text);
    color_setter!(with_selected_suggestion_background_color => selected_suggestion_bg);
    color_setter!(with_description_text_color => description_text);
    color_setter!(with_description_background_color => description_bg);
    color_setter!(with_selected_description_text_color => selected_description_text);
    color_setter!(with_selected_description_background_color => selected_description_bg);
    color_setter!(with_scrollbar_thumb_color => scrollbar_thumb);
    color_setter!(with_scrollbar_background_color => scrollbar_bg);
    color_setter!(
        /// Characters covered by a diagnostic
        with_diagnostics_text_color => diagnostics_text
    );
    color_setter!(with_diagnostics_background_color => diagnostics_bg);
    color_setter!(
        /// Background of the message box under the input
        with_diagnostics_details_background_color => diagnostics_details_bg
    );

    pub fn with_input(mut self, input: Box<dyn ConsoleInput>) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: Box<dyn ConsoleOutput>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> PromptResult<Prompt> {
        if self.prefix.contains('\n') {
            return Err(PromptError::InvalidConfiguration(
                "prefix must fit on one line".to_string(),
            ));
        }

        let output = match self.output {
            Some(output) => output,
            None => linekit_io::default_console_output(),
        };
        let input: Arc<dyn ConsoleInput> = match self.input {
            Some(input) => Arc::from(input),
            None => Arc::from(linekit_io::default_console_input()?),
        };

        let mut renderer = Renderer::new(output, self.prefix);
        renderer.set_title(self.title);
        renderer.set_diagnostics_max_rows(self.diagnostics_max_rows);
        *renderer.colors_mut() = self.colors;
        if let Some(live_prefix) = self.live_prefix {
            renderer.set_live_prefix(live_prefix);
        }
        if let Some(callback) = self.break_line_callback {
            renderer.set_break_line_callback(callback);
        }

        let completion = CompletionManager::with_shared_completer(self.completer, self.max_suggestions)
            .with_word_separator(self.word_separator)
            .with_show_at_start(self.show_completion_at_start);

        let (events_tx, events_rx) = mpsc::sync_channel(EVENT_QUEUE_SIZE);
        Ok(Prompt {
            input,
            renderer,
            buffer: Buffer::new(),
            history: History::with_entries(self.history),
            completion,
            completion_on_down: self.completion_on_down,
            lexer: self.lexer,
            diagnostics: Vec::new(),
            prev_text: String::new(),
            last_key: None,
            key_bind_mode: self.key_bind_mode,
            common_bindings: common_key_bindings(),
            emacs_bindings: emacs_key_bindings(),
            key_bindings: self.key_bindings,
            ascii_code_bindings: self.ascii_code_bindings,
            exit_checker: self.exit_checker,
            statement_terminator: self.statement_terminator,
            lookup: Lookup::default(),
            events_tx,
            events_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linekit_core::StaticCompleter;
    use linekit_io::{MockConsoleInput, MockConsoleOutput};

    fn builder() -> PromptBuilder {
        Prompt::builder()
            .with_input(Box::new(MockConsoleInput::new()))
            .with_output(Box::new(MockConsoleOutput::new()))
    }

    #[test]
    fn test_builder_defaults() {
        let prompt = builder().build().unwrap();
        assert_eq!(prompt.completion().max(), 6);
        assert!(prompt.history().entries().is_empty());
        assert_eq!(prompt.renderer().colors(), &RenderColors::default());
        assert_eq!(prompt.buffer().text(), "");
    }

    #[test]
    fn test_builder_rejects_multiline_prefix() {
        let result = builder().with_prefix("a\n> ").build();
        assert!(matches!(result, Err(PromptError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_builder_color_setters() {
        let prompt = builder()
            .with_prefix_text_color(Color::Green)
            .with_scrollbar_thumb_color(Color::White)
            .build()
            .unwrap();
        assert_eq!(prompt.renderer().colors().prefix_text, Color::Green);
        assert_eq!(prompt.renderer().colors().scrollbar_thumb, Color::White);
    }

    #[test]
    fn test_prompt_error_display() {
        let error = PromptError::InvalidConfiguration("bad config".to_string());
        assert_eq!(error.to_string(), "invalid configuration: bad config");
        let error = PromptError::from(ConsoleError::NotATerminal);
        assert!(matches!(error, PromptError::Console(_)));
    }

    #[test]
    fn test_submit_without_terminator() {
        let mut prompt = builder().build().unwrap();
        prompt.feed(b"abc");
        assert_eq!(prompt.feed(b"\r"), Feed::Submit("abc".to_string()));
        assert_eq!(prompt.buffer().text(), "");
    }

    #[test]
    fn test_empty_submission_not_in_history() {
        let mut prompt = builder().build().unwrap();
        assert_eq!(prompt.feed(b"\r"), Feed::Submit(String::new()));
        assert!(prompt.history().entries().is_empty());
    }

    #[test]
    fn test_control_c_discards_line() {
        let mut prompt = builder().with_history(vec!["a".into()]).build().unwrap();
        prompt.feed(b"abc");
        assert_eq!(prompt.feed(&[0x03]), Feed::Continue);
        assert_eq!(prompt.buffer().text(), "");
        assert_eq!(prompt.history().entries(), ["a"]);
    }

    #[test]
    fn test_control_d_exits_only_on_empty_buffer() {
        let mut prompt = builder().build().unwrap();
        prompt.feed(b"ab");
        prompt.feed(&[0x01]);
        assert_eq!(prompt.feed(&[0x04]), Feed::Continue);
        assert_eq!(prompt.buffer().text(), "ab");

        let mut prompt = builder().build().unwrap();
        assert_eq!(prompt.feed(&[0x04]), Feed::Exit);
    }

    #[test]
    fn test_exit_checker_runs_after_each_key() {
        let mut prompt = builder()
            .with_exit_checker(|text, final_submission| !final_submission && text == "quit")
            .build()
            .unwrap();
        assert_eq!(prompt.feed(b"qui"), Feed::Continue);
        assert_eq!(prompt.feed(b"t"), Feed::Exit);
    }

    #[test]
    fn test_tab_and_splice_selected_suggestion() {
        let mut prompt = builder()
            .with_completer(StaticCompleter::new(vec![
                Suggest::from("select"),
                Suggest::from("set"),
            ]))
            .build()
            .unwrap();
        prompt.feed(b"se");
        prompt.completion().update(prompt.buffer().document());
        prompt.feed(b"\t");
        prompt.feed(b"\t");
        assert_eq!(
            prompt.completion().get_selected_suggestion(),
            Some(Suggest::from("set"))
        );

        prompt.feed(b" ");
        assert_eq!(prompt.buffer().text(), "set ");
        assert!(!prompt.completion().completing());
    }

    #[test]
    fn test_escape_hides_completion() {
        let mut prompt = builder()
            .with_completer(StaticCompleter::new(vec![Suggest::from("select")]))
            .build()
            .unwrap();
        prompt.feed(b"s");
        prompt.completion().update(prompt.buffer().document());
        prompt.feed(&[0x1b]);
        assert!(prompt.renderer().hide_completion());
        assert!(prompt.completion().suggestions().is_empty());

        prompt.feed(b"e");
        assert!(!prompt.renderer().hide_completion());
    }

    #[test]
    fn test_ascii_code_binding_consumes_bytes() {
        let mut prompt = builder()
            .with_ascii_code_bindings([AsciiCodeBind::new(b"jj".to_vec(), |buf: &mut Buffer| {
                buf.insert_text("<jj>", false, true)
            })])
            .build()
            .unwrap();
        prompt.feed(b"jj");
        assert_eq!(prompt.buffer().text(), "<jj>");
        prompt.feed(b"j");
        assert_eq!(prompt.buffer().text(), "<jj>j");
    }

    #[test]
    fn test_emacs_bindings_only_in_emacs_mode() {
        let mut prompt = builder().build().unwrap();
        prompt.feed(b"abc");
        prompt.feed(&[0x01]);
        assert_eq!(prompt.buffer().cursor_position(), 3);

        let mut prompt = builder().with_key_bind_mode(KeyBindMode::Emacs).build().unwrap();
        prompt.feed(b"abc");
        prompt.feed(&[0x01]);
        assert_eq!(prompt.buffer().cursor_position(), 0);
    }

    #[test]
    fn test_custom_key_binding() {
        let mut prompt = builder()
            .with_key_bindings([KeyBind::new(Key::ControlT, |buf: &mut Buffer| {
                buf.set_text("replaced")
            })])
            .build()
            .unwrap();
        prompt.feed(&[0x14]);
        assert_eq!(prompt.buffer().text(), "replaced");
    }

    #[test]
    fn test_stray_escape_sequences_are_removed_from_text() {
        let mut prompt = builder().build().unwrap();
        prompt.feed(b"a\x1b[Ab");
        assert_eq!(prompt.buffer().text(), "ab");
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut prompt = builder()
            .with_completer(StaticCompleter::new(vec![Suggest::from("select")]))
            .build()
            .unwrap();
        prompt.lookup.in_flight = Some(1);
        prompt.lookup.generation = 2;
        prompt.apply_completion(1, vec![Suggest::from("stale")]);
        assert!(prompt.completion().suggestions().is_empty());
        assert_eq!(prompt.lookup.in_flight, None);

        prompt.lookup.in_flight = Some(2);
        prompt.apply_completion(2, vec![Suggest::from("fresh")]);
        assert_eq!(prompt.completion().suggestions(), vec![Suggest::from("fresh")]);
    }

    #[test]
    fn test_edit_during_lookup_marks_pending() {
        let mut prompt = builder()
            .with_completer(StaticCompleter::new(vec![Suggest::from("select")]))
            .build()
            .unwrap();
        prompt.lookup.in_flight = Some(0);
        prompt.request_completion(true);
        assert!(prompt.lookup.pending);
        assert_eq!(prompt.lookup.generation, 1);
    }

    #[test]
    fn test_result_of_older_lookup_keeps_current_one_in_flight() {
        let mut prompt = builder()
            .with_completer(StaticCompleter::new(vec![Suggest::from("select")]))
            .build()
            .unwrap();
        // lookup 3 runs while a result from an earlier session shows up
        prompt.lookup.generation = 3;
        prompt.lookup.in_flight = Some(3);
        prompt.lookup.pending = true;
        prompt.apply_completion(1, vec![Suggest::from("stale")]);

        assert_eq!(prompt.lookup.in_flight, Some(3));
        assert!(prompt.lookup.pending);
        assert!(prompt.completion().suggestions().is_empty());

        prompt.request_completion(true);
        assert_eq!(prompt.lookup.in_flight, Some(3));
        assert_eq!(prompt.lookup.generation, 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_signals_become_events() {
        use signal_hook::consts::signal::{SIGTERM, SIGWINCH};
        use signal_hook::low_level::raise;

        let input = MockConsoleInput::new();
        let (events_tx, events_rx) = mpsc::sync_channel(EVENT_QUEUE_SIZE);
        let workers = Workers::start(Arc::new(input.clone()), events_tx);

        input.set_win_size(40, 100);
        raise(SIGWINCH).unwrap();
        match events_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Event::Resize(size)) => assert_eq!(size, WinSize::new(40, 100)),
            _ => panic!("expected a resize event"),
        }

        raise(SIGTERM).unwrap();
        assert!(matches!(
            events_rx.recv_timeout(Duration::from_secs(5)),
            Ok(Event::Exit(0))
        ));
        workers.stop();
    }
}
