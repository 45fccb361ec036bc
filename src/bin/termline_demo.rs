//! `termline_demo`: interactive line editor demonstration binary
//!
//! Reads lines with the termline editor and echoes each submitted line
//! back as if it came from a remote server, passed through the configured
//! marks and substitutions.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin termline_demo
//! cargo run --bin termline_demo -- --mark '&ERROR&=bold RED'
//! cargo run --bin termline_demo -- --state ~/.termline
//! cargo run --bin termline_demo -- --headless-smoke
//! ```
//!
//! Type `quit` to exit.

// Required for libc FFI (fcntl for non-blocking stdin).
#![allow(unsafe_code)]

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;
use termline::pattern::{PatternEntry, split_anchor};
use termline::persist::Directive;
use termline::terminal::{install_resize_handler, take_resize_pending};
use termline::{
    AnsiWriter, EditorConfig, LogLevel, Session, SessionEvent, enable_raw_mode, is_tty, set_log_callback,
    terminal_size,
};

const HELP_TEXT: &str = "termline_demo - termline line editor demonstration

USAGE:
    termline_demo [OPTIONS]

OPTIONS:
    -h, --help              Print this help message and exit
    --prompt <TEXT>         Prompt to show (default: \"> \")
    --mark <PAT=ATTR>       Add a mark, e.g. '&ERROR&=bold RED' (repeatable)
    --subst <PAT=TEXT>      Add a substitution (repeatable)
    --state <FILE>          Load directives from FILE and save them on exit
    --no-echo               Hide typed text
    --verbose               Print debug log messages to stderr

    --headless-smoke        Run headless smoke test (no TTY required)

EXAMPLES:
    termline_demo --mark '^$ tells you=bold'
    termline_demo --subst 'gold coins=gc' --prompt 'hp> '
";

/// Application configuration parsed from command-line arguments.
#[derive(Clone, Debug)]
pub struct Config {
    pub prompt: String,
    pub marks: Vec<String>,
    pub substitutions: Vec<String>,
    pub state: Option<PathBuf>,
    pub echo: bool,
    pub verbose: bool,
    pub headless_smoke: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            marks: Vec::new(),
            substitutions: Vec::new(),
            state: None,
            echo: true,
            verbose: false,
            headless_smoke: false,
        }
    }
}

/// Result of CLI parsing.
pub enum ParseResult {
    /// Successfully parsed configuration.
    Config(Config),
    /// User requested help.
    Help,
    /// Parse error with message.
    Error(String),
}

impl Config {
    /// Parse configuration from command-line arguments.
    pub fn from_args<I>(args: I) -> ParseResult
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        // Skip program name
        args.next();

        while let Some(arg) = args.next() {
            let arg_str = arg.to_string_lossy();
            let mut value = |name: &str| match args.next() {
                Some(v) => Ok(v.to_string_lossy().to_string()),
                None => Err(format!("{name} requires a value")),
            };

            match arg_str.as_ref() {
                "-h" | "--help" => return ParseResult::Help,
                "--prompt" => match value("--prompt") {
                    Ok(v) => config.prompt = v,
                    Err(e) => return ParseResult::Error(e),
                },
                "--mark" => match value("--mark") {
                    Ok(v) => config.marks.push(v),
                    Err(e) => return ParseResult::Error(e),
                },
                "--subst" => match value("--subst") {
                    Ok(v) => config.substitutions.push(v),
                    Err(e) => return ParseResult::Error(e),
                },
                "--state" => match value("--state") {
                    Ok(v) => config.state = Some(PathBuf::from(v)),
                    Err(e) => return ParseResult::Error(e),
                },
                "--no-echo" => config.echo = false,
                "--verbose" => config.verbose = true,
                "--headless-smoke" => config.headless_smoke = true,
                other => {
                    if other.starts_with('-') {
                        return ParseResult::Error(format!("Unknown option: {other}"));
                    }
                    // Ignore positional arguments for now
                }
            }
        }

        ParseResult::Config(config)
    }

    /// Build a session with the configured patterns, writing to `out`.
    fn session<W: io::Write>(&self, out: AnsiWriter<W>) -> termline::Result<Session<AnsiWriter<W>>> {
        let mut session = Session::new(out, EditorConfig::default().with_echo(self.echo));
        if let Some(path) = &self.state {
            if path.exists() {
                let mut reader = BufReader::new(File::open(path)?);
                session.load(&mut reader)?;
            }
        }
        for mark in &self.marks {
            let directive = format!("#mark {mark}");
            if let Some(Directive::Mark {
                anchored,
                pattern,
                style,
            }) = Directive::parse(directive.as_bytes(), 0)?
            {
                session
                    .patterns_mut()
                    .add(PatternEntry::mark(&pattern, anchored, style)?);
            }
        }
        for subst in &self.substitutions {
            let Some((pattern, replacement)) = subst.split_once('=') else {
                return Err(termline::Error::Parse {
                    line: 0,
                    message: format!("--subst needs PAT=TEXT, got '{subst}'"),
                });
            };
            let (anchored, pattern) = split_anchor(pattern.as_bytes());
            session.patterns_mut().add(PatternEntry::substitute(
                pattern,
                anchored,
                replacement.as_bytes(),
            )?);
        }
        session.editor_mut().add_command_name("quit")?;
        Ok(session)
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> io::Result<()> {
    match Config::from_args(std::env::args_os()) {
        ParseResult::Config(config) => {
            if config.verbose {
                set_log_callback(|level: LogLevel, message: &str| {
                    eprint!("[{}] {message}\r\n", level.as_str());
                });
            }
            let result = if config.headless_smoke {
                run_headless_smoke(&config)
            } else {
                run_interactive(&config)
            };
            result.map_err(|e| io::Error::other(e.to_string()))
        }
        ParseResult::Help => {
            print!("{HELP_TEXT}");
            Ok(())
        }
        ParseResult::Error(msg) => {
            eprintln!("Error: {msg}");
            eprintln!("Run with --help for usage information.");
            std::process::exit(1);
        }
    }
}

// ============================================================================
// Headless Smoke Test
// ============================================================================

/// Drive a session against an in-memory terminal.
fn run_headless_smoke(config: &Config) -> termline::Result<()> {
    eprintln!("Running headless smoke test (80x24)...");

    let mut session = config.session(AnsiWriter::new(Vec::new(), 80, 24))?;
    session.set_prompt(config.prompt.as_bytes())?;
    session.handle_remote_line(b"Welcome. There is an ERROR here.")?;
    let events = session.handle_input(b"look\x1b[D\x1b[C\r")?;
    session.notify_resize(60, 20);
    session.poll()?;

    let written = session.editor().output().get_ref().len();
    eprintln!("Headless smoke test PASSED");
    eprintln!("  Events: {events:?}");
    eprintln!("  Bytes written: {written}");
    Ok(())
}

// ============================================================================
// Interactive Mode
// ============================================================================

/// Run interactive mode with terminal.
fn run_interactive(config: &Config) -> termline::Result<()> {
    if !is_tty(&io::stdin()) {
        eprintln!("Error: stdin is not a terminal");
        eprintln!();
        eprintln!("termline_demo requires an interactive terminal to run.");
        eprintln!("For non-interactive use, try: termline_demo --headless-smoke");
        std::process::exit(1);
    }

    let (cols, lines) = terminal_size().unwrap_or((80, 24));
    let out = AnsiWriter::detect(io::stdout(), cols, lines);
    let mut session = config.session(out)?;

    let _raw_guard = enable_raw_mode()?;
    install_resize_handler()?;
    set_stdin_nonblocking()?;

    session.set_prompt(config.prompt.as_bytes())?;
    session.handle_remote_line(b"termline demo: type `quit` to exit")?;

    let mut stdin = io::stdin();
    'main: loop {
        if take_resize_pending() {
            if let Ok((cols, lines)) = terminal_size() {
                session.editor_mut().output_mut().set_size(cols, lines);
                session.notify_resize(cols, lines);
                session.poll()?;
            }
        }

        let events = match session.read_input(&mut stdin) {
            Ok(Some(events)) => events,
            Ok(None) => break,
            Err(termline::Error::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
            Err(termline::Error::Interrupted) => {
                session.handle_remote_line(b"#interrupted")?;
                continue;
            }
            Err(e) => return Err(e),
        };

        for event in events {
            match event {
                SessionEvent::Submitted(line) => {
                    if line == b"quit" || line == b"#quit" {
                        break 'main;
                    }
                    let mut echo = b"You said: ".to_vec();
                    echo.extend_from_slice(&line);
                    session.handle_remote_line(&echo)?;
                }
                SessionEvent::RunCommand(command) => {
                    session.handle_remote_line(format!("#run {command}").as_bytes())?;
                }
                SessionEvent::Suspend => {
                    session.handle_remote_line(b"#suspend is not available in the demo")?;
                }
            }
        }
    }

    if let Some(path) = &config.state {
        let mut file = File::create(path)?;
        session.save(&mut file)?;
    }
    Ok(())
}

/// Set stdin to non-blocking mode on Unix.
fn set_stdin_nonblocking() -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = io::stdin().as_raw_fd();
    // SAFETY: fcntl with F_GETFL/F_SETFL is safe on a valid file descriptor.
    // stdin is always a valid file descriptor.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
