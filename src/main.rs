//!
//! studydesk shell
//! ---------------
//! Interactive portal over the in-memory backend: log in, walk the content taxonomy with
//! `open`/`back`/`forward`, and resolve PDF view/download links through the same access gate
//! a frontend would use.

use std::sync::Arc;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use studydesk::actions::PdfAction;
use studydesk::backend::seed::{seed_catalog, seed_users};
use studydesk::backend::{MemoryContentStore, MemorySessionStorage};
use studydesk::catalog::TaxonomyResolver;
use studydesk::config::PortalConfig;
use studydesk::identity::{DirectoryAuthProvider, LoginRequest, SessionStore};
use studydesk::navigation::{LabelBook, MemoryHistory, Navigator, Screen, Transition};
use studydesk::{AppError, UiConsequence};

const HELP: &str = "Commands:
  login <user-id> <password>   start a session
  logout                       end the session
  ls                           list the current view
  open <key>                   select a child of the current view
  back | forward               move through history
  where                        show the breadcrumb
  view <pdf-key>               resolve a PDF view link
  download <pdf-key>           resolve a PDF download link
  help                         show this help
  quit | exit                  leave the shell";

struct Shell {
    rt: tokio::runtime::Runtime,
    provider: DirectoryAuthProvider,
    sessions: SessionStore,
    nav: Navigator,
}

fn main() -> Result<()> {
    let config = PortalConfig::resolve()?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    fmt().with_env_filter(filter).init();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "studydesk",
        "studydesk starting: RUST_LOG='{}', password_check={:?}, session_ttl={}s, users_file={:?}, catalog_file={:?}",
        rust_log, config.password_check, config.session_ttl_secs, config.users_file, config.catalog_file
    );

    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let store = Arc::new(MemoryContentStore::new());
    seed_catalog(&store, &config)?;
    let directory = Arc::new(seed_users(&config)?);

    let sessions = SessionStore::new(Arc::new(MemorySessionStorage::new()), config.session_ttl());
    let nav = Navigator::new(
        sessions.clone(),
        TaxonomyResolver::new(store),
        MemoryHistory::new(),
        LabelBook::from_config(&config),
    );
    let shell = Shell { rt, provider: DirectoryAuthProvider::new(directory, config.password_check), sessions, nav };
    run_repl(shell)
}

fn run_repl(mut shell: Shell) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("studydesk shell. Type 'help' for commands.");
    loop {
        let line = match editor.readline("studydesk> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "login" => {
                if parts.len() < 3 {
                    eprintln!("usage: login <user-id> <password>");
                    continue;
                }
                shell.login(parts[1], parts[2]);
            }
            "logout" => {
                shell.nav.logout();
                println!("logged out");
            }
            "ls" => shell.list(),
            "open" => match parts.get(1) {
                Some(key) => shell.open(key),
                None => eprintln!("usage: open <key>"),
            },
            "back" => shell.pop(true),
            "forward" => shell.pop(false),
            "where" => shell.show_where(),
            "view" | "download" => match (parts[0].parse::<PdfAction>(), parts.get(1)) {
                (Ok(action), Some(key)) => shell.pdf(key, action),
                _ => eprintln!("usage: {} <pdf-key>", parts[0]),
            },
            other => eprintln!("unknown command '{}'; try 'help'", other),
        }
    }
    Ok(())
}

impl Shell {
    fn login(&mut self, user_id: &str, password: &str) {
        if self.sessions.is_authenticated() {
            self.nav.logout();
        }
        let req = LoginRequest::new(user_id, password);
        match self.rt.block_on(self.sessions.login(&self.provider, &req)) {
            Ok(session) => {
                println!("welcome, {} ({:?})", session.name, session.role);
                self.list();
            }
            Err(e) => report(&e),
        }
    }

    fn list(&mut self) {
        match self.rt.block_on(self.nav.refresh()) {
            Ok(screen) => print_screen(&screen),
            Err(e) => report(&e),
        }
    }

    fn open(&mut self, key: &str) {
        match self.nav.open(key) {
            Ok(Transition::Applied) => {
                self.show_where();
                self.list();
            }
            Ok(Transition::Unchanged) => self.show_where(),
            Err(e) => report(&e),
        }
    }

    fn pop(&mut self, back: bool) {
        let landed = if back { self.nav.history_mut().back() } else { self.nav.history_mut().forward() };
        let Some(payload) = landed else {
            println!("no further history");
            return;
        };
        match self.nav.on_pop(payload) {
            Ok(_) => {
                self.show_where();
                self.list();
            }
            Err(e) => report(&e),
        }
    }

    fn show_where(&self) {
        let state = self.nav.state();
        println!("[{}] {}", state.depth.as_str(), state.breadcrumb.join(" › "));
    }

    fn pdf(&self, key: &str, action: PdfAction) {
        match self.rt.block_on(self.nav.open_pdf(key, action)) {
            Ok(link) => println!("{:?} {} -> {}", link.action, link.file_name, link.url),
            Err(e) => report(&e),
        }
    }
}

fn print_screen(screen: &Screen) {
    match screen {
        Screen::Entries(entries) => {
            for e in entries {
                match e.serial_no {
                    Some(n) => println!("  {} {:>3}. {}  [{}]", e.icon, n, e.label, e.id),
                    None => println!("  {} {}  [{}]", e.icon, e.label, e.id),
                }
            }
        }
        Screen::Empty => println!("  no content available yet"),
        Screen::Missing(e) => println!("  nothing here: {}", e.message()),
        Screen::Unavailable(e) => println!("  could not load ({}); try 'ls' again", e.message()),
    }
}

fn report(err: &AppError) {
    match err.ui_consequence() {
        UiConsequence::RedirectToLogin => eprintln!("please log in: {}", err.message()),
        UiConsequence::BlockingModal => eprintln!("🚫 {}", err.message()),
        UiConsequence::EmptyState => eprintln!("nothing here: {}", err.message()),
        UiConsequence::RetryableError => eprintln!("temporarily unavailable: {}", err.message()),
        UiConsequence::InlineMessage => eprintln!("error: {}", err),
    }
}
