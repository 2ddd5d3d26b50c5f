//! Line-mode contact book
//!
//! Loads JSON contact files for a single user, then reads commands from
//! standard input until end of file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use contactbook::loader::{load_into, load_update};
use contactbook::{
    ContactStore, ContactsError, ContactsRegistry, LoadError, SearchParams, DEFAULT_COUNT,
};

const PROMPT: &str = ">> ";

const HELP: &str = "\
Allowed commands are:
  create JSON_PATH...
    Create contacts specified in JSON_PATH... for current user.
  delete CONTACT_ID
    Delete contact specified by CONTACT_ID.
  clear
    Delete all contacts for current user.
  help
    Print this help message.
  read CONTACT_ID
    Return contact specified by CONTACT_ID.
  search [NAME_WORD] [EMAIL] [START_INDEX] [RESULT_COUNT]
    Return up to RESULT_COUNT contacts starting at index START_INDEX
    (default 0), sorted by name. Contacts are filtered by a name word
    starting with NAME_WORD and by email equal to EMAIL. Without
    filters all contacts are returned.
  update CONTACT_ID JSON_PATH
    Update contact CONTACT_ID with the fields in JSON_PATH.";

/// REPL configuration
struct Config {
    /// User whose contacts are managed
    user_id: String,
    /// Contact files loaded at startup
    files: Vec<PathBuf>,
    /// Result count used when a search does not give one
    count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            files: Vec::new(),
            count: DEFAULT_COUNT,
        }
    }
}

fn usage() -> ! {
    eprintln!("usage: contacts-repl [--count N] USER_ID [JSON_CONTACTS_FILE...]");
    std::process::exit(1);
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    config.count = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("error: invalid count: {}", args[i + 1]);
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("error: --count requires a value");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("contacts-repl - line-mode contact book");
                println!();
                println!("USAGE:");
                println!("    contacts-repl [OPTIONS] USER_ID [JSON_CONTACTS_FILE...]");
                println!();
                println!("OPTIONS:");
                println!("    -c, --count <N>     Default search result count [default: {DEFAULT_COUNT}]");
                println!("    -h, --help          Print help information");
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
            arg => {
                positional.push(arg.to_string());
                i += 1;
            }
        }
    }

    let mut positional = positional.into_iter();
    let Some(user_id) = positional.next() else {
        usage();
    };
    config.user_id = user_id;
    config.files = positional.map(PathBuf::from).collect();
    config
}

#[derive(Debug, Error)]
enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error("{}: {0}", .0.kind())]
    Store(#[from] ContactsError),

    #[error("{0}")]
    Load(LoadError),

    #[error("cannot render result: {0}")]
    Render(#[from] serde_json::Error),
}

impl From<LoadError> for CommandError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Contacts(e) => Self::Store(e),
            other => Self::Load(other),
        }
    }
}

type CommandResult = Result<Option<Value>, CommandError>;

fn is_count(arg: &str) -> bool {
    !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit())
}

fn search(store: &dyn ContactStore, config: &Config, args: &[&str]) -> CommandResult {
    // Up to two trailing integers are START_INDEX and RESULT_COUNT.
    let split = args.len()
        - args
            .iter()
            .rev()
            .take(2)
            .take_while(|a| is_count(a))
            .count();
    let (filters, nums) = args.split_at(split);
    let parse = |s: &str| {
        s.parse::<usize>()
            .map_err(|_| CommandError::Usage(format!("number too large: {s}")))
    };
    let start = nums.first().map_or(Ok(0), |&s| parse(s))?;
    let count = nums.get(1).map_or(Ok(config.count), |&s| parse(s))?;

    let mut params = SearchParams::all();
    for arg in filters {
        if arg.contains('@') {
            if params.email.is_some() {
                return Err(CommandError::Usage("only a single email may be specified".into()));
            }
            params = params.email(*arg);
        } else {
            if params.name_word_prefix.is_some() {
                return Err(CommandError::Usage(
                    "only a single nameWordPrefix may be specified".into(),
                ));
            }
            params = params.name_word_prefix(*arg);
        }
    }

    let results = store.search(&params, start, count)?;
    Ok(Some(serde_json::to_value(results)?))
}

fn run_command(store: &dyn ContactStore, config: &Config, line: &str) -> CommandResult {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&cmd, args)) = words.split_first() else {
        return Ok(None);
    };

    match (cmd, args) {
        ("help", _) => {
            println!("{HELP}");
            Ok(None)
        }
        ("create", []) => Err(CommandError::Usage(
            "one or more JSON_PATH arguments are required".into(),
        )),
        ("create", paths) => {
            let ids = load_into(store, paths)?;
            Ok(Some(serde_json::to_value(ids)?))
        }
        ("read", [id]) => Ok(Some(serde_json::to_value(store.read(id)?)?)),
        ("delete", [id]) => {
            store.delete(id)?;
            Ok(None)
        }
        ("read" | "delete", _) => Err(CommandError::Usage(format!(
            "a single CONTACT_ID is required for {cmd}"
        ))),
        ("update", [id, path]) => {
            let update = load_update(path)?;
            Ok(Some(serde_json::to_value(store.update(id, update)?)?))
        }
        ("update", _) => Err(CommandError::Usage(
            "a CONTACT_ID and a JSON_PATH are required for update".into(),
        )),
        ("clear", []) => Ok(Some(Value::from(store.clear()))),
        ("search", args) => search(store, config, args),
        _ => Err(CommandError::Usage(format!("unknown command '{cmd}'"))),
    }
}

fn repl(store: &dyn ContactStore, config: &Config) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print!("{PROMPT}");
    stdout.flush()?;
    for line in stdin.lock().lines() {
        match run_command(store, config, line?.trim()) {
            Ok(Some(value)) => match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("cannot render result: {e}"),
            },
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
        print!("{PROMPT}");
        stdout.flush()?;
    }
    println!();
    Ok(())
}

fn main() {
    let config = parse_args();

    let registry = ContactsRegistry::new();
    let store = registry.get_or_create(&config.user_id).unwrap_or_else(|e| {
        eprintln!("{}: {e}", e.kind());
        std::process::exit(1);
    });

    match load_into(&*store, &config.files) {
        Ok(ids) => {
            println!("{HELP}");
            println!();
            let ids: Vec<String> = ids.into_iter().map(String::from).collect();
            println!("loaded contacts with ids: [{}]", ids.join(", "));
        }
        Err(e) => {
            eprintln!("{}", CommandError::from(e));
            std::process::exit(1);
        }
    }

    if let Err(e) = repl(&*store, &config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
