//! Interactive command shell.
//!
//! Lines typed at the `> ` prompt are parsed into a typed [`Command`]
//! before anything is dispatched to the engine. A command that fails
//! prints its error and the loop keeps running; only `quit` (or end of
//! input) leaves it.

use crate::config::array_device;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::sys::{Allocator, ArrayService, LoopService};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Create {
        name: String,
        size_gib: u64,
        dirs: Vec<PathBuf>,
    },
    Up { name: String },
    Down { name: String },
    Delete { name: String },
    Quit,
}

impl Command {
    /// Parse one input line. Returns `Ok(None)` for a blank line and
    /// `Err` for anything that is not a well-formed command.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let parsed = match cmd {
            "list" => Command::List,
            "quit" => Command::Quit,
            "up" => Command::Up {
                name: one_name(&args)?,
            },
            "down" => Command::Down {
                name: one_name(&args)?,
            },
            "delete" => Command::Delete {
                name: one_name(&args)?,
            },
            "create" => {
                if args.len() < 3 {
                    return Err(Error::UnrecognizedCommand);
                }
                let size_gib = args[1]
                    .parse::<u64>()
                    .ok()
                    .filter(|&size| size > 0)
                    .ok_or_else(|| Error::InvalidSize(args[1].to_string()))?;
                Command::Create {
                    name: args[0].to_string(),
                    size_gib,
                    dirs: args[2..].iter().map(PathBuf::from).collect(),
                }
            }
            _ => return Err(Error::UnrecognizedCommand),
        };
        Ok(Some(parsed))
    }
}

fn one_name(args: &[&str]) -> Result<String> {
    match args {
        [name] => Ok((*name).to_string()),
        _ => Err(Error::UnrecognizedCommand),
    }
}

/// Print the command summary.
pub fn usage() {
    println!("Commands:");
    println!("  list : list current fraids");
    println!("  create name size dirs... : create a new fraid called name,");
    println!("                             with a per-file capacity of size GB,");
    println!("                             storing files in the directories specified by dirs");
    println!("  up name : create the device /dev/md/name for fraid name");
    println!("  down name : remove the md and loop devices corresponding to name");
    println!("  delete name : delete the files and metadata of fraid name");
    println!("  quit : quit fraid");
}

/// Ask a yes/no question on stdin until the answer is `y` or `n`.
fn ask_user(question: &str) -> bool {
    let stdin = io::stdin();
    loop {
        print!("{} [y/n] ", question);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).unwrap_or(0) == 0 {
            return false;
        }
        match answer.trim() {
            "y" => return true,
            "n" => return false,
            _ => continue,
        }
    }
}

/// Run the interactive loop until `quit` or end of input.
pub fn run<A, L, Z>(engine: &Engine<A, L, Z>) -> Result<()>
where
    A: ArrayService,
    L: LoopService,
    Z: Allocator,
{
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(Error::UnrecognizedCommand) => {
                usage();
                continue;
            }
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if matches!(command, Command::Quit) {
            return Ok(());
        }
        if let Err(e) = dispatch(engine, command) {
            println!("{}", e);
        }
    }
}

fn dispatch<A, L, Z>(engine: &Engine<A, L, Z>, command: Command) -> Result<()>
where
    A: ArrayService,
    L: LoopService,
    Z: Allocator,
{
    match command {
        Command::List => {
            for status in engine.list()? {
                let state = if status.active { "[ACTIVE]" } else { "[INACTIVE]" };
                println!("{} {} {} GB", status.name, state, status.capacity_gb);
                for file in &status.files {
                    println!("   {}", file.display());
                }
            }
        }
        Command::Create {
            name,
            size_gib,
            dirs,
        } => {
            engine.create(&name, size_gib, &dirs)?;
            println!(
                "device for fraid {} created at {}",
                name,
                array_device(&name).display()
            );
        }
        Command::Up { name } => {
            engine.activate(&name)?;
            println!(
                "device for fraid {} created at {}",
                name,
                array_device(&name).display()
            );
        }
        Command::Down { name } => engine.deactivate(&name)?,
        Command::Delete { name } => {
            let question = format!(
                "Are you sure you want to delete {} and ALL corresponding files?",
                name
            );
            engine.delete(&name, || ask_user(&question))?;
        }
        Command::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   \n").unwrap(), None);
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("list\n").unwrap(), Some(Command::List));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
        assert_eq!(
            Command::parse("up myraid").unwrap(),
            Some(Command::Up {
                name: "myraid".to_string()
            })
        );
        assert_eq!(
            Command::parse("down myraid").unwrap(),
            Some(Command::Down {
                name: "myraid".to_string()
            })
        );
        assert_eq!(
            Command::parse("delete myraid").unwrap(),
            Some(Command::Delete {
                name: "myraid".to_string()
            })
        );
    }

    #[test]
    fn test_parse_create() {
        let command = Command::parse("create myraid 2 /mnt/a /mnt/b").unwrap();
        assert_eq!(
            command,
            Some(Command::Create {
                name: "myraid".to_string(),
                size_gib: 2,
                dirs: vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")],
            })
        );
    }

    #[test]
    fn test_parse_create_bad_size() {
        assert!(matches!(
            Command::parse("create myraid two /mnt/a"),
            Err(Error::InvalidSize(raw)) if raw == "two"
        ));
        assert!(matches!(
            Command::parse("create myraid 0 /mnt/a"),
            Err(Error::InvalidSize(_))
        ));
        assert!(matches!(
            Command::parse("create myraid -1 /mnt/a"),
            Err(Error::InvalidSize(_))
        ));
    }

    #[test]
    fn test_parse_wrong_arity() {
        assert!(Command::parse("up").is_err());
        assert!(Command::parse("up a b").is_err());
        assert!(Command::parse("create myraid 2").is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(Command::parse("frobnicate").is_err());
    }
}
