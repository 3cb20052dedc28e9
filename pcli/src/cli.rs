use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server url, overrides the config file.
    #[arg(short, long)]
    pub url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ping the server.
    Ping,
    /// List the filesystem roots.
    Drives,
    /// List the directory at PATH.
    Ls { path: String },
    /// Print the file at PATH.
    Cat { path: String },
    /// Save stdin, or FILE, as the content of PATH.
    Save { path: String, file: Option<String> },
    /// Create an empty file at PATH, keeping any existing content.
    Touch { path: String },
    /// Create the folder at PATH with its parents.
    Mkdir { path: String },
    /// Delete the file or folder at PATH.
    Rm { path: String },
    /// Move OLD to NEW.
    Mv { old: String, new: String },
    /// Upload the local FILE to PATH.
    Upload { file: String, path: String },
    /// Download PATH. Writes to FILE, or stdout.
    Download { path: String, file: Option<String> },
    /// Send an instruction in plain words.
    Prompt {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
}
