use clap::Parser;
use pcli::{
    cli::{Cli, Command},
    client::Client,
    config::Config,
};
use std::process::exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut config = Config::load();
    if let Some(url) = cli.url {
        config.url = url;
    }
    let client = Client::new(config);

    let result = match cli.command {
        Command::Ping => client.ping().await,
        Command::Drives => client.drives().await,
        Command::Ls { path } => client.ls(path).await,
        Command::Cat { path } => client.cat(path).await,
        Command::Save { path, file } => client.save(path, file).await,
        Command::Touch { path } => client.touch(path).await,
        Command::Mkdir { path } => client.mkdir(path).await,
        Command::Rm { path } => client.rm(path).await,
        Command::Mv { old, new } => client.mv(old, new).await,
        Command::Upload { file, path } => client.upload(file, path).await,
        Command::Download { path, file } => client.download(path, file).await,
        Command::Prompt { words } => client.prompt(words).await,
    };

    match result {
        Ok(s) => println!("{}", s),
        Err(error) => {
            eprintln!("{}", error);
            exit(1)
        }
    }
}
