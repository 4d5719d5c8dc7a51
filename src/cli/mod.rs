//! Command-line front end driving the note store.

pub mod args;

pub use args::{Args, Command};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Local;
use tracing::debug;

use crate::client::{NotesApi, RestClient};
use crate::config::{self, ClientConfig};
use crate::connectivity::ConnectivityMonitor;
use crate::error::ClientResult;
use crate::schema::{CreateNoteRequest, Note, UpdateNoteRequest};
use crate::store::NoteStore;

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting quicknotes with arguments");

    let mut cfg = config::load_config()?;
    if let Some(base_url) = args.base_url {
        cfg.base_url = base_url;
    }
    if let Command::List {
        limit: Some(limit), ..
    } = args.command
    {
        cfg.page_limit = Some(limit);
    }

    let api = Arc::new(RestClient::new(&cfg)?);
    let monitor = ConnectivityMonitor::new();

    match args.command {
        Command::Health => return health(api.as_ref(), &cfg).await,
        Command::Watch => return watch(api.as_ref(), &monitor, cfg.health_check_interval).await,
        _ => {}
    }

    // Data commands are refused until the service answers a health check.
    if !monitor.check(api.as_ref()).await {
        bail!(
            "notes service at {} is unreachable; run `quicknotes health` to retry",
            cfg.api_url()
        );
    }

    let mut store = NoteStore::new(api).with_page_limit(cfg.page_limit);
    let result = execute(&mut store, args.command).await;
    monitor.observe(&result);
    Ok(result?)
}

async fn health(api: &RestClient, cfg: &ClientConfig) -> Result<()> {
    match api.health_check().await {
        Ok(status) => {
            println!("connected: {} ({})", status.message, status.status);
            Ok(())
        }
        Err(e) => bail!("disconnected from {}: {e}", cfg.api_url()),
    }
}

/// Checks health every `interval` and prints each change of state until
/// interrupted.
async fn watch<A: NotesApi + ?Sized>(
    api: &A,
    monitor: &ConnectivityMonitor,
    interval: Duration,
) -> Result<()> {
    let mut changes = monitor.subscribe();
    let report = async {
        let mut last = None;
        while changes.changed().await.is_ok() {
            let state = *changes.borrow_and_update();
            if last != Some(state) {
                println!("{state}");
                last = Some(state);
            }
        }
    };

    tokio::select! {
        () = monitor.run(api, interval) => {}
        () = report => {}
        interrupted = tokio::signal::ctrl_c() => interrupted?,
    }
    Ok(())
}

async fn execute(store: &mut NoteStore<RestClient>, command: Command) -> ClientResult<()> {
    match command {
        Command::Health | Command::Watch => {}
        Command::List { search, .. } => {
            store.refresh(search.as_deref()).await?;
            for note in store.notes() {
                print_summary(note);
            }
            println!("{} of {} notes", store.notes().len(), store.total());
        }
        Command::Show { id } => {
            let note = store.reload(&id).await?;
            print_note(&note);
        }
        Command::Create {
            title,
            content,
            tags,
        } => {
            let request = CreateNoteRequest {
                title: title.trim().to_string(),
                content: content.trim().to_string(),
                tags: tags.trim().to_string(),
            };
            let note = store.create(&request).await?;
            print_note(&note);
        }
        Command::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let request = UpdateNoteRequest {
                title,
                content,
                tags,
            };
            if request.is_empty() {
                println!("nothing to change");
                return Ok(());
            }
            let note = store.update(&id, &request).await?;
            print_note(&note);
        }
        Command::Delete { id } => {
            let ack = store.delete(&id).await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

fn format_time(note: &Note) -> String {
    note.updated_at
        .with_timezone(&Local)
        .format("%b %e, %Y %H:%M")
        .to_string()
}

fn print_summary(note: &Note) {
    println!("{}  {}  ({})", note.id, note.title, format_time(note));
}

fn print_note(note: &Note) {
    println!("{}\n{}", note.title, "=".repeat(note.title.chars().count()));
    println!("{}", note.content);
    if !note.tags.is_empty() {
        println!("tags: {}", note.tag_list().collect::<Vec<_>>().join(", "));
    }
    println!("id: {}  updated: {}", note.id, format_time(note));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::Connectivity;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn watch_keeps_checking_at_the_configured_interval() {
        let api = FakeApi::new();
        let monitor = ConnectivityMonitor::new();

        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            watch(&api, &monitor, Duration::from_millis(10)),
        )
        .await;

        assert!(outcome.is_err(), "watch stopped on its own");
        assert_eq!(monitor.state(), Connectivity::Connected);
        assert!(api.calls() >= 3);
    }
}
